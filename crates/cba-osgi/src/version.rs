//! Version clean-up into OSGi form.

use regex_lite::Regex;

use crate::OsgiError;

const VERSION_S: &str = r"[0-9]{1,9}(\.[0-9]{1,9}(\.[0-9]{1,9}(\.[0-9A-Za-z_-]+)?)?)?";

/// Returns true if `version` is already a valid OSGi version or version range.
pub fn is_osgi_version(version: &str) -> bool {
    let pattern = format!(r"^(([\(\[]{v},{v}[\]\)])|{v})$", v = VERSION_S);
    Regex::new(&pattern)
        .map(|re| re.is_match(version))
        .unwrap_or(false)
}

/// Clean a Maven version up into an OSGi version.
///
/// Valid OSGi versions and ranges are returned verbatim. Fuzzy versions such
/// as `1.0-SNAPSHOT` become `1.0.0.SNAPSHOT`; fuzzy ranges are cleaned per
/// bound. Anything that does not look like a version is returned unchanged.
pub fn cleanup_version(raw: &str) -> Result<String, OsgiError> {
    if raw.trim().is_empty() {
        return Err(OsgiError::MalformedVersion {
            raw: raw.to_string(),
            reason: "version is empty",
        });
    }
    if raw.chars().any(char::is_control) {
        return Err(OsgiError::MalformedVersion {
            raw: raw.to_string(),
            reason: "version contains control characters",
        });
    }

    Ok(cleanup(raw))
}

fn cleanup(version: &str) -> String {
    if is_osgi_version(version) {
        return version.to_string();
    }

    let range = Regex::new(r"(?s)^([\(\[])\s*([-\da-zA-Z.]+)\s*,\s*([-\da-zA-Z.]+)\s*([\]\)])$")
        .expect("static range pattern");
    if let Some(caps) = range.captures(version) {
        return format!(
            "{}{},{}{}",
            &caps[1],
            cleanup(&caps[2]),
            cleanup(&caps[3]),
            &caps[4]
        );
    }

    let fuzzy = Regex::new(r"(?s)^(\d+)(\.(\d+)(\.(\d+))?)?([^a-zA-Z0-9](.*))?$")
        .expect("static version pattern");
    let Some(caps) = fuzzy.captures(version) else {
        return version.to_string();
    };

    let major = strip_leading_zeroes(&caps[1]);
    let minor = caps.get(3).map(|m| strip_leading_zeroes(m.as_str()));
    let micro = caps.get(5).map(|m| strip_leading_zeroes(m.as_str()));
    let qualifier = caps.get(7).map(|m| m.as_str());

    let mut result = String::from(major);
    match (minor, micro, qualifier) {
        (Some(minor), Some(micro), qualifier) => {
            result.push('.');
            result.push_str(minor);
            result.push('.');
            result.push_str(micro);
            if let Some(q) = qualifier {
                result.push('.');
                push_qualifier(&mut result, q);
            }
        }
        (Some(minor), None, Some(q)) => {
            result.push('.');
            result.push_str(minor);
            result.push_str(".0.");
            push_qualifier(&mut result, q);
        }
        (Some(minor), None, None) => {
            result.push('.');
            result.push_str(minor);
        }
        (None, _, Some(q)) => {
            result.push_str(".0.0.");
            push_qualifier(&mut result, q);
        }
        (None, _, None) => {}
    }
    result
}

fn strip_leading_zeroes(digits: &str) -> &str {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        &digits[digits.len() - 1..]
    } else {
        trimmed
    }
}

fn push_qualifier(result: &mut String, qualifier: &str) {
    // Leading numeric segments ("1-", "2.") are dropped from the qualifier.
    let modifier = Regex::new(r"(?s)^(\d+[.-])*(.*)$").expect("static modifier pattern");
    let rest = modifier
        .captures(qualifier)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or(qualifier);

    result.extend(
        rest.chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-'),
    );
}
