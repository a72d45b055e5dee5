//! Configuration merge system
//!
//! Implements the 3-layer configuration merge:
//! 1. Built-in defaults
//! 2. Project config file (cba.toml, `[cba]` table)
//! 3. CLI flags
//!
//! The merged value is then resolved once into a typed [`CbaConfig`].

mod defaults;
mod effective;
mod merge;
mod resolved;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
pub use resolved::CbaConfig;
