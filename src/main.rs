//! CBA assembler CLI
//!
//! Entry point for the `cba` command-line tool.

use cba_assembler::{
    Assembler, BuildError, CbaConfig, EffectiveConfig, ProjectArtifact, Resolution,
};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Config file looked up when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "cba.toml";

#[derive(Parser)]
#[command(name = "cba")]
#[command(about = "Composite Bundle Archive assembler", version)]
struct Cli {
    /// Log debug output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble and publish the archive
    Build {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        overrides: Overrides,

        /// Output the build report in JSON format
        #[arg(long)]
        json: bool,

        /// Also write the archive listing as JSON to this path
        #[arg(long)]
        listing: Option<PathBuf>,
    },

    /// Print the generated composite bundle manifest
    Manifest {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Resolve and validate the configuration
    Verify {
        #[command(flatten)]
        inputs: Inputs,

        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args)]
struct Inputs {
    /// Path to config file (default: cba.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Resolver output with the project descriptor and dependencies
    #[arg(long, short = 'r')]
    resolution: PathBuf,
}

#[derive(Args)]
struct Overrides {
    /// Generate META-INF/COMPOSITEBUNDLE.MF instead of copying one
    #[arg(long)]
    generate_manifest: bool,

    /// Rewrite the archive even if it is up to date
    #[arg(long)]
    force: bool,

    /// Dependency content policy (none, applicationContent, all)
    #[arg(long)]
    archive_content: Option<String>,

    /// Include transitive dependencies (deprecated, use --archive-content all)
    #[arg(long)]
    transitive: bool,

    /// Manifest instruction override, KEY=VALUE
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    instructions: Vec<String>,
}

impl Overrides {
    /// CLI layer of the configuration
    fn to_value(&self) -> Result<Option<Value>, String> {
        let mut layer = Map::new();

        if self.generate_manifest {
            layer.insert("generate_manifest".to_string(), json!(true));
        }
        if self.force {
            layer.insert("force_creation".to_string(), json!(true));
        }
        if let Some(policy) = &self.archive_content {
            layer.insert("archive_content".to_string(), json!(policy));
        }
        if self.transitive {
            layer.insert("use_transitive_dependencies".to_string(), json!(true));
        }

        if !self.instructions.is_empty() {
            let mut instructions = Map::new();
            for item in &self.instructions {
                let (key, value) = item
                    .split_once('=')
                    .ok_or_else(|| format!("Invalid instruction {:?}, expected KEY=VALUE", item))?;
                instructions.insert(key.trim().to_string(), json!(value));
            }
            layer.insert("instructions".to_string(), Value::Object(instructions));
        }

        Ok((!layer.is_empty()).then_some(Value::Object(layer)))
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            inputs,
            overrides,
            json,
            listing,
        } => run_build(&inputs, &overrides, json, listing.as_deref()),
        Commands::Manifest { inputs, overrides } => run_manifest(&inputs, &overrides),
        Commands::Verify { inputs, overrides } => run_verify(&inputs, &overrides),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load inputs and resolve the configuration, exiting on failure
fn load(inputs: &Inputs, overrides: &Overrides) -> (EffectiveConfig, CbaConfig, Resolution) {
    let resolution = Resolution::from_file(&inputs.resolution).unwrap_or_else(|e| {
        error!(path = %inputs.resolution.display(), "Error loading resolution: {}", e);
        process::exit(2);
    });

    let config_path = match &inputs.config {
        Some(path) if !path.exists() => {
            error!(path = %path.display(), "Config file not found");
            process::exit(1);
        }
        Some(path) => path.clone(),
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };

    let cli_layer = overrides.to_value().unwrap_or_else(|e| {
        error!("{}", e);
        process::exit(1);
    });

    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let effective = EffectiveConfig::build(Some(config_path.as_path()), cli_layer, &base_dir)
        .and_then(|effective| {
            let config = effective.resolve(&resolution.project)?;
            Ok((effective, config))
        });

    match effective {
        Ok((effective, config)) => (effective, config, resolution),
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    }
}

fn fail(e: BuildError) -> ! {
    error!(stage = %e.stage, "{}", e);
    process::exit(e.exit_code());
}

fn run_build(inputs: &Inputs, overrides: &Overrides, json_output: bool, listing: Option<&Path>) {
    let (_, config, resolution) = load(inputs, overrides);

    let assembler = Assembler::new(config);
    let mut registry = ProjectArtifact::new();
    let report = assembler
        .build(&resolution, &mut registry)
        .unwrap_or_else(|e| fail(e));

    if let Some(path) = listing {
        if let Err(e) = report.listing.write_to_file(path) {
            error!(path = %path.display(), "Error writing listing: {}", e);
            process::exit(4);
        }
    }

    if json_output {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Error serializing report: {}", e);
                process::exit(1);
            }
        }
    } else {
        let (files, dirs) = report.listing.entry_counts();
        println!("{}", display_path(&report.archive));
        println!(
            "  {} files, {} directories{}",
            files,
            dirs,
            if report.up_to_date { " (up to date)" } else { "" }
        );
        for warning in &report.warnings {
            println!("  warning: {}", warning);
        }
    }
}

fn run_manifest(inputs: &Inputs, overrides: &Overrides) {
    let (_, config, resolution) = load(inputs, overrides);

    let headers = Assembler::new(config)
        .generate_manifest(&resolution)
        .unwrap_or_else(|e| fail(e));
    print!("{}", headers.to_text());
}

fn run_verify(inputs: &Inputs, overrides: &Overrides) {
    let (effective, config, resolution) = load(inputs, overrides);

    let output = json!({
        "effective": effective,
        "resolved": config,
        "dependencies": {
            "direct": resolution.direct().len(),
            "all": resolution.all().len(),
        },
    });
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Error serializing configuration: {}", e);
            process::exit(1);
        }
    }
}

fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
