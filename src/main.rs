//! mpn-validator: manufacturer part number validation CLI

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use mpn_validator::{
    cli::{self, ValidateOptions},
    config::{discover_config_file, generate_example_config, load_or_default},
    pipeline::exit_codes,
    reports::ReportFormat,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mpn-validator")]
#[command(version, about = "Validate manufacturer part numbers against the parts catalog", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Every MPN is valid
    1  At least one MPN is invalid or could not be checked
    3  Error occurred (including authentication failure)

EXAMPLES:
    # Validate a few MPNs
    mpn-validator validate LM358N NE555P

    # Validate a BOM column, German storefront, CSV output
    mpn-validator validate --file mpns.txt --site DE --language de --currency EUR -o csv

    # Start the authorization-code flow
    mpn-validator auth url")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "MPN_VALIDATOR_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Parser)]
struct ValidateArgs {
    /// MPNs to validate
    mpns: Vec<String>,

    /// Read MPNs from a file, one per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Manufacturer hint used to break ties (repeatable)
    #[arg(long = "hint", value_name = "MPN=MANUFACTURER")]
    hints: Vec<String>,

    /// Restrict the search to one catalog manufacturer id
    #[arg(long)]
    manufacturer_id: Option<String>,

    /// Catalog site (e.g. US, DE)
    #[arg(long)]
    site: Option<String>,

    /// Catalog language (e.g. en, de)
    #[arg(long)]
    language: Option<String>,

    /// Pricing currency (e.g. USD, EUR)
    #[arg(long)]
    currency: Option<String>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t = ReportFormat::Table)]
    format: ReportFormat,

    /// Write results to a file instead of stdout
    #[arg(long = "output-file")]
    output_file: Option<PathBuf>,

    /// Include batch statistics in the output
    #[arg(long)]
    stats: bool,

    /// Ignore cached results (fresh results are still cached)
    #[arg(long)]
    refresh: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate MPNs against the catalog
    Validate(ValidateArgs),

    /// Manage catalog authorization
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Inspect or clean the result cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Print the authorization URL to open in a browser
    Url,
    /// Exchange an authorization code for a token
    Exchange {
        /// Code from the redirect URL
        code: String,
    },
    /// Check whether a usable token can be obtained
    Check,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove stale persistent entries
    Cleanup {
        /// Remove entries not accessed in this many days
        #[arg(long)]
        days: Option<u32>,
        /// Remove invalid entries created more than this many days ago
        #[arg(long)]
        invalid_days: Option<u32>,
    },
    /// Print persistent cache statistics
    Stats,
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print the discovered config file
    Path,
    /// Generate an example .mpn-validator.yaml in the current directory
    Init,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let (config, loaded_from) = load_or_default(cli.config.as_deref());
    if let Some(path) = &loaded_from {
        tracing::debug!("Loaded config from {}", path.display());
    }

    match cli.command {
        Commands::Validate(args) => cli::run_validate(
            config,
            ValidateOptions {
                mpns: args.mpns,
                file: args.file,
                hints: args.hints,
                manufacturer_id: args.manufacturer_id,
                site: args.site,
                language: args.language,
                currency: args.currency,
                format: args.format,
                output: args.output_file,
                stats: args.stats,
                refresh: args.refresh,
            },
        ),

        Commands::Auth { action } => match action {
            AuthAction::Url => cli::run_auth_url(&config),
            AuthAction::Exchange { code } => cli::run_auth_exchange(&config, &code),
            AuthAction::Check => cli::run_auth_check(&config),
        },

        Commands::Cache { action } => match action {
            CacheAction::Cleanup { days, invalid_days } => {
                cli::run_cache_cleanup(&config, days, invalid_days)
            }
            CacheAction::Stats => cli::run_cache_stats(&config),
        },

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "mpn-validator", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = mpn_validator::config::generate_json_schema();
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                match &loaded_from {
                    Some(path) => eprintln!("# Loaded from: {}", path.display()),
                    None => eprintln!("# No config file found; showing defaults"),
                }
                let yaml = serde_yaml::to_string(&config.redacted())
                    .context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Path => {
                match discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!(
                        "No config file found. Default location: {}",
                        mpn_validator::config::default_config_path().display()
                    ),
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".mpn-validator.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                std::fs::write(&target, generate_example_config())
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}
