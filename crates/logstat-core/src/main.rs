//! logstat - log buffer usage accounting
//!
//! The main entry point for the logstat CLI, handling:
//! - Replaying record traces through the accounting engine
//! - Usage reports (text or JSON)
//! - Configuration inspection and validation

use clap::{Args, Parser, Subcommand};
use logstat_common::{format_error_human, Error, LogMask, OutputFormat, SCHEMA_VERSION};
use logstat_config::validate::MAX_TOP_N;
use logstat_config::{load_config, LoadedConfig, StatsConfig, ValidationError};
use logstat_core::exit_codes::ExitCode;
use logstat_core::identity::{
    IdentityResolver, LayeredResolver, NullResolver, ProcfsResolver, StaticResolver,
};
use logstat_core::logging::{init_logging, LogConfig};
use logstat_core::replay::{declared_identities, parse_trace, ReplayBuffer, ReplaySummary};
use logstat_core::Statistics;
use std::fs::File;
use std::io::{BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Log buffer usage accounting
#[derive(Parser)]
#[command(name = "logstat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to logstat.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a record trace and print the usage report
    Replay(ReplayArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    /// JSON Lines trace file ("-" for stdin)
    trace: PathBuf,

    /// Only report this user id
    #[arg(long)]
    uid: Option<u32>,

    /// Categories to report (comma-separated names or "all")
    #[arg(long, default_value = "all")]
    buffers: LogMask,

    /// Rows per section (overrides report.top_n)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=MAX_TOP_N as i64))]
    top: Option<u16>,

    /// Do not resolve names from the host; use trace declarations only
    #[arg(long)]
    offline: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,
    /// Print the JSON schema of logstat.json
    Schema,
    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the resolved config)
        path: Option<PathBuf>,
    },
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version come through here too
            let code = if err.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    init_logging(&LogConfig::from_env(
        cli.global.verbose,
        cli.global.quiet,
        matches!(cli.global.format, OutputFormat::Json),
    ));

    let exit_code = match &cli.command {
        Commands::Replay(args) => run_replay(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Version => {
            print_version(&cli.global);
            Ok(ExitCode::Clean)
        }
    }
    .unwrap_or_else(|err| output_error(&cli.global, &err));

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Commands
// ============================================================================

fn run_replay(global: &GlobalOpts, args: &ReplayArgs) -> Result<ExitCode, Error> {
    let loaded = load(global.config.as_deref())?;
    let config = &loaded.config;

    let events = if args.trace.as_os_str() == "-" {
        parse_trace(std::io::stdin().lock())?
    } else {
        parse_trace(BufReader::new(File::open(&args.trace)?))?
    };
    debug!(events = events.len(), trace = %args.trace.display(), "trace loaded");

    let host: Box<dyn IdentityResolver> = if args.offline || !config.identity.resolve_names {
        Box::new(NullResolver)
    } else {
        Box::new(ProcfsResolver::from_config(&config.identity))
    };
    let resolver: LayeredResolver<StaticResolver, Box<dyn IdentityResolver>> =
        LayeredResolver::new(declared_identities(&events), host);

    let mut stats = Statistics::with_config(config, resolver);
    if let Some(top) = args.top {
        let mut report = stats.report_config().clone();
        report.top_n = usize::from(top);
        stats.set_report_config(report);
    }

    let mut buffer = ReplayBuffer::new();
    let summary = buffer.replay(&mut stats, &events)?;
    info!(
        added = summary.added,
        dropped = summary.dropped,
        removed = summary.removed,
        resident = summary.resident,
        "replay complete"
    );

    let uid_filter = args.uid.map(Into::into);
    match global.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "trace": args.trace.display().to_string(),
                "summary": summary,
                "report": stats.snapshot(uid_filter, args.buffers),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            print!("{}", stats.format(uid_filter, args.buffers));
            print_summary(&summary);
        }
    }

    Ok(ExitCode::Clean)
}

fn print_summary(summary: &ReplaySummary) {
    println!();
    println!(
        "Replayed {} events: {} added, {} dropped, {} removed, {} merged, {} resident",
        summary.events,
        summary.added,
        summary.dropped,
        summary.removed,
        summary.merged,
        summary.resident
    );
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> Result<ExitCode, Error> {
    match &args.command {
        ConfigCommands::Show => {
            let loaded = load(global.config.as_deref())?;
            let path = loaded.path.as_ref().map(|p| p.display().to_string());
            match global.format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "schema_version": SCHEMA_VERSION,
                        "source": loaded.source.to_string(),
                        "path": path,
                        "config": loaded.config,
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("# logstat config show");
                    println!();
                    match path {
                        Some(path) => println!("Source: {} ({})", path, loaded.source),
                        None => println!("Source: **built-in defaults** (no logstat.json found)"),
                    }
                    println!();
                    println!("{}", serde_json::to_string_pretty(&loaded.config)?);
                }
            }
            Ok(ExitCode::Clean)
        }
        ConfigCommands::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(&StatsConfig::json_schema())?
            );
            Ok(ExitCode::Clean)
        }
        ConfigCommands::Validate { path } => {
            let path = path.as_deref().or(global.config.as_deref());
            if let Some(path) = path {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
            }

            let loaded = load(path)?;
            let shown = loaded
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in defaults".to_string());
            match global.format {
                OutputFormat::Json => {
                    let output = serde_json::json!({
                        "schema_version": SCHEMA_VERSION,
                        "status": "valid",
                        "path": loaded.path.as_ref().map(|p| p.display().to_string()),
                        "source": loaded.source.to_string(),
                    });
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Text => {
                    println!("# Configuration Validation");
                    println!();
                    println!("Status: ✓ Valid");
                    println!("Config: {}", shown);
                }
            }
            Ok(ExitCode::Clean)
        }
    }
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Json => {
            let version_info = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "logstat_version": env!("CARGO_PKG_VERSION"),
                "rust_version": env!("CARGO_PKG_RUST_VERSION"),
            });
            println!("{}", version_info);
        }
        OutputFormat::Text => {
            println!("logstat {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn load(path: Option<&Path>) -> Result<LoadedConfig, Error> {
    let loaded = load_config(path).map_err(config_error)?;
    debug!(source = %loaded.source, "configuration loaded");
    Ok(loaded)
}

fn config_error(err: ValidationError) -> Error {
    match err {
        ValidationError::InvalidValue { field, message } => Error::InvalidConfig { field, message },
        other => Error::Config(other.to_string()),
    }
}

/// Report an error on stderr in the selected format.
fn output_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    let exit_code = ExitCode::for_error(err);

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "status": "error",
                "error": {
                    "code": err.code(),
                    "category": err.category(),
                    "message": err.to_string(),
                    "remediation": err.remediation(),
                    "exit_code": exit_code.code_name(),
                }
            });
            eprintln!("{}", response);
        }
        OutputFormat::Text => {
            let use_color = !global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(err, use_color));
        }
    }

    exit_code
}
