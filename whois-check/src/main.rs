//! WHOIS Check CLI Application
//!
//! A command-line interface for checking domain availability against each
//! TLD's authoritative WHOIS server. This application provides a
//! user-friendly interface to the whois-check-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use whois_check_lib::{
    expand_domain_inputs, load_env_config, CheckConfig, ConfigManager, EnvConfig, WhoisChecker,
};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for whois-check
#[derive(Parser, Debug)]
#[command(name = "whois-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Check domain availability against authoritative WHOIS servers")]
#[command(
    long_about = "Check domain availability by querying the WHOIS server of each domain's TLD.\n\nTLD servers and their availability markers come from a JSON catalog; a bundled catalog is used unless --registry is given."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain names to check (base names or FQDNs)
    #[arg(value_name = "DOMAINS", help_heading = "Domain Selection")]
    pub domains: Vec<String>,

    /// TLDs for base names (comma-separated or multiple -t flags)
    #[arg(short = 't', long = "tld", value_name = "TLD", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Domain Selection")]
    pub tlds: Option<Vec<String>>,

    /// Input file with domains (one per line)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help_heading = "Domain Selection"
    )]
    pub file: Option<PathBuf>,

    /// List supported TLDs and exit
    #[arg(long = "list-tlds", help_heading = "Domain Selection")]
    pub list_tlds: bool,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Show WHOIS text for taken domains
    #[arg(short = 'i', long = "info", help_heading = "Output Format")]
    pub info: bool,

    /// Collect all results before displaying
    #[arg(long = "batch", help_heading = "Output Format")]
    pub batch: bool,

    /// Max concurrent domain checks (default: 10, max: 100)
    #[arg(short = 'c', long = "concurrency", help_heading = "Performance")]
    pub concurrency: Option<usize>,

    /// Base TLD catalog (JSON) instead of the bundled one
    #[arg(long = "registry", value_name = "FILE", help_heading = "Registry")]
    pub registry: Option<PathBuf>,

    /// Catalog whose entries replace base entries for the same TLD
    #[arg(
        long = "registry-override",
        value_name = "FILE",
        help_heading = "Registry"
    )]
    pub registry_override: Option<PathBuf>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Show debug logging and per-domain timing
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_tracing(&args);

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins unless `--debug` is given; the default level is `warn`
/// (`info` with `--verbose`).
fn init_tracing(args: &Args) {
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        let default_level = if args.verbose { "info" } else { "warn" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    // --list-tlds is self-contained, skip other validation
    if args.list_tlds {
        return Ok(());
    }

    if args.domains.is_empty() && args.file.is_none() {
        return Err("You must specify domain names or a file with --file".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("Concurrency must be between 1 and 100".to_string());
        }
    }

    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args, load_env_config())?;
    let checker = WhoisChecker::from_config(config)?;
    info!("Loaded {} TLD definitions", checker.registry().len());

    if args.list_tlds {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&checker.registry().tlds())?);
        } else {
            ui::print_tlds(checker.registry());
        }
        return Ok(());
    }

    let domains = get_domains_to_check(&args)?;
    debug!("Checking domains: {}", domains.join(", "));

    if args.verbose && !args.json {
        ui::print_header(
            domains.len(),
            checker.config().concurrency,
            checker.registry().len(),
        );
    }

    if should_use_streaming(&args, domains.len()) {
        run_streaming_check(&checker, &domains, &args).await;
    } else {
        run_batch_check(&checker, &domains, &args).await?;
    }

    Ok(())
}

/// Stream results unless a single domain, JSON or --batch was requested.
fn should_use_streaming(args: &Args, domain_count: usize) -> bool {
    !args.batch && !args.json && domain_count > 1
}

/// Print each result as soon as its lookup finishes.
async fn run_streaming_check(checker: &WhoisChecker, domains: &[String], args: &Args) {
    let total = domains.len();
    let start_time = Instant::now();
    let mut tally = ui::Tally::default();

    let mut stream = checker.check_domains_stream(domains);
    while let Some(result) = stream.next().await {
        tally.add(&result);
        ui::print_result(&result, args.info, args.debug, Some((tally.total(), total)));
    }

    println!();
    ui::print_summary(&tally, start_time.elapsed());
}

/// Check everything first, then print in input order.
async fn run_batch_check(
    checker: &WhoisChecker,
    domains: &[String],
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let spinner = if !args.json && domains.len() > 1 {
        ui::Spinner::start(format!("Checking {} domains...", domains.len()))
    } else {
        None
    };

    let start_time = Instant::now();
    let results = checker.check_domains(domains).await;
    let duration = start_time.elapsed();

    if let Some(s) = spinner {
        s.stop().await;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        ui::print_result(result, args.info, args.debug, None);
    }

    if results.len() > 1 {
        let tally: ui::Tally = results.iter().collect();
        println!();
        ui::print_summary(&tally, duration);
    }

    Ok(())
}

/// Build CheckConfig from CLI arguments with config file integration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments (explicit user input)
/// 2. Environment variables (WC_*)
/// 3. Local config file (./whois-check.toml)
/// 4. Global config file (~/.whois-check.toml)
/// 5. XDG config file (~/.config/whois-check/config.toml)
/// 6. Built-in defaults
fn build_config(
    args: &Args,
    env_config: EnvConfig,
) -> Result<CheckConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);

    let explicit_path = args.config.as_ref().or(env_config.config.as_ref());
    let file_config = match explicit_path {
        Some(path) => {
            info!("Using config file {}", path.display());
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path.display(), e))?
        }
        None => config_manager.discover_and_load()?,
    };

    let config = file_config.apply_to(CheckConfig::default())?;
    let config = env_config.apply_to(config);
    Ok(apply_cli_args_to_config(config, args))
}

/// Apply CLI arguments to config (highest precedence).
fn apply_cli_args_to_config(mut config: CheckConfig, args: &Args) -> CheckConfig {
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(path) = &args.registry {
        config = config.with_registry_path(path);
    }
    if let Some(path) = &args.registry_override {
        config = config.with_override_path(path);
    }
    config
}

/// Collect domains from arguments and --file, then expand base names with
/// the requested TLDs.
fn get_domains_to_check(args: &Args) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut base_names = args.domains.clone();

    if let Some(file) = &args.file {
        info!("Reading domains from {}", file.display());
        base_names.extend(read_domains_from_file(file)?);
    }

    let expanded_domains = expand_domain_inputs(&base_names, &args.tlds);
    if expanded_domains.is_empty() {
        return Err("No valid domains found to check".into());
    }

    Ok(expanded_domains)
}

/// Read domains from a file, one per line. Blank lines and `#` comments
/// are skipped.
fn read_domains_from_file(path: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    let content = std::fs::read_to_string(path)?;
    let domains: Vec<String> = content
        .lines()
        .filter_map(|line| line.split('#').next())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if domains.is_empty() {
        return Err("No valid domains found in the file.".into());
    }

    Ok(domains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_test_args() -> Args {
        Args {
            domains: vec![],
            tlds: None,
            file: None,
            list_tlds: false,
            json: false,
            info: false,
            batch: false,
            concurrency: None,
            registry: None,
            registry_override: None,
            config: None,
            debug: false,
            verbose: false,
        }
    }

    #[test]
    fn test_validate_requires_input() {
        let args = create_test_args();
        assert!(validate_args(&args).is_err());

        let args = Args {
            list_tlds: true,
            ..create_test_args()
        };
        assert!(validate_args(&args).is_ok());

        let args = Args {
            domains: vec!["example.com".to_string()],
            ..create_test_args()
        };
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_concurrency_range() {
        let args = Args {
            domains: vec!["example.com".to_string()],
            concurrency: Some(0),
            ..create_test_args()
        };
        assert!(validate_args(&args).is_err());

        let args = Args {
            concurrency: Some(101),
            ..args
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_streaming_decision() {
        let args = create_test_args();
        assert!(should_use_streaming(&args, 3));
        assert!(!should_use_streaming(&args, 1));

        let json = Args {
            json: true,
            ..create_test_args()
        };
        assert!(!should_use_streaming(&json, 3));

        let batch = Args {
            batch: true,
            ..create_test_args()
        };
        assert!(!should_use_streaming(&batch, 3));
    }

    #[test]
    fn test_cli_args_override_env_and_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[defaults]\nconcurrency = 5\nread_timeout = \"30s\"\nhttp_timeout = \"2m\"\n")
            .unwrap();
        file.flush().unwrap();

        let env_config = EnvConfig {
            concurrency: Some(7),
            read_timeout: Some(Duration::from_secs(20)),
            ..Default::default()
        };

        let args = Args {
            config: Some(file.path().to_path_buf()),
            concurrency: Some(9),
            registry: Some(PathBuf::from("/tmp/catalog.json")),
            ..create_test_args()
        };

        let config = build_config(&args, env_config).unwrap();
        assert_eq!(config.concurrency, 9);
        assert_eq!(config.read_timeout, Duration::from_secs(20));
        assert_eq!(config.http_timeout, Duration::from_secs(120));
        assert_eq!(config.registry_path, Some(PathBuf::from("/tmp/catalog.json")));
    }

    #[test]
    fn test_missing_explicit_config_is_fatal() {
        let args = Args {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..create_test_args()
        };
        assert!(build_config(&args, EnvConfig::default()).is_err());
    }

    #[test]
    fn test_domains_expand_with_tlds() {
        let args = Args {
            domains: vec!["example".to_string(), "other.org".to_string()],
            tlds: Some(vec!["com".to_string(), ".de".to_string()]),
            ..create_test_args()
        };
        assert_eq!(
            get_domains_to_check(&args).unwrap(),
            vec!["example.com", "example.de", "other.org"]
        );
    }

    #[test]
    fn test_read_domains_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"# list\nexample.com\n\n  spaced.net  \nbase # trailing comment\n")
            .unwrap();
        file.flush().unwrap();

        assert_eq!(
            read_domains_from_file(file.path()).unwrap(),
            vec!["example.com", "spaced.net", "base"]
        );
    }

    #[test]
    fn test_read_domains_from_missing_or_empty_file() {
        assert!(read_domains_from_file(Path::new("/definitely/not/here.txt")).is_err());

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"# only comments\n\n").unwrap();
        file.flush().unwrap();
        assert!(read_domains_from_file(file.path()).is_err());
    }
}
