//! policyscope CLI
//!
//! Loads a JSON fixture (scopes and policy exports), resolves one scope and
//! prints the conflict report as JSON on stdout.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use policyscope::{InMemoryPolicySource, IdentityFolding, ResolveConfig, Resolver};

/// CLI configuration
#[derive(Debug)]
struct Args {
    input: PathBuf,
    scope: String,
    config: ResolveConfig,
    pretty: bool,
}

fn usage() {
    println!("policyscope - policy conflict analysis");
    println!();
    println!("USAGE:");
    println!("    policyscope --input <FILE> --scope <SCOPE> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -i, --input <FILE>        JSON fixture with scopes and policy exports");
    println!("    -s, --scope <SCOPE>       Scope to analyze");
    println!("        --enforced-only       Only analyze enforced links");
    println!("        --no-machine          Skip machine settings");
    println!("        --no-user             Skip user settings");
    println!("        --key-filter <REGEX>  Only analyze matching key paths");
    println!("        --ignore-case         Compare key paths and value names case-insensitively");
    println!("    -j, --jobs <N>            Fetch exports on N threads [default: 1]");
    println!("        --pretty              Indent JSON output");
    println!("    -h, --help                Print help information");
}

fn value_for(args: &[String], i: usize, flag: &str) -> Result<String, String> {
    args.get(i + 1)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

/// Parses command-line arguments, excluding the program name.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Option<Args>, String> {
    let args: Vec<String> = args.into_iter().collect();
    let mut input = None;
    let mut scope = None;
    let mut config = ResolveConfig::default();
    let mut pretty = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" | "-i" => {
                input = Some(PathBuf::from(value_for(&args, i, "--input")?));
                i += 2;
            }
            "--scope" | "-s" => {
                scope = Some(value_for(&args, i, "--scope")?);
                i += 2;
            }
            "--key-filter" => {
                config.key_filter = Some(value_for(&args, i, "--key-filter")?);
                i += 2;
            }
            "--jobs" | "-j" => {
                let raw = value_for(&args, i, "--jobs")?;
                config.extraction_workers = raw
                    .parse()
                    .map_err(|_| format!("invalid job count: {raw}"))?;
                i += 2;
            }
            "--enforced-only" => {
                config.enforced_only = true;
                i += 1;
            }
            "--no-machine" => {
                config.include_machine = false;
                i += 1;
            }
            "--no-user" => {
                config.include_user = false;
                i += 1;
            }
            "--ignore-case" => {
                config.identity_folding = IdentityFolding::AsciiCaseInsensitive;
                i += 1;
            }
            "--pretty" => {
                pretty = true;
                i += 1;
            }
            "--help" | "-h" => {
                usage();
                return Ok(None);
            }
            arg => return Err(format!("unknown argument: {arg}")),
        }
    }

    let input = input.ok_or("--input is required")?;
    let scope = scope.ok_or("--scope is required")?;
    Ok(Some(Args {
        input,
        scope,
        config,
        pretty,
    }))
}

fn run(args: Args) -> Result<(), String> {
    let source =
        InMemoryPolicySource::from_json_file(&args.input).map_err(|e| e.to_string())?;
    let resolver = Resolver::new(Arc::new(source));
    let report = resolver
        .resolve(&args.scope, &args.config)
        .map_err(|e| e.to_string())?;

    let json = if args.pretty {
        report.to_json_pretty()
    } else {
        report.to_json()
    }
    .map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => return ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
