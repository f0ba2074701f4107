use anyhow::Context;
use clap::{Parser, Subcommand};
use dist_verify::config::{read_config, write_config, ConfigError, VerifyConfig};
use dist_verify::reconciliation::{reconcile, scan, ReconcileError, ReconcileReport};
use dist_verify::snapshot::snapshot_manifest;
use dist_verify::utils::{now_iso, CONFIG_FILE};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// dist-verify - check that a build output directory holds exactly the expected files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the build output against the manifest
    Check {
        #[command(flatten)]
        target: TargetArgs,

        /// List every missing and unexpected file instead of stopping at the first reason
        #[arg(long)]
        report: bool,

        /// Print the report as JSON. Implies --report.
        #[arg(long)]
        json: bool,
    },

    /// Generate a sorted manifest from the current build output
    Snapshot {
        #[command(flatten)]
        target: TargetArgs,

        /// Write the manifest into the config file instead of printing it
        #[arg(long)]
        write: bool,
    },
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// Path to the manifest config file
    #[arg(short, long, env = "DIST_VERIFY_CONFIG", default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Build output directory, overriding the config's root
    #[arg(short, long, env = "DIST_VERIFY_ROOT")]
    root: Option<PathBuf>,

    /// Extra directory to skip, relative to the root. Repeatable.
    #[arg(short, long = "ignore", value_name = "DIR")]
    ignore: Vec<String>,
}

struct Target {
    config: VerifyConfig,
    root: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(args.command).await {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Check {
            target,
            report,
            json,
        } => check(target, report, json).await,
        Command::Snapshot { target, write } => snapshot(target, write).await,
    }
}

async fn load_target(args: &TargetArgs, allow_missing: bool) -> anyhow::Result<Target> {
    let mut config = match read_config(&args.config).await {
        Ok(config) => config,
        Err(ConfigError::NotFound(path)) if allow_missing => {
            info!(config = %path, "No config file, starting from defaults");
            VerifyConfig::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load {}", args.config.display()))
        }
    };

    for dir in &args.ignore {
        config.ignore_dirs.insert(dir.as_str())?;
    }

    let root = match &args.root {
        Some(root) => root.clone(),
        None => config.resolve_root(&args.config),
    };

    Ok(Target { config, root })
}

async fn check(args: TargetArgs, report_mode: bool, json: bool) -> anyhow::Result<ExitCode> {
    let Target { config, root } = load_target(&args, false).await?;

    if !config.expected_files.is_sorted() {
        warn!(
            config = %args.config.display(),
            "expectedFiles is not sorted; please keep it in ascending order"
        );
    }

    let options = config.walk_options()?;
    let outcome = if report_mode || json {
        scan(&root, &config.expected_files, &config.ignore_dirs, &options).await
    } else {
        reconcile(&root, &config.expected_files, &config.ignore_dirs, &options).await
    };

    match outcome {
        Ok(report) => {
            print_report(&report, json)?;
            if report.is_clean() {
                Ok(ExitCode::SUCCESS)
            } else {
                error!(
                    missing = report.missing.len(),
                    unexpected = report.unexpected.len(),
                    "Build output does not match manifest"
                );
                Ok(ExitCode::from(1))
            }
        }
        Err(e) => {
            error!(root = %root.display(), "{e}");
            if json {
                println!("{}", serde_json::to_string_pretty(&failure_document(&root, &e))?);
            }
            Ok(ExitCode::from(1))
        }
    }
}

fn print_report(report: &ReconcileReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for path in &report.missing {
        println!("missing     {path}");
    }
    for path in &report.unexpected {
        println!("unexpected  {path}");
    }
    println!(
        "{}: {} file(s) checked, {} missing, {} unexpected, {} ignored path(s)",
        report.root,
        report.visited.len(),
        report.missing.len(),
        report.unexpected.len(),
        report.ignored.len()
    );
    Ok(())
}

/// JSON printed when the walk itself fails and there is no report
fn failure_document(root: &Path, err: &ReconcileError) -> serde_json::Value {
    serde_json::json!({
        "root": root.to_string_lossy(),
        "error": err.to_string(),
        "checkedAt": now_iso(),
    })
}

async fn snapshot(args: TargetArgs, write: bool) -> anyhow::Result<ExitCode> {
    let Target { mut config, root } = load_target(&args, true).await?;

    let manifest = snapshot_manifest(&root, &config.ignore_dirs, config.follow_symlinks)
        .with_context(|| format!("Failed to snapshot {}", root.display()))?;
    info!(root = %root.display(), files = manifest.len(), "Generated manifest");

    if !write {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(root) = &args.root {
        config.set_root(root, &args.config).await?;
    }
    config.expected_files = manifest;
    write_config(&args.config, &config)
        .await
        .with_context(|| format!("Failed to write {}", args.config.display()))?;
    info!(config = %args.config.display(), "Updated expectedFiles");

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_check_flags() {
        let args = Args::try_parse_from(["dist-verify", "check", "--json", "-i", "cache"]).unwrap();
        match args.command {
            Command::Check {
                target,
                report,
                json,
            } => {
                assert!(json);
                assert!(!report);
                assert_eq!(target.ignore, vec!["cache"]);
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_failure_document() {
        let err = ReconcileError::InvalidPathType("dist/fifo".to_string());
        let doc = failure_document(Path::new("dist"), &err);

        assert_eq!(doc["root"], "dist");
        assert_eq!(doc["error"], "`dist/fifo` is not a file or a directory");
        assert!(doc["checkedAt"].is_string());
    }
}
