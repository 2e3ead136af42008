//! vclsync - keep local VCL files in step with a Fastly service
//!
//! Resolves configuration, then hands off to the command handlers.

use console::style;
use std::io;
use tracing_subscriber::EnvFilter;
use vclsync::cli::{Cli, Commands};
use vclsync::commands::{self, Context};
use vclsync::version::UploadTarget;
use vclsync::{Config, Result};

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    std::process::exit(exit_code);
}

/// Main application entry point
async fn run() -> i32 {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{} {err}", style("Error:").red().bold());
            err.exit_code()
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the `--debug` default
fn init_tracing(debug: bool) {
    let fallback = if debug { "vclsync=debug" } else { "vclsync=warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Execute the requested command
async fn execute(cli: Cli) -> Result<()> {
    let mut out = io::stdout();

    if matches!(cli.command, Commands::Version) {
        return commands::version(&mut out);
    }

    let config = Config::resolve(cli.config.as_deref(), cli.overrides())?;
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::List { version } => commands::list(&ctx, version, &mut out).await,
        Commands::Diff { version } => {
            let _ = commands::diff(&ctx, version, &mut out).await?;
            Ok(())
        }
        Commands::Upload {
            clone,
            version,
            latest,
        } => {
            let target = UploadTarget {
                clone_from: clone,
                version,
                latest,
            };
            let _ = commands::upload(&ctx, &target, &mut out).await?;
            Ok(())
        }
        Commands::Delete { name, version } => {
            commands::delete(&ctx, &name, version, &mut out).await
        }
        Commands::Status { version } => commands::status(&ctx, version, &mut out).await,
        Commands::Settings { version } => commands::settings(&ctx, version, &mut out).await,
        Commands::Activate { version } => commands::activate(&ctx, version, &mut out).await,
        Commands::Validate { version } => {
            let _ = commands::validate(&ctx, version, &mut out).await?;
            Ok(())
        }
        Commands::Version => commands::version(&mut out),
    }
}
