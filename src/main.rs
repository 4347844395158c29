use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use openai_quota::{load_settings, PollerSettings, PublishOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON settings file; missing keys fall back to defaults.
    #[arg(long, env = "OPENAI_QUOTA_CONFIG", default_value = "openai-quota.json")]
    config: PathBuf,

    /// Directory the badge files are written to.
    #[arg(long, env = "OPENAI_QUOTA_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Override the API root (e.g. for a mock server).
    #[arg(long, env = "OPENAI_BASE_URL")]
    base_url: Option<String>,

    #[arg(long)]
    lookback_days: Option<u32>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the costs API and write the badge files (default).
    Fetch,
    /// Commit and push the badge files. Never fails.
    Publish {
        /// Commit without pushing.
        #[arg(long)]
        no_push: bool,
    },
}

fn main() -> ExitCode {
    // Load .env file if present (for local runs)
    // Silently ignore if not found - CI uses repository secrets
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let args = Args::parse();

    let mut settings = match load_settings(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };
    apply_overrides(&mut settings, &args);

    match args.command.unwrap_or(Command::Fetch) {
        Command::Fetch => fetch(&settings),
        Command::Publish { no_push } => {
            if no_push {
                settings.publish.push = false;
            }
            let files = settings.output_files();
            match openai_quota::publish(&settings.output_dir, &files, &settings.publish) {
                PublishOutcome::NothingToCommit => log::info!("Badges unchanged"),
                PublishOutcome::Committed { pushed } => {
                    log::info!("Badges committed (pushed: {})", pushed)
                }
                // Already logged by publish; the job must not fail here.
                PublishOutcome::Failed { .. } => {}
            }
            ExitCode::SUCCESS
        }
    }
}

fn apply_overrides(settings: &mut PollerSettings, args: &Args) {
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }
    if let Some(url) = &args.base_url {
        settings.base_url = url.clone();
    }
    if let Some(days) = args.lookback_days {
        settings.lookback_days = days;
    }
}

fn fetch(settings: &PollerSettings) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(openai_quota::run(settings)) {
        Ok(report) => {
            log::info!(
                "Summary JSON files created: {}",
                report
                    .written
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
