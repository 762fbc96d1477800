use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod change;
mod changes;
mod config;
mod diff;
mod emphasis;
mod git;
mod loader;
mod notify;
mod pipeline;
mod render;
mod revision;

use config::{Cli, Config, ConfigError};
use git::Git;
use loader::Loader;
use notify::Webhook;
use pipeline::{Outcome, Pipeline, PipelineError};

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

async fn run(cli: Cli) -> Result<(), Error> {
    let config = Config::try_from(cli)?;
    let git = Git::new(config.repo_dir.clone());
    let loader = Loader::new(git.clone());
    let webhook = Webhook::new(config.webhook.clone());

    let pipeline = Pipeline {
        loader: &loader,
        revisions: &git,
        notifier: &webhook,
    };

    match pipeline.run(&config).await? {
        Outcome::NoChanges => tracing::info!("nothing to report"),
        Outcome::Delivered(delivered) => {
            tracing::info!(status = delivered.status.as_u16(), "summary posted")
        }
        Outcome::DeliveryFailed(err) => tracing::error!(
            error = %err,
            "summary was not posted; finishing without failing the build"
        ),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let (filter, bad_filter) = match EnvFilter::try_new(&cli.log_level) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("info"), Some(e)),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Some(e) = bad_filter {
        tracing::warn!(log_level = %cli.log_level, error = %e, "invalid log filter, using info");
    }

    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
