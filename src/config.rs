use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::loader::SchemaLocation;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid webhook URL '{url}': {source}")]
    Webhook {
        url: String,
        source: url::ParseError,
    },
    #[error("webhook URL '{0}' must use http or https")]
    WebhookScheme(String),
    #[error(
        "a source is required: pass --pull-request-url with --pull-request-title, \
         or --repository-url with --main-branch"
    )]
    MissingSource,
    #[error("--{0} requires --{1}")]
    Incomplete(&'static str, &'static str),
}

/// What to do when the webhook cannot be reached or rejects the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Log the failure and still finish successfully.
    #[default]
    LogOnly,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    PullRequest { url: String, title: String },
    Compare { repository_url: String, base_ref: String },
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub old: SchemaLocation,
    pub new: SchemaLocation,
    pub source: SourceSpec,
    pub webhook: Url,
    pub bot_name: Option<String>,
    pub repo_dir: Option<PathBuf>,
    pub delivery: DeliveryPolicy,
}

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Schema before the change: a file path or `<rev>:<path>`
    #[arg(long, env = "SCHEMA_OLD")]
    pub old: SchemaLocation,

    /// Schema after the change: a file path or `<rev>:<path>`
    #[arg(long, env = "SCHEMA_NEW")]
    pub new: SchemaLocation,

    /// Incoming webhook to post the summary to
    #[arg(long, env = "WEBHOOK_URL", hide_env_values = true)]
    pub webhook: String,

    #[arg(long, env = "PULL_REQUEST_URL")]
    pub pull_request_url: Option<String>,

    #[arg(long, env = "PULL_REQUEST_TITLE")]
    pub pull_request_title: Option<String>,

    /// Repository web URL, used to link a comparison against --main-branch
    #[arg(long, env = "REPOSITORY_URL")]
    pub repository_url: Option<String>,

    #[arg(long, env = "MAIN_BRANCH_REF")]
    pub main_branch: Option<String>,

    /// Display name for the bot posting the message
    #[arg(long, env = "BOT_NAME")]
    pub bot_name: Option<String>,

    /// Git working tree for revision lookups (defaults to the current directory)
    #[arg(long)]
    pub repo_dir: Option<PathBuf>,

    /// Exit non-zero when the webhook cannot be reached or rejects the message
    #[arg(long)]
    pub fail_on_delivery_error: bool,

    /// Log filter, e.g. `info` or `schema_notify=debug`
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl TryFrom<Cli> for Config {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let webhook = Url::parse(&cli.webhook).map_err(|source| ConfigError::Webhook {
            url: cli.webhook.clone(),
            source,
        })?;
        if !matches!(webhook.scheme(), "http" | "https") {
            return Err(ConfigError::WebhookScheme(cli.webhook));
        }

        let source = match (
            cli.pull_request_url,
            cli.pull_request_title,
            cli.repository_url,
            cli.main_branch,
        ) {
            (Some(url), Some(title), _, _) => SourceSpec::PullRequest { url, title },
            (Some(_), None, _, _) => {
                return Err(ConfigError::Incomplete("pull-request-url", "pull-request-title"));
            }
            (None, Some(_), _, _) => {
                return Err(ConfigError::Incomplete("pull-request-title", "pull-request-url"));
            }
            (None, None, Some(repository_url), Some(base_ref)) => SourceSpec::Compare {
                repository_url,
                base_ref,
            },
            (None, None, Some(_), None) => {
                return Err(ConfigError::Incomplete("repository-url", "main-branch"));
            }
            (None, None, None, _) => return Err(ConfigError::MissingSource),
        };

        Ok(Config {
            old: cli.old,
            new: cli.new,
            source,
            webhook,
            bot_name: cli.bot_name.filter(|name| !name.is_empty()),
            repo_dir: cli.repo_dir,
            delivery: if cli.fail_on_delivery_error {
                DeliveryPolicy::Fail
            } else {
                DeliveryPolicy::LogOnly
            },
        })
    }
}
