use crate::change::Severity;
use crate::changes::Buckets;
use crate::config::{Config, DeliveryPolicy, SourceSpec};
use crate::diff::diff_specs;
use crate::loader::{LoadError, SchemaLoader};
use crate::notify::{Delivered, DeliveryError, Notifier, Payload, Source};
use crate::render::render_attachments;
use crate::revision::{RevisionError, RevisionResolver, compare_link};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Revision(#[from] RevisionError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// How a run ended when it did not fail.
#[derive(Debug)]
pub enum Outcome {
    NoChanges,
    Delivered(Delivered),
    /// Delivery failed and the policy says to carry on.
    DeliveryFailed(DeliveryError),
}

/// The collaborators a run talks to.
pub struct Pipeline<'a> {
    pub loader: &'a dyn SchemaLoader,
    pub revisions: &'a dyn RevisionResolver,
    pub notifier: &'a dyn Notifier,
}

impl Pipeline<'_> {
    pub async fn run(&self, config: &Config) -> Result<Outcome, PipelineError> {
        let old = self.loader.load(&config.old).await?;
        let new = self.loader.load(&config.new).await?;

        let changes = diff_specs(&old, &new);
        if changes.is_empty() {
            tracing::info!("no changes detected");
            return Ok(Outcome::NoChanges);
        }

        for change in &changes {
            tracing::debug!("{change}");
        }

        let buckets = Buckets::classify(&changes);
        tracing::info!(
            total = buckets.len(),
            breaking = buckets.get(Severity::Breaking).len(),
            dangerous = buckets.get(Severity::Dangerous).len(),
            safe = buckets.get(Severity::Safe).len(),
            "classified changes"
        );
        let attachments = render_attachments(&buckets);

        let source = match &config.source {
            SourceSpec::PullRequest { url, title } => Source::PullRequest {
                url: url.clone(),
                title: title.clone(),
            },
            SourceSpec::Compare {
                repository_url,
                base_ref,
            } => Source::Compare(compare_link(self.revisions, repository_url, base_ref).await?),
        };

        let payload = Payload::new(&source, attachments, config.bot_name.clone());
        match self.notifier.send(&payload).await {
            Ok(delivered) => Ok(Outcome::Delivered(delivered)),
            Err(err) => match config.delivery {
                DeliveryPolicy::LogOnly => Ok(Outcome::DeliveryFailed(err)),
                DeliveryPolicy::Fail => Err(err.into()),
            },
        }
    }
}
