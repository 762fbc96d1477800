use async_trait::async_trait;

use crate::git::{Git, GitError};

pub const SHORT_REV_LEN: usize = 7;

#[derive(Debug, thiserror::Error)]
pub enum RevisionError {
    #[error("cannot resolve '{reference}': {source}")]
    Git {
        reference: String,
        source: GitError,
    },
    #[error("cannot resolve '{0}': git printed no revision")]
    Empty(String),
}

#[async_trait]
pub trait RevisionResolver: Send + Sync {
    /// Resolve a symbolic reference (branch, tag, `HEAD`) to a short commit id.
    async fn short_rev(&self, reference: &str) -> Result<String, RevisionError>;
}

#[async_trait]
impl RevisionResolver for Git {
    async fn short_rev(&self, reference: &str) -> Result<String, RevisionError> {
        let full = self
            .run(&["rev-parse", reference])
            .await
            .map_err(|source| RevisionError::Git {
                reference: reference.to_string(),
                source,
            })?;
        if full.is_empty() {
            return Err(RevisionError::Empty(reference.to_string()));
        }
        Ok(shorten(&full))
    }
}

pub fn shorten(full: &str) -> String {
    full.chars().take(SHORT_REV_LEN).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareLink {
    pub url: String,
    pub head: String,
}

/// Build `<repository>/compare/<base>...<head>`, inserting the separator
/// when `repository_url` does not already end with one.
pub fn compare_url(repository_url: &str, base: &str, head: &str) -> String {
    let sep = if repository_url.ends_with('/') { "" } else { "/" };
    format!("{repository_url}{sep}compare/{base}...{head}")
}

/// Resolve `base_ref` and `HEAD` together and link their comparison.
pub async fn compare_link<R>(
    resolver: &R,
    repository_url: &str,
    base_ref: &str,
) -> Result<CompareLink, RevisionError>
where
    R: RevisionResolver + ?Sized,
{
    let (base, head) = tokio::try_join!(resolver.short_rev(base_ref), resolver.short_rev("HEAD"))?;
    tracing::info!(%base, %head, "resolved revisions");

    Ok(CompareLink {
        url: compare_url(repository_url, &base, &head),
        head,
    })
}
