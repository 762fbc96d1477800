use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use openapiv3::OpenAPI;

use crate::git::{Git, GitError};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{0}': {1}")]
    Io(SchemaLocation, #[source] std::io::Error),
    #[error("failed to read '{0}' from git: {1}")]
    Git(SchemaLocation, #[source] GitError),
    #[error("failed to parse '{0}': {1}")]
    Parse(SchemaLocation, #[source] ParseError),
}

/// Where a schema snapshot lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaLocation {
    File(PathBuf),
    Revision { rev: String, path: String },
}

impl FromStr for SchemaLocation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let revision = s.split_once(':').filter(|(rev, path)| {
            !rev.is_empty()
                && !path.is_empty()
                && !rev.starts_with(['.', '/', '\\'])
                && !is_drive_letter(rev)
        });

        Ok(match revision {
            Some((rev, path)) => SchemaLocation::Revision {
                rev: rev.to_string(),
                path: path.to_string(),
            },
            None => SchemaLocation::File(PathBuf::from(s)),
        })
    }
}

fn is_drive_letter(rev: &str) -> bool {
    rev.len() == 1 && rev.chars().all(|c| c.is_ascii_alphabetic())
}

impl fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaLocation::File(path) => write!(f, "{}", path.display()),
            SchemaLocation::Revision { rev, path } => write!(f, "{rev}:{path}"),
        }
    }
}

enum Format {
    Json,
    Yaml,
}

fn detect_format(path: &Path) -> Option<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(Format::Json),
        Some("yaml" | "yml") => Some(Format::Yaml),
        _ => None,
    }
}

fn parse_content(content: &str, format: Format) -> Result<OpenAPI, ParseError> {
    Ok(match format {
        Format::Json => serde_json::from_str(content)?,
        Format::Yaml => serde_yml::from_str(content)?,
    })
}

/// Parse using the format implied by `path`, falling back to JSON then YAML.
pub fn parse_schema(content: &str, path: &Path) -> Result<OpenAPI, ParseError> {
    match detect_format(path) {
        Some(format) => parse_content(content, format),
        None => parse_content(content, Format::Json)
            .or_else(|_| parse_content(content, Format::Yaml)),
    }
}

#[async_trait]
pub trait SchemaLoader: Send + Sync {
    async fn load(&self, location: &SchemaLocation) -> Result<OpenAPI, LoadError>;
}

/// Loads plain files from disk and revisions through git.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    git: Git,
}

impl Loader {
    pub fn new(git: Git) -> Self {
        Self { git }
    }
}

#[async_trait]
impl SchemaLoader for Loader {
    async fn load(&self, location: &SchemaLocation) -> Result<OpenAPI, LoadError> {
        tracing::info!(%location, "loading schema");
        let (content, path) = match location {
            SchemaLocation::File(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| LoadError::Io(location.clone(), e))?;
                (content, path.clone())
            }
            SchemaLocation::Revision { rev, path } => {
                let content = self
                    .git
                    .show(rev, path)
                    .await
                    .map_err(|e| LoadError::Git(location.clone(), e))?;
                (content, PathBuf::from(path))
            }
        };

        parse_schema(&content, &path).map_err(|e| LoadError::Parse(location.clone(), e))
    }
}

#[cfg(test)]
mod tests;
