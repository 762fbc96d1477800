use std::path::PathBuf;

use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        source: std::io::Error,
    },
    #[error("git {args} exited with {status}: {stderr}")]
    Failed {
        args: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Runs git subcommands, optionally inside a given working tree.
#[derive(Debug, Clone, Default)]
pub struct Git {
    dir: Option<PathBuf>,
}

impl Git {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Run `git <args>` and return stdout with surrounding whitespace removed.
    pub async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let joined = args.join(" ");
        tracing::debug!(args = %joined, "running git");

        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|source| GitError::Spawn {
            args: joined.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(GitError::Failed {
                args: joined,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Contents of `path` as of `rev`.
    pub async fn show(&self, rev: &str, path: &str) -> Result<String, GitError> {
        self.run(&["show", &format!("{rev}:{path}")]).await
    }
}
