//! Client for the docker command-line tool.

pub mod error;

use std::path::PathBuf;

use snafu::ResultExt;
use tokio::process::Command;

pub use self::error::Error;
use crate::{image::ImageRef, process::CommandExt as _};

/// Drives the docker CLI for image pulls, tags and pushes.
pub struct DockerClient {
    binary: PathBuf,
}

impl DockerClient {
    #[must_use]
    pub const fn new(binary: PathBuf) -> Self { Self { binary } }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.binary);
        let _command = command.args(args);
        command
    }

    /// Version reported by the docker client.
    ///
    /// Used as a probe: a failure here means the binary is missing or the
    /// daemon is unreachable, and the relocation passes cannot work.
    pub async fn version(&self) -> Result<String, Error> {
        let version = self
            .command(&["version", "--format", "{{.Client.Version}}"])
            .stdout_string()
            .await
            .with_context(|_| error::DockerNotInstalledSnafu {
                binary: self.binary.display().to_string(),
            })?;
        Ok(version.trim().to_string())
    }

    /// Logs in to `registry`, feeding the password through stdin.
    pub async fn login(&self, registry: &str, username: &str, password: &str) -> Result<(), Error> {
        tracing::info!("Logging in to registry {registry} as {username}");
        let _output = self
            .command(&["login", "--username", username, "--password-stdin", registry])
            .result_with_stdin(password.as_bytes())
            .await?;
        Ok(())
    }

    /// Pulls `image` into the local docker instance.
    pub async fn pull(&self, image: &ImageRef) -> Result<(), Error> {
        tracing::info!("Pulling image {image}");
        let _output = self.command(&["pull", &image.to_string()]).result().await?;
        Ok(())
    }

    /// Tags `source` as `target`.
    pub async fn tag(&self, source: &ImageRef, target: &ImageRef) -> Result<(), Error> {
        tracing::debug!("Tagging image {source} as {target}");
        let _output =
            self.command(&["tag", &source.to_string(), &target.to_string()]).result().await?;
        Ok(())
    }

    /// Pushes `image` to its registry.
    pub async fn push(&self, image: &ImageRef) -> Result<(), Error> {
        tracing::info!("Pushing image {image}");
        let _output = self.command(&["push", &image.to_string()]).result().await?;
        Ok(())
    }
}
