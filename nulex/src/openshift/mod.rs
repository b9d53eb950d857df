//! Client for the `oc` command-line tool.
//!
//! All cluster access goes through the `oc` binary; nothing in this tool
//! talks to the API server directly. Every invocation carries the configured
//! kubeconfig and project namespace.

pub mod error;

use std::path::PathBuf;

use snafu::ResultExt;
use tokio::process::Command;

pub use self::error::Error;
use crate::{consts, process::CommandExt as _, project::ExportedProject};

/// Drives the `oc` binary, optionally pinned to a single project.
pub struct OpenshiftClient {
    binary: PathBuf,
    namespace: Option<String>,
    config_file: Option<PathBuf>,
}

impl OpenshiftClient {
    #[must_use]
    pub const fn new(
        binary: PathBuf,
        namespace: Option<String>,
        config_file: Option<PathBuf>,
    ) -> Self {
        Self { binary, namespace, config_file }
    }

    /// The full argument list for an invocation: the configuration file and
    /// namespace (when set) followed by the operation arguments.
    fn invocation_args(&self, args: &[&str]) -> Vec<String> {
        let mut invocation = Vec::with_capacity(args.len() + 4);
        if let Some(config_file) = &self.config_file {
            invocation.push("--config".to_string());
            invocation.push(config_file.display().to_string());
        }
        if let Some(namespace) = &self.namespace {
            invocation.push("--namespace".to_string());
            invocation.push(namespace.clone());
        }
        invocation.extend(args.iter().map(ToString::to_string));
        invocation
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.binary);
        let _command = command.args(self.invocation_args(args));
        command
    }

    /// Exports the project's resources and builds the project model from
    /// them.
    ///
    /// Runs `oc export` over the supported resource kinds and parses the
    /// resulting `List`. Images that appear to come from the internal
    /// OpenShift registry are reported as warnings.
    pub async fn export_project(&self) -> Result<ExportedProject, Error> {
        let resources = consts::EXPORTED_RESOURCES.join(",");
        let output = self.command(&["export", &resources, "-o", "json"]).result().await?;
        let list: serde_json::Value =
            serde_json::from_slice(&output.stdout).context(error::ParseExportSnafu)?;

        let project = ExportedProject::from_kind_list(&list);
        for info in project.images() {
            if info.image.is_internal() {
                tracing::warn!(
                    "{} {} references image '{}' from the internal OpenShift registry",
                    info.kind,
                    info.owner,
                    info.image,
                );
            }
        }
        Ok(project)
    }

    /// The user currently logged in to the cluster (`oc whoami`).
    pub async fn username(&self) -> Result<String, Error> {
        let username = self.command(&["whoami"]).stdout_string().await?.trim().to_string();
        if username.is_empty() {
            return error::EmptyUsernameSnafu.fail();
        }
        Ok(username)
    }

    /// The current session token (`oc whoami -t`), used to authenticate
    /// docker against the exposed internal registry.
    pub async fn token(&self) -> Result<String, Error> {
        let token = self.command(&["whoami", "-t"]).stdout_string().await?.trim().to_string();
        if token.is_empty() {
            return error::EmptyTokenSnafu.fail();
        }
        Ok(token)
    }

    /// Version information reported by `oc version`.
    pub async fn version(&self) -> Result<String, Error> {
        Ok(self.command(&["version"]).stdout_string().await?.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::OpenshiftClient;

    #[test]
    fn test_invocation_args_with_namespace_and_config() {
        let client = OpenshiftClient::new(
            PathBuf::from("oc"),
            Some("myproject".to_string()),
            Some(PathBuf::from("/etc/oc/config")),
        );
        assert_eq!(
            client.invocation_args(&["export", "services", "-o", "json"]),
            vec![
                "--config",
                "/etc/oc/config",
                "--namespace",
                "myproject",
                "export",
                "services",
                "-o",
                "json"
            ]
        );
    }

    #[test]
    fn test_invocation_args_without_optional_parts() {
        let client = OpenshiftClient::new(PathBuf::from("oc"), None, None);
        assert_eq!(client.invocation_args(&["version"]), vec!["version"]);
    }
}
