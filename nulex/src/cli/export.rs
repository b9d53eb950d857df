//! The `export` subcommand: package a project as a Nulecule application.
//!
//! This is the main operation of the tool. It exports the project's
//! resources through `oc`, optionally relocates the referenced images with
//! docker, and writes the application tree (per-provider artifact files, the
//! Nulecule descriptor and a Dockerfile).

use std::{collections::BTreeMap, str::FromStr, time::Duration};

use clap::{Args, ValueEnum};
use indicatif::ProgressBar;
use snafu::ResultExt;

use crate::{
    cli::{Error, error},
    config::Config,
    docker::DockerClient,
    nulecule::{AppWriter, Descriptor, Provider},
    openshift::OpenshiftClient,
};

/// Which referenced images to relocate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportImages {
    /// Do not export any images.
    #[default]
    None,
    /// Export only images from the internal OpenShift registry.
    Internal,
    /// Export all images, including those from external registries.
    All,
}

/// Credentials for an external registry, given as `USERNAME:PASSWORD`.
#[derive(Clone, Debug)]
pub struct RegistryLogin {
    pub username: String,
    pub password: String,
}

impl FromStr for RegistryLogin {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.split_once(':') {
            Some((username, password)) if !username.is_empty() => {
                Ok(Self { username: username.to_string(), password: password.to_string() })
            }
            _ => Err(Error::InvalidRegistryLogin { input: input.to_string() }),
        }
    }
}

#[derive(Args, Clone)]
pub struct ExportCommand {
    /// Directory where the new Nulecule application is created.
    #[arg(
        long,
        help = "Directory where the new Nulecule application is created (must not exist)"
    )]
    pub output: std::path::PathBuf,

    /// OpenShift project (namespace) to export.
    #[arg(long, help = "OpenShift project (namespace) to export as a Nulecule application")]
    pub project: String,

    #[arg(long = "oc", help = "Path of the oc binary. Defaults to the configured one.")]
    pub oc_binary: Option<std::path::PathBuf>,

    #[arg(long = "oc-config", help = "Path of the configuration file for the oc command")]
    pub oc_config: Option<std::path::PathBuf>,

    #[arg(
        long = "oc-registry-host",
        help = "Hostname of the exposed internal OpenShift registry"
    )]
    pub oc_registry_host: Option<String>,

    /// Pull the images referenced by the exported artifacts into the local
    /// docker instance and push them to the registry given by
    /// `--registry-host`.
    #[arg(
        long = "export-images",
        value_enum,
        default_value_t = ExportImages::None,
        help = "Pull the images referenced by the exported artifacts into the local docker \
                instance and push them to the registry given by --registry-host"
    )]
    pub export_images: ExportImages,

    #[arg(
        long = "registry-host",
        help = "External registry hostname. Exported images are pushed there."
    )]
    pub registry_host: Option<String>,

    #[arg(
        long = "registry-login",
        help = "Login for the external registry, if it requires one (USERNAME:PASSWORD)"
    )]
    pub registry_login: Option<RegistryLogin>,

    #[arg(long = "skip-push", help = "Do not push images to the external registry")]
    pub skip_push: bool,

    #[arg(
        long = "atomicapp-version",
        help = "atomicapp version for the generated Dockerfile. Defaults to the configured one."
    )]
    pub atomicapp_version: Option<String>,
}

impl ExportCommand {
    pub async fn run(self, config: Config) -> Result<(), Error> {
        let Self {
            output,
            project,
            oc_binary,
            oc_config,
            oc_registry_host,
            export_images,
            registry_host,
            registry_login,
            skip_push,
            atomicapp_version,
        } = self;

        if export_images != ExportImages::None && !skip_push && registry_host.is_none() {
            return Err(Error::MissingRegistryHost);
        }

        if nulex_base::utils::in_container() && !output.is_absolute() {
            return Err(Error::OutputPathNotAbsolute);
        }
        let output = std::path::absolute(&output)
            .with_context(|_| error::ResolveOutputPathSnafu { path: output.clone() })?;
        let app_root = nulex_base::utils::host_path(&output);
        AppWriter::ensure_absent(&app_root).await?;

        let oc = OpenshiftClient::new(
            oc_binary.unwrap_or_else(|| config.oc_binary.clone()),
            Some(project.clone()),
            oc_config,
        );

        let spinner = progress(format!("Exporting project {project}"));
        let mut exported = oc.export_project().await?;
        spinner.finish_with_message(format!(
            "Exported {} objects referencing {} images",
            exported.artifacts().len(),
            exported.images().len()
        ));

        if export_images != ExportImages::None {
            let docker = DockerClient::new(config.docker_binary.clone());
            let client_version = docker.version().await?;
            tracing::debug!("Using docker client {client_version}");

            let only_internal = export_images == ExportImages::Internal;

            let username = oc.username().await?;
            let token = oc.token().await?;

            let spinner = progress("Pulling images".to_string());
            exported
                .pull_images(&docker, oc_registry_host.as_deref(), &username, &token, only_internal)
                .await?;
            spinner.finish_with_message("Images pulled");

            if let Some(registry) = registry_host.as_deref()
                && !skip_push
            {
                let spinner = progress(format!("Pushing images to {registry}"));
                let credentials = registry_login
                    .as_ref()
                    .map(|login| (login.username.as_str(), login.password.as_str()));
                exported.push_images(&docker, registry, credentials, only_internal).await?;
                spinner.finish_with_message("Images pushed");
            }

            exported.update_artifact_images();
        }

        exported.strip_security_contexts();

        let writer = AppWriter::create(app_root).await?;
        let mut provider_artifacts = BTreeMap::new();
        for provider in Provider::ALL {
            let references = writer.write_artifacts(*provider, exported.artifacts()).await?;
            let _previous = provider_artifacts.insert(*provider, references);
        }

        let descriptor = Descriptor::single_component(&project, provider_artifacts);
        writer.write_descriptor(&descriptor).await?;

        let atomicapp_version =
            atomicapp_version.unwrap_or_else(|| config.atomicapp_version.clone());
        writer.write_dockerfile(&atomicapp_version).await?;

        tracing::info!(
            "Nulecule application created in {}",
            nulex_base::utils::display_path(writer.root()).display()
        );
        Ok(())
    }
}

fn progress(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

#[cfg(test)]
mod tests {
    use super::RegistryLogin;

    #[test]
    fn test_registry_login_parses_user_and_password() {
        let login: RegistryLogin = "user:secret".parse().expect("Should parse");
        assert_eq!(login.username, "user");
        assert_eq!(login.password, "secret");
    }

    #[test]
    fn test_registry_login_keeps_colons_in_password() {
        let login: RegistryLogin = "user:se:cr:et".parse().expect("Should parse");
        assert_eq!(login.password, "se:cr:et");
    }

    #[test]
    fn test_registry_login_rejects_missing_separator() {
        assert!("useronly".parse::<RegistryLogin>().is_err());
    }

    #[test]
    fn test_registry_login_rejects_empty_username() {
        assert!(":secret".parse::<RegistryLogin>().is_err());
    }
}
