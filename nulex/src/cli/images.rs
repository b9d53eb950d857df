//! The `images` subcommand: list the images a project references.

use std::path::PathBuf;

use clap::Args;
use snafu::ResultExt;
use tokio::io::AsyncWriteExt;

use crate::{
    cli::{Error, error},
    config::Config,
    openshift::OpenshiftClient,
    ui::table::ImageInfoListExt as _,
};

/// Lists the container images referenced by a project's exported objects,
/// with their registry classification.
#[derive(Args, Clone)]
pub struct ImagesCommand {
    #[arg(long, help = "OpenShift project (namespace) to inspect")]
    pub project: String,

    #[arg(long = "oc", help = "Path of the oc binary. Defaults to the configured one.")]
    pub oc_binary: Option<PathBuf>,

    #[arg(long = "oc-config", help = "Path of the configuration file for the oc command")]
    pub oc_config: Option<PathBuf>,
}

impl ImagesCommand {
    pub async fn run(self, config: Config) -> Result<(), Error> {
        let Self { project, oc_binary, oc_config } = self;

        let oc = OpenshiftClient::new(
            oc_binary.unwrap_or_else(|| config.oc_binary.clone()),
            Some(project),
            oc_config,
        );
        let exported = oc.export_project().await?;

        tokio::io::stdout()
            .write_all(exported.images().render_table().as_bytes())
            .await
            .context(error::WriteStdoutSnafu)?;
        tokio::io::stdout().write_u8(b'\n').await.context(error::WriteStdoutSnafu)
    }
}
