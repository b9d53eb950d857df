use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: crate::config::Error },

    #[snafu(display("{source}"))]
    Openshift { source: crate::openshift::Error },

    #[snafu(display("{source}"))]
    Docker { source: crate::docker::Error },

    #[snafu(display("{source}"))]
    Project { source: crate::project::Error },

    #[snafu(display("{source}"))]
    Nulecule { source: crate::nulecule::Error },

    #[snafu(display("Invalid registry login '{input}': expected USERNAME:PASSWORD"))]
    InvalidRegistryLogin { input: String },

    #[snafu(display(
        "--export-images requires --registry-host; pass --skip-push to export without pushing"
    ))]
    MissingRegistryHost,

    #[snafu(display("When running inside a container, --output must be an absolute path"))]
    OutputPathNotAbsolute,

    #[snafu(display("Failed to resolve output path {}, error: {source}", path.display()))]
    ResolveOutputPath { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },

    #[snafu(display("Failed to create tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: std::io::Error },
}

impl From<crate::config::Error> for Error {
    fn from(source: crate::config::Error) -> Self { Self::Configuration { source } }
}

impl From<crate::openshift::Error> for Error {
    fn from(source: crate::openshift::Error) -> Self { Self::Openshift { source } }
}

impl From<crate::docker::Error> for Error {
    fn from(source: crate::docker::Error) -> Self { Self::Docker { source } }
}

impl From<crate::project::Error> for Error {
    fn from(source: crate::project::Error) -> Self { Self::Project { source } }
}

impl From<crate::nulecule::Error> for Error {
    fn from(source: crate::nulecule::Error) -> Self { Self::Nulecule { source } }
}
