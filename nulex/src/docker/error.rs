use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display(
        "Unable to find a usable `{binary}` executable
  Please make sure the container engine CLI is installed and in your PATH, error: {source}"
    ))]
    DockerNotInstalled { binary: String, source: crate::process::Error },

    #[snafu(display("{source}"))]
    RunDocker { source: crate::process::Error },
}

impl From<crate::process::Error> for Error {
    fn from(source: crate::process::Error) -> Self { Self::RunDocker { source } }
}
