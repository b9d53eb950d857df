use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    RunOc { source: crate::process::Error },

    #[snafu(display("Failed to parse `oc export` output, error: {source}"))]
    ParseExport { source: serde_json::Error },

    #[snafu(display("`oc whoami` returned an empty user name"))]
    EmptyUsername,

    #[snafu(display("`oc whoami -t` returned an empty token; log in to the cluster first"))]
    EmptyToken,
}

impl From<crate::process::Error> for Error {
    fn from(source: crate::process::Error) -> Self { Self::RunOc { source } }
}
