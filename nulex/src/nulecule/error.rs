use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Output directory {} must not exist", path.display()))]
    OutputExists { path: PathBuf },

    #[snafu(display("Failed to create directory {}, error: {source}", path.display()))]
    CreateDirectory { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to serialize artifact {name}, error: {source}"))]
    SerializeArtifact { name: String, source: serde_json::Error },

    #[snafu(display("Failed to serialize the Nulecule descriptor, error: {source}"))]
    SerializeDescriptor { source: serde_yaml::Error },

    #[snafu(display("Failed to write {}, error: {source}", path.display()))]
    WriteFile { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to list {}, error: {source}", path.display()))]
    ListDirectory { path: PathBuf, source: std::io::Error },
}
