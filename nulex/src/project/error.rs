use snafu::Snafu;

use crate::image::ImageRef;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Docker { source: crate::docker::Error },

    #[snafu(display(
        "Image '{image}' comes from the internal OpenShift registry; pulling it requires the \
         exposed registry host (--oc-registry-host)"
    ))]
    MissingExposedRegistry { image: ImageRef },
}

impl From<crate::docker::Error> for Error {
    fn from(source: crate::docker::Error) -> Self { Self::Docker { source } }
}
