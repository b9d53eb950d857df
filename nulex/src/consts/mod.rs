pub mod k8s;

/// Resources exported from a project, in `oc export` argument form.
///
/// Replication controllers carry enough information to recreate the pods they
/// own; standalone pods are exported separately.
pub const EXPORTED_RESOURCES: &[&str] =
    &["pods", "replicationcontrollers", "persistentvolumeclaims", "services"];

/// The Nulecule specification version emitted in descriptors and Dockerfiles.
pub const NULECULE_SPECVERSION: &str = "0.0.2";

/// Base image of the generated Dockerfile.
pub const ATOMICAPP_IMAGE: &str = "projectatomic/atomicapp";

/// Default tag of [`ATOMICAPP_IMAGE`] when none is configured.
pub const DEFAULT_ATOMICAPP_VERSION: &str = "0.1.11";

/// Default `oc` binary, resolved through `PATH`.
pub const DEFAULT_OC_BINARY: &str = "oc";

/// Default docker binary, resolved through `PATH`.
pub const DEFAULT_DOCKER_BINARY: &str = "docker";
