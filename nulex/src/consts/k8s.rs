//! Kubernetes definitions used when filtering exported objects.

pub mod kind {
    //! Kinds supported as Nulecule artifacts.

    pub const POD: &str = "Pod";
    pub const REPLICATION_CONTROLLER: &str = "ReplicationController";
    pub const SERVICE: &str = "Service";
    pub const PERSISTENT_VOLUME_CLAIM: &str = "PersistentVolumeClaim";
}

pub mod annotations {
    //! Kubernetes annotations used by Nulex.

    /// Set by the control plane on pods that were created by a controller.
    pub const CREATED_BY: &str = "kubernetes.io/created-by";
}
