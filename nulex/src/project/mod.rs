//! In-memory model of an exported OpenShift project.
//!
//! Artifacts stay untyped (`serde_json::Value`): they are written back to
//! disk verbatim, and a typed round trip would drop fields this tool does not
//! know about. Typed views are only taken where containers are inspected.

pub mod error;

use k8s_openapi::api::core::v1::Container;
use serde_json::Value;

pub use self::error::Error;
use crate::{consts::k8s, docker::DockerClient, image::ImageRef};

/// A container image referenced by an exported object.
#[derive(Clone, Debug)]
pub struct ImageInfo {
    /// Kind of the referencing object.
    pub kind: String,
    /// Name of the referencing object.
    pub owner: String,
    /// The reference as it appears in the artifact.
    pub image: ImageRef,
    /// Where the image ended up after a push, if one happened.
    pub relocated: Option<ImageRef>,
}

/// The exported objects of a project together with the container images they
/// reference.
pub struct ExportedProject {
    artifacts: Vec<Value>,
    images: Vec<ImageInfo>,
}

impl ExportedProject {
    /// Builds the project model from the `List` object produced by
    /// `oc export`.
    ///
    /// Only the supported kinds are kept. Pods created by a replication
    /// controller are dropped; exporting the controller is enough to recreate
    /// them.
    #[must_use]
    pub fn from_kind_list(list: &Value) -> Self {
        let items = list.get("items").and_then(Value::as_array).cloned().unwrap_or_default();

        let artifacts: Vec<Value> = items
            .into_iter()
            .filter(|item| match item_kind(item) {
                k8s::kind::POD => !is_controller_owned(item),
                k8s::kind::REPLICATION_CONTROLLER
                | k8s::kind::SERVICE
                | k8s::kind::PERSISTENT_VOLUME_CLAIM => true,
                kind => {
                    tracing::debug!("Skipping unsupported kind '{kind}'");
                    false
                }
            })
            .collect();

        let images = artifacts.iter().flat_map(scan_images).collect();

        Self { artifacts, images }
    }

    /// The exported objects, in export order.
    #[must_use]
    pub fn artifacts(&self) -> &[Value] { &self.artifacts }

    /// The container images referenced by the exported objects.
    #[must_use]
    pub fn images(&self) -> &[ImageInfo] { &self.images }

    /// Removes `securityContext` from standalone pod artifacts and their
    /// containers. Exported contexts carry cluster-specific UIDs and SELinux
    /// options that do not apply anywhere else.
    pub fn strip_security_contexts(&mut self) {
        for artifact in &mut self.artifacts {
            if !item_kind(artifact).eq_ignore_ascii_case(k8s::kind::POD) {
                continue;
            }
            let Some(spec) = artifact.get_mut("spec").and_then(Value::as_object_mut) else {
                continue;
            };
            let _removed = spec.remove("securityContext");
            if let Some(containers) = spec.get_mut("containers").and_then(Value::as_array_mut) {
                for container in containers {
                    if let Some(container) = container.as_object_mut() {
                        let _removed = container.remove("securityContext");
                    }
                }
            }
        }
    }

    /// Pulls the referenced images into the local docker instance.
    ///
    /// Internal images are fetched through `exposed_registry` — logging in
    /// with the cluster credentials first — and retagged to the reference the
    /// artifacts use. External images are pulled directly. With
    /// `only_internal`, external images are left alone.
    pub async fn pull_images(
        &self,
        docker: &DockerClient,
        exposed_registry: Option<&str>,
        username: &str,
        token: &str,
        only_internal: bool,
    ) -> Result<(), Error> {
        let mut logged_in = false;

        for info in self.in_scope_images(only_internal) {
            if info.image.is_internal() {
                let Some(exposed) = exposed_registry else {
                    return error::MissingExposedRegistrySnafu { image: info.image.clone() }.fail();
                };
                if !logged_in {
                    docker.login(exposed, username, token).await?;
                    logged_in = true;
                }
                let pull_ref = info.image.with_registry(exposed);
                docker.pull(&pull_ref).await?;
                docker.tag(&pull_ref, &info.image).await?;
            } else {
                docker.pull(&info.image).await?;
            }
        }
        Ok(())
    }

    /// Retags and pushes the referenced images to `registry`, recording the
    /// relocated reference for each pushed image.
    pub async fn push_images(
        &mut self,
        docker: &DockerClient,
        registry: &str,
        credentials: Option<(&str, &str)>,
        only_internal: bool,
    ) -> Result<(), Error> {
        if let Some((username, password)) = credentials {
            docker.login(registry, username, password).await?;
        }

        for info in &mut self.images {
            if only_internal && !info.image.is_internal() {
                continue;
            }
            let target = info.image.relocated_to(registry);
            docker.tag(&info.image, &target).await?;
            docker.push(&target).await?;
            info.relocated = Some(target);
        }
        Ok(())
    }

    /// Rewrites container image references in the artifacts to the relocated
    /// ones recorded by [`ExportedProject::push_images`].
    pub fn update_artifact_images(&mut self) {
        let relocations: Vec<(String, String)> = self
            .images
            .iter()
            .filter_map(|info| {
                info.relocated.as_ref().map(|target| (info.image.to_string(), target.to_string()))
            })
            .collect();

        if relocations.is_empty() {
            return;
        }

        for artifact in &mut self.artifacts {
            let pointer = match item_kind(artifact) {
                k8s::kind::POD => "/spec/containers",
                k8s::kind::REPLICATION_CONTROLLER => "/spec/template/spec/containers",
                _ => continue,
            };
            let Some(containers) = artifact.pointer_mut(pointer).and_then(Value::as_array_mut)
            else {
                continue;
            };

            for container in containers {
                let Some(image) = container.get("image").and_then(Value::as_str) else { continue };
                if let Some((_, target)) = relocations.iter().find(|(old, _)| old == image) {
                    container["image"] = Value::String(target.clone());
                }
            }
        }
    }

    fn in_scope_images(&self, only_internal: bool) -> impl Iterator<Item = &ImageInfo> {
        self.images.iter().filter(move |info| info.image.is_internal() || !only_internal)
    }
}

fn item_kind(item: &Value) -> &str { item.get("kind").and_then(Value::as_str).unwrap_or_default() }

fn is_controller_owned(pod: &Value) -> bool {
    let metadata = &pod["metadata"];
    let has_owner = metadata
        .get("ownerReferences")
        .and_then(Value::as_array)
        .is_some_and(|references| !references.is_empty());
    let created_by = metadata
        .get("annotations")
        .and_then(|annotations| annotations.get(k8s::annotations::CREATED_BY))
        .is_some();
    has_owner || created_by
}

fn scan_images(artifact: &Value) -> Vec<ImageInfo> {
    let kind = item_kind(artifact);
    let containers = match kind {
        k8s::kind::POD => &artifact["spec"]["containers"],
        k8s::kind::REPLICATION_CONTROLLER => &artifact["spec"]["template"]["spec"]["containers"],
        _ => return Vec::new(),
    };
    let owner = artifact
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    let Ok(containers) = serde_json::from_value::<Vec<Container>>(containers.clone()) else {
        tracing::warn!("{kind} {owner} has a malformed container list");
        return Vec::new();
    };

    containers
        .iter()
        .filter_map(|container| container.image.as_deref())
        .filter_map(|image| match image.parse::<ImageRef>() {
            Ok(image) => Some(image),
            Err(err) => {
                tracing::warn!("{kind} {owner} references an unparsable image: {err}");
                None
            }
        })
        .map(|image| ImageInfo {
            kind: kind.to_string(),
            owner: owner.clone(),
            image,
            relocated: None,
        })
        .collect()
}
