//! The Nulecule application descriptor and the on-disk layout around it.

pub mod error;

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::ResultExt;

pub use self::error::Error;
use crate::consts;

/// Providers an exported application targets. Every provider receives the
/// same set of Kubernetes artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Kubernetes,
    Openshift,
}

impl Provider {
    pub const ALL: &'static [Self] = &[Self::Kubernetes, Self::Openshift];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kubernetes => "kubernetes",
            Self::Openshift => "openshift",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// The top-level Nulecule file.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Descriptor {
    pub specversion: String,
    pub id: String,
    pub metadata: Metadata,
    pub graph: Vec<Component>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Metadata {
    pub name: String,
}

/// One node of the application graph, pointing at its artifact files per
/// provider.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Component {
    pub name: String,
    pub artifacts: BTreeMap<Provider, Vec<String>>,
}

impl Descriptor {
    /// A single-component descriptor for an exported project.
    #[must_use]
    pub fn single_component(project: &str, artifacts: BTreeMap<Provider, Vec<String>>) -> Self {
        Self {
            specversion: consts::NULECULE_SPECVERSION.to_string(),
            id: project.to_string(),
            metadata: Metadata { name: project.to_string() },
            graph: vec![Component { name: project.to_string(), artifacts }],
        }
    }
}

/// Writes the on-disk layout of a Nulecule application.
#[derive(Debug)]
pub struct AppWriter {
    root: PathBuf,
}

impl AppWriter {
    pub const DESCRIPTOR_FILE: &'static str = "Nulecule";

    const ARTIFACTS_DIR: &'static str = "artifacts";

    /// Fails when `root` already exists.
    pub async fn ensure_absent(root: &Path) -> Result<(), Error> {
        if tokio::fs::try_exists(root).await.unwrap_or(false) {
            return error::OutputExistsSnafu { path: root.to_path_buf() }.fail();
        }
        Ok(())
    }

    /// Creates the application directory tree. `root` must not exist yet.
    pub async fn create(root: PathBuf) -> Result<Self, Error> {
        Self::ensure_absent(&root).await?;
        for provider in Provider::ALL {
            let path = root.join(Self::ARTIFACTS_DIR).join(provider.as_str());
            tokio::fs::create_dir_all(&path)
                .await
                .with_context(|_| error::CreateDirectorySnafu { path: path.clone() })?;
        }
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path { &self.root }

    /// Writes one `<name>-<kind>.json` file per artifact and returns their
    /// `file://` references, relative to the application root.
    pub async fn write_artifacts(
        &self,
        provider: Provider,
        artifacts: &[Value],
    ) -> Result<Vec<String>, Error> {
        let mut used_names = BTreeSet::new();
        let mut references = Vec::with_capacity(artifacts.len());

        for artifact in artifacts {
            let file_name = unique_file_name(artifact_file_name(artifact), &mut used_names);
            let relative =
                PathBuf::from(Self::ARTIFACTS_DIR).join(provider.as_str()).join(&file_name);
            let path = self.root.join(&relative);

            let data = serde_json::to_vec_pretty(artifact)
                .with_context(|_| error::SerializeArtifactSnafu { name: file_name.clone() })?;
            tokio::fs::write(&path, data)
                .await
                .with_context(|_| error::WriteFileSnafu { path: path.clone() })?;

            references.push(format!("file://{}", relative.display()));
        }

        Ok(references)
    }

    /// Writes the Nulecule file at the application root.
    pub async fn write_descriptor(&self, descriptor: &Descriptor) -> Result<(), Error> {
        let data = serde_yaml::to_string(descriptor).context(error::SerializeDescriptorSnafu)?;
        let path = self.root.join(Self::DESCRIPTOR_FILE);
        tokio::fs::write(&path, data).await.with_context(|_| error::WriteFileSnafu { path })
    }

    /// Generates the Dockerfile that packages the application on top of the
    /// atomicapp base image. Expects the descriptor to be written already, so
    /// the root-level file listing is complete.
    pub async fn write_dockerfile(&self, atomicapp_version: &str) -> Result<(), Error> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .with_context(|_| error::ListDirectorySnafu { path: self.root.clone() })?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|_| error::ListDirectorySnafu { path: self.root.clone() })?
        {
            let file_type = entry
                .file_type()
                .await
                .with_context(|_| error::ListDirectorySnafu { path: self.root.clone() })?;
            if file_type.is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        files.sort_unstable();
        files.push("Dockerfile".to_string());

        let providers =
            Provider::ALL.iter().map(|provider| provider.as_str()).collect::<Vec<_>>().join(",");
        let dockerfile = format!(
            r#"FROM {image}:{atomicapp_version}

LABEL io.projectatomic.nulecule.providers="{providers}" \
      io.projectatomic.nulecule.specversion="{specversion}"

ADD {files} /application-entity/
ADD /artifacts /application-entity/artifacts
"#,
            image = consts::ATOMICAPP_IMAGE,
            specversion = consts::NULECULE_SPECVERSION,
            files = files.join(" "),
        );

        let path = self.root.join("Dockerfile");
        tokio::fs::write(&path, dockerfile).await.with_context(|_| error::WriteFileSnafu { path })
    }
}

fn artifact_file_name(artifact: &Value) -> String {
    let name = artifact.pointer("/metadata/name").and_then(Value::as_str).unwrap_or("unknown");
    let kind = artifact.get("kind").and_then(Value::as_str).unwrap_or("unknown");
    format!("{name}-{kind}.json")
}

/// Appends `-1`, `-2`, ... before the extension until the name is unused.
fn unique_file_name(candidate: String, used: &mut BTreeSet<String>) -> String {
    if used.insert(candidate.clone()) {
        return candidate;
    }
    let (stem, extension) = candidate.rsplit_once('.').unwrap_or((candidate.as_str(), ""));
    let mut n = 1_u32;
    loop {
        let next = if extension.is_empty() {
            format!("{stem}-{n}")
        } else {
            format!("{stem}-{n}.{extension}")
        };
        if used.insert(next.clone()) {
            return next;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{BTreeMap, BTreeSet},
        path::PathBuf,
    };

    use serde_json::json;

    use super::{AppWriter, Descriptor, Error, Provider, artifact_file_name, unique_file_name};

    fn temp_root(test_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("nulex-test-{}-{test_name}", std::process::id()))
    }

    #[test]
    fn test_artifact_file_name_uses_name_and_kind() {
        let artifact = json!({ "kind": "Service", "metadata": { "name": "frontend" } });
        assert_eq!(artifact_file_name(&artifact), "frontend-Service.json");
    }

    #[test]
    fn test_artifact_file_name_falls_back_to_unknown() {
        let artifact = json!({ "kind": "Service" });
        assert_eq!(artifact_file_name(&artifact), "unknown-Service.json");
    }

    #[test]
    fn test_unique_file_name_appends_counter() {
        let mut used = BTreeSet::new();
        assert_eq!(unique_file_name("a-Pod.json".to_string(), &mut used), "a-Pod.json");
        assert_eq!(unique_file_name("a-Pod.json".to_string(), &mut used), "a-Pod-1.json");
        assert_eq!(unique_file_name("a-Pod.json".to_string(), &mut used), "a-Pod-2.json");
    }

    #[test]
    fn test_descriptor_serializes_to_expected_yaml() {
        let mut artifacts = BTreeMap::new();
        let _previous = artifacts.insert(
            Provider::Kubernetes,
            vec!["file://artifacts/kubernetes/frontend-Service.json".to_string()],
        );
        let descriptor = Descriptor::single_component("demo", artifacts);

        let yaml = serde_yaml::to_string(&descriptor).expect("Descriptor serializes");
        assert!(yaml.contains("specversion: 0.0.2"));
        assert!(yaml.contains("id: demo"));
        assert!(yaml.contains("kubernetes:"));
        assert!(yaml.contains("file://artifacts/kubernetes/frontend-Service.json"));

        let parsed: Descriptor = serde_yaml::from_str(&yaml).expect("Descriptor parses");
        assert_eq!(parsed.graph.len(), 1);
        assert_eq!(parsed.graph[0].name, "demo");
    }

    #[tokio::test]
    async fn test_writer_lays_out_an_application() {
        let root = temp_root("layout");
        let _cleanup = std::fs::remove_dir_all(&root);

        let writer = AppWriter::create(root.clone()).await.expect("Should create app tree");

        let artifacts = vec![
            json!({ "kind": "Service", "metadata": { "name": "frontend" } }),
            json!({ "kind": "Service", "metadata": { "name": "frontend" } }),
        ];
        let references = writer
            .write_artifacts(Provider::Kubernetes, &artifacts)
            .await
            .expect("Should write artifacts");
        assert_eq!(
            references,
            vec![
                "file://artifacts/kubernetes/frontend-Service.json",
                "file://artifacts/kubernetes/frontend-Service-1.json",
            ]
        );
        assert!(root.join("artifacts/kubernetes/frontend-Service-1.json").is_file());

        let mut provider_artifacts = BTreeMap::new();
        let _previous = provider_artifacts.insert(Provider::Kubernetes, references);
        let descriptor = Descriptor::single_component("demo", provider_artifacts);
        writer.write_descriptor(&descriptor).await.expect("Should write descriptor");
        assert!(root.join(AppWriter::DESCRIPTOR_FILE).is_file());

        writer.write_dockerfile("0.1.11").await.expect("Should write Dockerfile");
        let dockerfile =
            std::fs::read_to_string(root.join("Dockerfile")).expect("Dockerfile exists");
        assert!(dockerfile.starts_with("FROM projectatomic/atomicapp:0.1.11"));
        assert!(dockerfile.contains("io.projectatomic.nulecule.providers=\"kubernetes,openshift\""));
        assert!(dockerfile.contains("ADD Nulecule Dockerfile /application-entity/"));
        assert!(dockerfile.contains("ADD /artifacts /application-entity/artifacts"));

        std::fs::remove_dir_all(&root).expect("Cleanup should succeed");
    }

    #[tokio::test]
    async fn test_writer_refuses_an_existing_root() {
        let root = temp_root("existing");
        let _cleanup = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).expect("Should create directory");

        let err = AppWriter::create(root.clone()).await.unwrap_err();
        assert!(matches!(err, Error::OutputExists { .. }));

        std::fs::remove_dir_all(&root).expect("Cleanup should succeed");
    }
}
