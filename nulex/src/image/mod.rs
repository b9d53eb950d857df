//! Container image references and registry classification.
//!
//! Exported artifacts name their images as docker-style references
//! (`registry/repository:tag`). Relocating an image means re-assembling that
//! reference under another registry, and classifying a registry as internal
//! means looking at the address its host part resolves to textually.

use std::{fmt, net::IpAddr, str::FromStr};

use snafu::Snafu;

/// A docker-style container image reference, split into registry, repository,
/// tag and digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    registry: Option<String>,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    #[must_use]
    pub fn registry(&self) -> Option<&str> { self.registry.as_deref() }

    #[must_use]
    pub fn repository(&self) -> &str { &self.repository }

    #[must_use]
    pub fn tag(&self) -> Option<&str> { self.tag.as_deref() }

    #[must_use]
    pub fn digest(&self) -> Option<&str> { self.digest.as_deref() }

    /// The registry's host with any port suffix removed. Handles bracketed
    /// IPv6 hosts such as `[fd00::1]:5000`.
    #[must_use]
    pub fn registry_host(&self) -> Option<&str> {
        self.registry.as_deref().map(|registry| {
            registry.strip_prefix('[').map_or_else(
                || registry.split(':').next().unwrap_or(registry),
                |bracketed| bracketed.split(']').next().unwrap_or(bracketed),
            )
        })
    }

    /// Whether the reference points at a registry on a private, loopback or
    /// link-local address.
    ///
    /// Registries named by hostname are never internal; only an address
    /// literal reveals an internal OpenShift registry.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.registry_host()
            .and_then(|host| host.parse::<IpAddr>().ok())
            .is_some_and(is_internal_address)
    }

    /// The same repository, tag and digest under another registry. Used when
    /// pulling an internal image through the exposed registry host.
    #[must_use]
    pub fn with_registry(&self, registry: &str) -> Self {
        Self { registry: Some(registry.to_string()), ..self.clone() }
    }

    /// The reference a relocated image is pushed as: the same repository and
    /// tag under `registry`. A digest pin cannot survive a retag.
    #[must_use]
    pub fn relocated_to(&self, registry: &str) -> Self {
        Self {
            registry: Some(registry.to_string()),
            repository: self.repository.clone(),
            tag: self.tag.clone(),
            digest: None,
        }
    }
}

impl FromStr for ImageRef {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return EmptyReferenceSnafu.fail();
        }

        let (remainder, digest) = match input.rsplit_once('@') {
            Some((head, digest)) => (head, Some(digest.to_string())),
            None => (input, None),
        };

        // The first path component is a registry only when it can name a
        // host: it contains a dot or a port, or it is `localhost`.
        let (registry, name) = match remainder.split_once('/') {
            Some((first, rest))
                if first.contains('.') || first.contains(':') || first == "localhost" =>
            {
                (Some(first.to_string()), rest)
            }
            _ => (None, remainder),
        };

        // A colon in the last path component separates the tag.
        let (repository, tag) = match name.rsplit_once(':') {
            Some((repo, tag)) if !tag.contains('/') => (repo.to_string(), Some(tag.to_string())),
            _ => (name.to_string(), None),
        };

        if repository.is_empty() {
            return MissingRepositorySnafu { reference: input }.fail();
        }

        Ok(Self { registry, repository, tag, digest })
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(registry) = &self.registry {
            write!(f, "{registry}/")?;
        }
        write!(f, "{}", self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

fn is_internal_address(address: IpAddr) -> bool {
    match address {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => v6.is_loopback() || (v6.segments()[0] & 0xfe00) == 0xfc00,
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Empty image reference"))]
    EmptyReference,

    #[snafu(display("Image reference '{reference}' has no repository"))]
    MissingRepository { reference: String },
}

#[cfg(test)]
mod tests {
    use super::{Error, ImageRef};

    #[test]
    fn test_parse_bare_repository() {
        let image: ImageRef = "nginx".parse().expect("Should parse bare repository");
        assert_eq!(image.registry(), None);
        assert_eq!(image.repository(), "nginx");
        assert_eq!(image.tag(), None);
        assert_eq!(image.digest(), None);
    }

    #[test]
    fn test_parse_namespaced_repository_without_registry() {
        let image: ImageRef = "library/nginx:1.9".parse().expect("Should parse");
        assert_eq!(image.registry(), None);
        assert_eq!(image.repository(), "library/nginx");
        assert_eq!(image.tag(), Some("1.9"));
    }

    #[test]
    fn test_parse_registry_with_port() {
        let image: ImageRef = "172.30.163.241:5000/myproject/app:v2".parse().expect("Should parse");
        assert_eq!(image.registry(), Some("172.30.163.241:5000"));
        assert_eq!(image.registry_host(), Some("172.30.163.241"));
        assert_eq!(image.repository(), "myproject/app");
        assert_eq!(image.tag(), Some("v2"));
    }

    #[test]
    fn test_parse_localhost_registry() {
        let image: ImageRef = "localhost/app".parse().expect("Should parse");
        assert_eq!(image.registry(), Some("localhost"));
        assert_eq!(image.repository(), "app");
    }

    #[test]
    fn test_parse_digest_reference() {
        let image: ImageRef =
            "registry.example.com/app@sha256:0123456789abcdef".parse().expect("Should parse");
        assert_eq!(image.registry(), Some("registry.example.com"));
        assert_eq!(image.repository(), "app");
        assert_eq!(image.tag(), None);
        assert_eq!(image.digest(), Some("sha256:0123456789abcdef"));
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert_eq!("".parse::<ImageRef>(), Err(Error::EmptyReference));
    }

    #[test]
    fn test_parse_rejects_missing_repository() {
        let err = "docker.io/:latest".parse::<ImageRef>().unwrap_err();
        assert!(matches!(err, Error::MissingRepository { .. }));
    }

    #[test]
    fn test_display_round_trips() {
        for input in [
            "nginx",
            "library/nginx:1.9",
            "172.30.163.241:5000/myproject/app:v2",
            "registry.example.com/ns/app:v1@sha256:0123456789abcdef",
        ] {
            let image: ImageRef = input.parse().expect("Should parse");
            assert_eq!(image.to_string(), input);
        }
    }

    #[test]
    fn test_internal_private_ipv4_registry() {
        let image: ImageRef = "172.30.163.241:5000/myproject/app".parse().expect("Should parse");
        assert!(image.is_internal());
    }

    #[test]
    fn test_internal_loopback_registry() {
        let image: ImageRef = "127.0.0.1:5000/app".parse().expect("Should parse");
        assert!(image.is_internal());
    }

    #[test]
    fn test_internal_unique_local_ipv6_registry() {
        let image: ImageRef = "[fd00::1]:5000/app".parse().expect("Should parse");
        assert_eq!(image.registry_host(), Some("fd00::1"));
        assert!(image.is_internal());
    }

    #[test]
    fn test_external_public_ip_registry() {
        let image: ImageRef = "198.51.100.7:5000/app".parse().expect("Should parse");
        assert!(!image.is_internal());
    }

    #[test]
    fn test_hostname_registry_is_never_internal() {
        let image: ImageRef = "registry.example.com/app".parse().expect("Should parse");
        assert!(!image.is_internal());
    }

    #[test]
    fn test_missing_registry_is_not_internal() {
        let image: ImageRef = "nginx".parse().expect("Should parse");
        assert!(!image.is_internal());
    }

    #[test]
    fn test_with_registry_keeps_digest() {
        let image: ImageRef =
            "172.30.163.241:5000/ns/app:v1@sha256:abc".parse().expect("Should parse");
        let pulled = image.with_registry("registry.example.com");
        assert_eq!(pulled.to_string(), "registry.example.com/ns/app:v1@sha256:abc");
    }

    #[test]
    fn test_relocated_to_drops_digest() {
        let image: ImageRef =
            "172.30.163.241:5000/ns/app:v1@sha256:abc".parse().expect("Should parse");
        let pushed = image.relocated_to("registry.example.com");
        assert_eq!(pushed.to_string(), "registry.example.com/ns/app:v1");
    }
}
