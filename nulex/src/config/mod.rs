mod error;

use std::path::{Path, PathBuf};

use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub use self::error::Error;
use crate::consts;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// The `oc` binary used for all cluster access, resolved through `PATH`
    /// unless given as a path.
    #[serde(default = "default_oc_binary")]
    pub oc_binary: PathBuf,

    /// The docker binary used to pull, tag and push images.
    #[serde(default = "default_docker_binary")]
    pub docker_binary: PathBuf,

    /// Version of the atomicapp base image referenced by generated
    /// Dockerfiles.
    #[serde(default = "default_atomicapp_version")]
    pub atomicapp_version: String,

    #[serde(default = "nulex_cli::config::LogConfig::default")]
    pub log: nulex_cli::config::LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oc_binary: default_oc_binary(),
            docker_binary: default_docker_binary(),
            atomicapp_version: default_atomicapp_version(),
            log: nulex_cli::config::LogConfig::default(),
        }
    }
}

impl Config {
    pub fn search_config_file_path() -> PathBuf {
        let paths = vec![Self::default_path()]
            .into_iter()
            .chain(nulex_base::fallback_project_config_directories().into_iter().map(|mut path| {
                path.push(nulex_base::CLI_CONFIG_NAME);
                path
            }))
            .collect::<Vec<_>>();
        for path in paths {
            let Ok(exists) = path.try_exists() else {
                continue;
            };
            if exists {
                return path;
            }
        }
        Self::default_path()
    }

    #[inline]
    pub fn default_path() -> PathBuf {
        [nulex_base::PROJECT_CONFIG_DIR.to_path_buf(), PathBuf::from(nulex_base::CLI_CONFIG_NAME)]
            .into_iter()
            .collect()
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut config: Self = {
            let path =
                path.as_ref().try_resolve().map(|path| path.to_path_buf()).with_context(|_| {
                    error::ResolveFilePathSnafu { file_path: path.as_ref().to_path_buf() }
                })?;
            let data =
                std::fs::read(&path).context(error::OpenConfigSnafu { filename: path.clone() })?;
            serde_yaml::from_slice(&data).context(error::ParseConfigSnafu { filename: path })?
        };

        config.log.file_path = match config.log.file_path.map(|path| {
            path.try_resolve()
                .map(|path| path.to_path_buf())
                .with_context(|_| error::ResolveFilePathSnafu { file_path: path.clone() })
        }) {
            Some(Ok(path)) => Some(path),
            Some(Err(err)) => return Err(err),
            None => None,
        };

        Ok(config)
    }

    /// The default configuration rendered as YAML.
    #[must_use]
    pub fn template_basic() -> Vec<u8> {
        serde_yaml::to_string(&Self::default()).map_or_else(|_| Vec::new(), String::into_bytes)
    }
}

fn default_oc_binary() -> PathBuf { PathBuf::from(consts::DEFAULT_OC_BINARY) }

fn default_docker_binary() -> PathBuf { PathBuf::from(consts::DEFAULT_DOCKER_BINARY) }

fn default_atomicapp_version() -> String { consts::DEFAULT_ATOMICAPP_VERSION.to_string() }

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").expect("Empty mapping parses");
        assert_eq!(config.oc_binary, std::path::PathBuf::from("oc"));
        assert_eq!(config.docker_binary, std::path::PathBuf::from("docker"));
        assert_eq!(config.atomicapp_version, "0.1.11");
    }

    #[test]
    fn test_template_basic_round_trips() {
        let template = Config::template_basic();
        let parsed: Config =
            serde_yaml::from_slice(&template).expect("Default template should parse");
        assert_eq!(parsed.atomicapp_version, Config::default().atomicapp_version);
    }

    #[test]
    fn test_overrides_are_honored() {
        let config: Config = serde_yaml::from_str(
            "ocBinary: /usr/local/bin/oc\natomicappVersion: 0.2.0\n",
        )
        .expect("Config parses");
        assert_eq!(config.oc_binary, std::path::PathBuf::from("/usr/local/bin/oc"));
        assert_eq!(config.atomicapp_version, "0.2.0");
    }
}
