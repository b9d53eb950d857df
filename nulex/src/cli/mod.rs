//! The `nulex` crate provides a Command Line Interface (CLI) for exporting
//! OpenShift projects as Nulecule applications.
//!
//! # Examples
//!
//! ```bash
//! # Export a project as a Nulecule application
//! nulex export --project myproject --output ./myproject-app
//!
//! # Export the project and relocate its internal images to another registry
//! nulex export --project myproject --output ./myproject-app \
//!     --export-images internal \
//!     --oc-registry-host registry.apps.example.com \
//!     --registry-host registry.example.com \
//!     --registry-login user:password
//!
//! # List the images a project references
//! nulex images --project myproject
//! ```

pub mod error;
mod export;
mod images;

use std::{io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use futures::FutureExt;
use snafu::ResultExt;
use tokio::runtime::Runtime;

pub use self::error::Error;
use self::{export::ExportCommand, images::ImagesCommand};
use crate::{config::Config, openshift::OpenshiftClient, shadow};

/// `Cli` is the main entry point for the Nulex Command Line Interface.
///
/// It parses command-line arguments and dispatches to the appropriate
/// subcommand.
#[derive(Parser)]
#[command(
    name = nulex_base::CLI_PROGRAM_NAME,
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "Nulex CLI: Export OpenShift projects as Nulecule applications.",
    long_about = "Nulex exports a running OpenShift project's resources (pods, replication \
                  controllers, services, persistent volume claims) and re-packages them as a \
                  Nulecule multi-container application, optionally relocating the container \
                  images referenced by those resources to another registry.",
    color = clap::ColorChoice::Always
)]
pub struct Cli {
    /// The subcommand to execute.
    #[clap(subcommand)]
    commands: Option<Commands>,

    /// Path to the configuration file.
    ///
    /// Defaults to `~/.config/nulex/config.yaml` or the path specified by the
    /// `NULEX_CONFIG_FILE_PATH` environment variable.
    #[clap(
        long = "config",
        short = 'c',
        env = "NULEX_CONFIG_FILE_PATH",
        help = "Specify a configuration file. Defaults to ~/.config/nulex/config.yaml or \
                NULEX_CONFIG_FILE_PATH env var."
    )]
    config_file: Option<PathBuf>,

    /// Sets the logging level for the application.
    #[clap(
        long = "log-level",
        env = "NULEX_LOG_LEVEL",
        help = "Set the logging level (e.g., info, debug, trace)."
    )]
    log_level: Option<tracing::Level>,
}

/// `Commands` enumerates the available subcommands for the Nulex CLI.
#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Displays client and cluster version information.
    #[command(about = "Display client and cluster version information")]
    Version {
        /// If true, shows only the client version and does not require a
        /// cluster connection.
        #[clap(long = "client", help = "If true, shows client version only (no cluster required).")]
        client: bool,
    },

    /// Generates a shell completion script for the specified shell.
    #[command(about = "Generate shell completion script for the specified shell (bash, zsh, fish)")]
    Completions { shell: clap_complete::Shell },

    /// Outputs the default configuration in YAML format to standard output.
    #[command(about = "Output the default configuration in YAML format")]
    DefaultConfig,

    /// Exports a project as a Nulecule application.
    #[command(alias = "e", about = "Export an OpenShift project as a Nulecule application")]
    Export(ExportCommand),

    /// Lists the container images referenced by a project.
    #[command(alias = "i", about = "List the container images referenced by a project")]
    Images(ImagesCommand),
}

impl Default for Cli {
    /// Creates a new `Cli` instance by parsing command-line arguments.
    fn default() -> Self { Self::parse() }
}

impl Cli {
    /// Loads the application configuration, applying any overrides from CLI
    /// arguments.
    ///
    /// # Errors
    ///
    /// Returns an `Error` if the configuration file cannot be loaded or
    /// parsed.
    fn load_config(&self) -> Result<Config, Error> {
        let mut config =
            Config::load(self.config_file.clone().unwrap_or_else(Config::search_config_file_path))?;

        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }

        Ok(config)
    }

    /// Executes the main logic of the CLI application based on the parsed
    /// command and arguments.
    ///
    /// # Errors
    ///
    /// Returns an `Error` if configuration loading fails, the Tokio runtime
    /// cannot be initialized, or the selected subcommand fails.
    ///
    /// # Panics
    ///
    /// This method `expect`s on `std::io::stdout().write_all()` operations.
    /// In a typical CLI environment, writing to `stdout` or `stderr` is
    /// expected to succeed.
    pub fn run(self) -> Result<i32, Error> {
        let client_version = Self::command().get_version().unwrap_or_default().to_string();
        match self.commands {
            Some(Commands::Version { client }) if client => {
                std::io::stdout()
                    .write_all(Self::command().render_long_version().as_bytes())
                    .expect("Failed to write to stdout");
                std::io::stdout()
                    .write_all(format!("Client Version: {client_version}\n").as_bytes())
                    .expect("Failed to write to stdout");

                return Ok(0);
            }
            Some(Commands::Completions { shell }) => {
                let mut app = Self::command();
                let bin_name = app.get_name().to_string();
                clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
                return Ok(0);
            }
            Some(Commands::DefaultConfig) => {
                std::io::stdout()
                    .write_all(Config::template_basic().as_slice())
                    .expect("Failed to write to stdout");
                return Ok(0);
            }
            _ => {}
        }

        let config = self.load_config()?;
        config.log.registry();

        let fut = async move {
            match self.commands {
                Some(Commands::Version { .. }) => {
                    let oc = OpenshiftClient::new(config.oc_binary.clone(), None, None);
                    let cluster_version =
                        oc.version().await.unwrap_or_else(|_| "unknown".to_string());
                    let info =
                        format!("Client Version: {client_version}\n{cluster_version}\n");
                    std::io::stdout()
                        .write_all(Self::command().render_long_version().as_bytes())
                        .expect("Failed to write to stdout");
                    std::io::stdout()
                        .write_all(info.as_bytes())
                        .expect("Failed to write to stdout");

                    return Ok(0);
                }
                Some(Commands::Export(cmd)) => cmd.run(config).boxed().await?,
                Some(Commands::Images(cmd)) => cmd.run(config).await?,
                _ => {
                    let help = Self::command().render_long_help().ansi().to_string();
                    std::io::stderr()
                        .write_all(help.as_bytes())
                        .expect("Failed to write to stdout");
                    return Ok(-1);
                }
            }

            Ok(0)
        };

        Runtime::new().context(error::InitializeTokioRuntimeSnafu)?.block_on(fut)
    }
}
