//! Command-line entry point for applications.
//!
//! ```rust,no_run
//! use yhttp::{Application, Request};
//!
//! async fn index(_req: Request) -> &'static str { "Hello World!" }
//!
//! fn main() -> std::process::ExitCode {
//!     Application::new().get("/", index).climain(std::env::args_os())
//! }
//! ```
//!
//! ```text
//! $ myapp serve --bind 0.0.0.0:8080
//! $ myapp --config production.yml serve
//! $ myapp routes
//! ```

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::Application;
use crate::error::Error;
use crate::server::Server;

#[derive(Debug, Parser)]
#[command(version, about = "A yhttp application")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Settings file layered over the application settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the application over HTTP
    Serve {
        /// Address to bind, overrides `server.bind`
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// List the registered routes
    Routes,
}

impl Application {
    /// Parses `args` (program name first) and runs the chosen command.
    ///
    /// Help, version and usage errors are printed by clap and map to their
    /// usual exit codes.
    pub fn climain<I, T>(self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e) => {
                // Help and version requests are not failures.
                let code = if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
                let _ = e.print();
                return code;
            }
        };

        match self.run(cli) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        }
    }

    fn run(mut self, cli: Cli) -> Result<(), Error> {
        *self.settings_mut() = self.settings().layer(cli.config.as_deref())?;

        match cli.command {
            Command::Routes => {
                for (method, pattern) in self.routes() {
                    println!("{method:<8}{pattern}");
                }
                Ok(())
            }
            Command::Serve { bind } => {
                init_tracing(&self.settings().log_filter);
                let bind = bind.unwrap_or_else(|| self.settings().server.bind.clone());
                let server = Server::bind(&bind)?;
                tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()?
                    .block_on(server.serve(self))
            }
        }
    }
}

/// Installs the `tracing` subscriber. `RUST_LOG` wins over `fallback`.
fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    // A subscriber installed by the embedding program takes precedence.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_with_global_config() {
        let cli = Cli::try_parse_from(["app", "serve", "--bind", "0.0.0.0:80", "-c", "app.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("app.toml")));
        assert!(matches!(cli.command, Command::Serve { bind: Some(ref b) } if b == "0.0.0.0:80"));
    }

    #[test]
    fn routes_command_succeeds() {
        async fn index(_req: crate::Request) -> &'static str { "" }
        let cli = Cli::try_parse_from(["app", "routes"]).unwrap();
        assert!(Application::new().get("/", index).run(cli).is_ok());
    }

    #[test]
    fn bad_bind_address_fails() {
        let cli = Cli::try_parse_from(["app", "serve", "--bind", "nowhere"]).unwrap();
        assert!(matches!(Application::new().run(cli), Err(Error::InvalidAddress { .. })));
    }
}
