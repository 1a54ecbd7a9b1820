use crate::inspect::{run_inspect, InspectArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use site_config::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Site Configuration Service",
    about = "Serve and inspect CMS-driven site configuration from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Fetch the CMS configuration once and print the derived site views
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Inspect(args) => run_inspect(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["site-config-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn inspect_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "site-config-api",
            "inspect",
            "--base-url",
            "https://cms.example.com",
            "--browser-language",
            "en-GB",
            "--raw",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Inspect(args)) => {
                assert_eq!(
                    args.base_url.map(|url| url.to_string()),
                    Some("https://cms.example.com/".to_string())
                );
                assert_eq!(args.browser_language.as_deref(), Some("en-GB"));
                assert!(args.raw);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn inspect_rejects_relative_base_url() {
        let result = Cli::try_parse_from(["site-config-api", "inspect", "--base-url", "cms.local"]);
        assert!(result.is_err());
    }
}
