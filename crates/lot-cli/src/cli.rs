use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lot",
    about = "Lotline: product and order lifecycle on a ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Server configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one operation against a fresh in-memory ledger
    Invoke(InvokeArgs),
    /// Run a JSON script of operations against one in-memory ledger
    Run(RunArgs),
    /// List the operation table
    Ops(OpsArgs),
    /// Start the HTTP invocation server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct InvokeArgs {
    pub operation: String,
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct RunArgs {
    pub script: PathBuf,
    /// Stop at the first failed step
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Args)]
pub struct OpsArgs {}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_invoke() {
        let cli = Cli::try_parse_from(["lot", "invoke", "searchProduct", "p1"]).unwrap();
        if let Command::Invoke(args) = cli.command {
            assert_eq!(args.operation, "searchProduct");
            assert_eq!(args.args, vec!["p1"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_invoke_without_args() {
        let cli = Cli::try_parse_from(["lot", "invoke", "queryHistory"]).unwrap();
        if let Command::Invoke(args) = cli.command {
            assert!(args.args.is_empty());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_invoke_negative_value() {
        let cli = Cli::try_parse_from(["lot", "invoke", "updateTemparature", "o1", "-5"]).unwrap();
        if let Command::Invoke(args) = cli.command {
            assert_eq!(args.args, vec!["o1", "-5"]);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_run() {
        let cli = Cli::try_parse_from(["lot", "run", "script.json", "--fail-fast"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.script, PathBuf::from("script.json"));
            assert!(args.fail_fast);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_ops() {
        let cli = Cli::try_parse_from(["lot", "ops"]).unwrap();
        assert!(matches!(cli.command, Command::Ops(_)));
    }

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from([
            "lot", "serve", "--bind", "0.0.0.0:8080", "--config", "lot.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("lot.toml")));
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".into()));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["lot", "--verbose", "ops"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["lot", "--format", "json", "ops"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
