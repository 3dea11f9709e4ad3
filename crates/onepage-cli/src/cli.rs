use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "onepage",
    about = "onepage: merge language editions of an article into one provenance-tracked IR",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the engine on a snapshot and publish the IR
    Merge(MergeArgs),
    /// Validate the invariants of an IR file
    Check(CheckArgs),
    /// Print the sections and items of an IR file
    Show(ShowArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Entity snapshot (JSON)
    #[arg(long)]
    pub snapshot: PathBuf,
    /// Engine configuration (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Where to publish the IR
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Args)]
pub struct CheckArgs {
    pub ir: PathBuf,
}

#[derive(Args)]
pub struct ShowArgs {
    pub ir: PathBuf,
    /// Show alternates under each claim
    #[arg(short, long)]
    pub alternates: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_args_parse() {
        let cli = Cli::try_parse_from([
            "onepage", "merge", "--snapshot", "q.json", "--out", "ir.json", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        let Command::Merge(args) = cli.command else {
            panic!("expected merge");
        };
        assert_eq!(args.snapshot, PathBuf::from("q.json"));
        assert!(args.config.is_none());
    }

    #[test]
    fn merge_requires_out() {
        assert!(Cli::try_parse_from(["onepage", "merge", "--snapshot", "q.json"]).is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["onepage", "check", "ir.json", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
