use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Parser, checker and formatter for diagram markup.
///
/// diagram-forge reads `.dbml` documents describing tables, references
/// and areas, reports what it could not understand, rewrites documents
/// in canonical form, and exports the diagram model as JSON.
#[derive(Parser)]
#[command(
    name = "diagram-forge",
    version,
    about = "Parser, checker and formatter for diagram markup",
    after_help = "Use 'diagram-forge <command> --help' for more information about a command.",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Global options available to all subcommands.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path [env: DIAGRAM_FORGE_CONFIG]
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        env = "DIAGRAM_FORGE_CONFIG"
    )]
    pub config: Option<PathBuf>,

    /// Output format: human (default), json, plain
    #[arg(
        long,
        global = true,
        default_value = "human",
        value_parser = ["human", "json", "plain"]
    )]
    pub format: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all non-error output
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output [env: NO_COLOR]
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,
}

/// Top-level subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Parse diagram files and report problems
    Check(CheckArgs),

    /// Rewrite diagram files in canonical form
    Fmt(FmtArgs),

    /// Export a diagram as JSON
    Export(ExportArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

/// Arguments for `diagram-forge check`.
#[derive(Args)]
pub struct CheckArgs {
    /// Diagram files or directories (default: the configured diagram dir)
    pub paths: Vec<PathBuf>,

    /// Fail on recovered syntax errors and integrity issues
    #[arg(short = 's', long = "strict")]
    pub strict: bool,
}

/// Arguments for `diagram-forge fmt`.
#[derive(Args)]
pub struct FmtArgs {
    /// Diagram files or directories (default: the configured diagram dir)
    pub paths: Vec<PathBuf>,

    /// Write formatted output back to each file
    #[arg(short = 'w', long = "write", conflicts_with = "check")]
    pub write: bool,

    /// Exit with an error if any file is not already formatted
    #[arg(long = "check")]
    pub check: bool,
}

/// Arguments for `diagram-forge export`.
#[derive(Args)]
pub struct ExportArgs {
    /// Diagram file to export
    pub file: PathBuf,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

/// Arguments for `diagram-forge completions`.
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_parser = ["bash", "zsh", "fish", "powershell", "elvish"])]
    pub shell: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_minimal_args() {
        let cli = Cli::try_parse_from(["diagram-forge", "completions", "bash"]).unwrap();
        assert!(matches!(cli.command, Commands::Completions(_)));
    }

    #[test]
    fn parse_global_verbose() {
        let cli = Cli::try_parse_from(["diagram-forge", "-vvv", "completions", "bash"]).unwrap();
        assert_eq!(cli.global.verbose, 3);
    }

    #[test]
    fn parse_global_format_json() {
        let cli = Cli::try_parse_from(["diagram-forge", "--format", "json", "check"]).unwrap();
        assert_eq!(cli.global.format, "json");
    }

    #[test]
    fn parse_check_command() {
        let cli =
            Cli::try_parse_from(["diagram-forge", "check", "--strict", "a.dbml", "dir/"]).unwrap();
        if let Commands::Check(args) = cli.command {
            assert!(args.strict);
            assert_eq!(
                args.paths,
                vec![PathBuf::from("a.dbml"), PathBuf::from("dir/")]
            );
        } else {
            panic!("expected Check command");
        }
    }

    #[test]
    fn parse_check_without_paths() {
        let cli = Cli::try_parse_from(["diagram-forge", "check"]).unwrap();
        if let Commands::Check(args) = cli.command {
            assert!(args.paths.is_empty());
            assert!(!args.strict);
        } else {
            panic!("expected Check command");
        }
    }

    #[test]
    fn parse_fmt_write() {
        let cli = Cli::try_parse_from(["diagram-forge", "fmt", "-w", "a.dbml"]).unwrap();
        if let Commands::Fmt(args) = cli.command {
            assert!(args.write);
            assert!(!args.check);
        } else {
            panic!("expected Fmt command");
        }
    }

    #[test]
    fn fmt_write_and_check_conflict() {
        let result = Cli::try_parse_from(["diagram-forge", "fmt", "--write", "--check"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_export_command() {
        let cli =
            Cli::try_parse_from(["diagram-forge", "export", "shop.dbml", "-o", "shop.json"])
                .unwrap();
        if let Commands::Export(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("shop.dbml"));
            assert_eq!(args.output, Some(PathBuf::from("shop.json")));
        } else {
            panic!("expected Export command");
        }
    }

    #[test]
    fn export_requires_a_file() {
        assert!(Cli::try_parse_from(["diagram-forge", "export"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        let result = Cli::try_parse_from(["diagram-forge", "-v", "-q", "completions", "bash"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_format_rejected() {
        let result =
            Cli::try_parse_from(["diagram-forge", "--format", "xml", "completions", "bash"]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_shell_rejected() {
        let result = Cli::try_parse_from(["diagram-forge", "completions", "tcsh"]);
        assert!(result.is_err());
    }
}
