use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Resolve explorer icons, owning viewers and navigation targets",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Host directory mounted as `/` of the virtual filesystem.
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (repeat for debug logs)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Clear the preview cache before running
    #[arg(long, global = true)]
    pub clear_cache: bool,

    /// Neither read nor write the preview cache
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve the icon, process and target of entries.
    Info(InfoArgs),
    /// List a directory with resolved entries.
    Ls(LsArgs),
    /// Count the lines a label wraps to.
    Lines(LinesArgs),
    /// Show or generate the configuration file.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InfoArgs {
    /// Virtual paths to resolve.
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<String>,

    /// Only print the final record of each path.
    #[arg(long = "final")]
    pub final_only: bool,

    /// Output JSON
    #[arg(short, long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LsArgs {
    /// Virtual directory to list.
    #[arg(default_value = "/", value_name = "DIR")]
    pub directory: String,

    /// Only list entries whose name matches this glob.
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Descend into subdirectories.
    #[arg(short, long)]
    pub recursive: bool,

    /// Include system files such as `desktop.ini`.
    #[arg(short, long)]
    pub all: bool,

    /// Output JSON
    #[arg(short, long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct LinesArgs {
    /// Label text.
    pub text: String,

    /// Maximum line width in pixels.
    #[arg(short = 'w', long)]
    pub max_width: f32,

    /// CSS font size (`12px`, `9pt`, `0.75rem`).
    #[arg(long, default_value = "12px")]
    pub font_size: String,

    /// CSS font family list.
    #[arg(long, default_value = "Segoe UI, sans-serif")]
    pub font_family: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ConfigArgs {
    /// Write the default configuration instead of printing the effective one.
    #[arg(long)]
    pub generate: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,

    /// Binary name used in the generated script.
    #[arg(long, default_value = "fileinfo")]
    pub bin_name: String,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_info_subcommand() {
        let cli = Cli::try_parse_from(["fileinfo", "info", "/Users/a.png", "/b.url", "--final"])
            .unwrap();
        match cli.command {
            Command::Info(args) => {
                assert_eq!(args.paths, vec!["/Users/a.png", "/b.url"]);
                assert!(args.final_only);
                assert!(!args.json);
            }
            _ => panic!("Expected info command"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["fileinfo", "ls", "/Users", "--root", "/srv/desk", "-vv"]).unwrap();
        assert_eq!(cli.global.root, Some(PathBuf::from("/srv/desk")));
        assert_eq!(cli.global.verbose, 2);
        match cli.command {
            Command::Ls(args) => {
                assert_eq!(args.directory, "/Users");
                assert!(!args.recursive);
            }
            _ => panic!("Expected ls command"),
        }
    }

    #[test]
    fn test_cli_lines_defaults() {
        let cli = Cli::try_parse_from(["fileinfo", "lines", "hello", "-w", "70"]).unwrap();
        match cli.command {
            Command::Lines(args) => {
                assert_eq!(args.max_width, 70.0);
                assert_eq!(args.font_size, "12px");
            }
            _ => panic!("Expected lines command"),
        }
    }

    #[test]
    fn test_cli_info_requires_path() {
        assert!(Cli::try_parse_from(["fileinfo", "info"]).is_err());
    }

    #[test]
    fn test_cli_parse_help() {
        Cli::command().debug_assert();
    }
}
