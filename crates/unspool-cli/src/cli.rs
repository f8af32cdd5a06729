//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use unspool_config::defaults::CONFIG_PATH_ENV;
use unspool_config::resolve_config_path;
use unspool_telemetry::DEFAULT_LOG_LEVEL;

use crate::commands::batch::handle_batch;
use crate::commands::config::{handle_config_init, handle_config_show};
use crate::commands::watch::handle_watch;
use crate::error::CliResult;

/// Parse the process arguments, run the selected command, and report errors.
///
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let ctx = CliContext::from_cli(&cli);
    match cli.command {
        Command::Watch => handle_watch(&ctx).await,
        Command::Batch => handle_batch(&ctx, cli.output).await,
        Command::Config(ConfigCommand::Show) => handle_config_show(&ctx, cli.output),
        Command::Config(ConfigCommand::Init(args)) => handle_config_init(&ctx, &args),
    }
}

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub(crate) struct CliContext {
    pub(crate) config_path: PathBuf,
    pub(crate) log_level: String,
    pub(crate) rar_tool: Option<PathBuf>,
}

impl CliContext {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            config_path: cli.config.clone().unwrap_or_else(resolve_config_path),
            log_level: cli.log_level.clone(),
            rar_tool: cli.rar_tool.clone(),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "unspool",
    about = "Extract downloaded archives and route their files into a destination folder"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = CONFIG_PATH_ENV,
        help = "Settings file (defaults to unspool.conf next to the executable)"
    )]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "UNSPOOL_LOG_LEVEL",
        default_value = DEFAULT_LOG_LEVEL
    )]
    log_level: String,
    #[arg(
        long,
        global = true,
        env = "UNSPOOL_RAR_TOOL",
        value_name = "PATH",
        help = "RAR extraction tool to use instead of searching PATH"
    )]
    rar_tool: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch the monitored folder and process archives as they arrive.
    Watch,
    /// Process every archive currently in the monitored folder, then exit.
    Batch,
    /// Inspect or create the settings file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective settings.
    Show,
    /// Write a new settings file.
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ConfigInitArgs {
    /// Folder watched for incoming archives.
    #[arg(long)]
    pub(crate) monitor: PathBuf,
    /// Folder that receives copied files.
    #[arg(long = "dest")]
    pub(crate) destination: PathBuf,
    /// Comma-separated extensions copied by the extension filter.
    #[arg(long, value_name = "LIST")]
    pub(crate) extensions: Option<String>,
    /// Disable the extension-filter copy.
    #[arg(long)]
    pub(crate) no_filter: bool,
    /// Priority groups such as `1-ai,psd;2-png,jpg`; enables priority copy.
    #[arg(long, value_name = "GROUPS")]
    pub(crate) priority: Option<String>,
    /// Copy each extracted folder as a whole.
    #[arg(long)]
    pub(crate) whole_folder: bool,
    /// Delete archives after extraction.
    #[arg(long)]
    pub(crate) delete_archive: bool,
    /// Delete extracted folders after a successful copy.
    #[arg(long)]
    pub(crate) delete_extracted: bool,
    /// Overwrite an existing settings file.
    #[arg(long)]
    pub(crate) force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "unspool",
            "config",
            "show",
            "--config",
            "/tmp/custom.conf",
            "--output",
            "json",
        ])?;
        assert!(matches!(cli.command, Command::Config(ConfigCommand::Show)));
        assert_eq!(cli.output, OutputFormat::Json);
        let ctx = CliContext::from_cli(&cli);
        assert_eq!(ctx.config_path, PathBuf::from("/tmp/custom.conf"));
        Ok(())
    }

    #[test]
    fn rar_tool_flag_reaches_the_context() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["unspool", "batch", "--rar-tool", "/opt/rar/unrar"])?;
        assert!(matches!(cli.command, Command::Batch));
        let ctx = CliContext::from_cli(&cli);
        assert_eq!(ctx.rar_tool, Some(PathBuf::from("/opt/rar/unrar")));
        Ok(())
    }

    #[test]
    fn config_init_collects_policy_flags() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "unspool",
            "config",
            "init",
            "--monitor",
            "/in",
            "--dest",
            "/out",
            "--extensions",
            "jpg,png",
            "--priority",
            "1-ai;2-png",
            "--delete-extracted",
        ])?;
        let Command::Config(ConfigCommand::Init(args)) = cli.command else {
            anyhow::bail!("expected config init");
        };
        assert_eq!(args.monitor, PathBuf::from("/in"));
        assert_eq!(args.destination, PathBuf::from("/out"));
        assert_eq!(args.extensions.as_deref(), Some("jpg,png"));
        assert_eq!(args.priority.as_deref(), Some("1-ai;2-png"));
        assert!(args.delete_extracted);
        assert!(!args.delete_archive);
        assert!(!args.force);
        Ok(())
    }

    #[test]
    fn unknown_subcommands_are_rejected() {
        assert!(Cli::try_parse_from(["unspool", "extract"]).is_err());
        assert!(Cli::try_parse_from(["unspool", "config", "init", "--monitor", "/in"]).is_err());
    }
}
