//! Command-line surface for the handset admin console.

use clap::{Args, Parser, Subcommand, ValueEnum};
use handset_api_models::EntityId;
use handset_sync::config::{
    DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS, DEFAULT_UPLOAD_BASE_URL,
};
use handset_telemetry::{LogFormat, LoggingConfig, init_logging};

use crate::client::{AppContext, CliResult};
use crate::commands::{categories, dashboard, phones};

/// Default filter for the CLI; engine `info` events need `--log-level info`.
const DEFAULT_CLI_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, installs logging, and executes the requested command.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli);
    let command = command_label(&cli.command);

    let ctx = match AppContext::from_cli(&cli) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    match dispatch(cli.command, &ctx).await {
        Ok(()) => {
            tracing::debug!(command, "command finished");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::debug!(command, exit_code, "command failed");
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

fn install_logging(cli: &Cli) {
    let format = cli
        .log_format
        .as_deref()
        .map_or_else(LogFormat::infer, LogFormat::from_name);
    let config = LoggingConfig {
        level: &cli.log_level,
        format,
        ..LoggingConfig::default()
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err:#}");
    }
}

async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Categories(command) => categories::handle(ctx, command).await,
        Command::Phones(command) => phones::handle(ctx, command).await,
        Command::Stats => dashboard::handle_stats(ctx).await,
        Command::Probe(args) => dashboard::handle_probe(ctx, args).await,
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Categories(_) => "categories",
        Command::Phones(_) => "phones",
        Command::Stats => "stats",
        Command::Probe(_) => "probe",
    }
}

#[derive(Parser)]
#[command(name = "handset", about = "Administrative CLI for the phone-inventory backend")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "HANDSET_API_URL",
        default_value = DEFAULT_API_BASE_URL
    )]
    pub(crate) api_url: String,
    #[arg(
        long,
        global = true,
        env = "HANDSET_UPLOAD_URL",
        default_value = DEFAULT_UPLOAD_BASE_URL
    )]
    pub(crate) upload_url: String,
    #[arg(
        long,
        global = true,
        env = "HANDSET_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "HANDSET_PAGE_SIZE",
        default_value_t = DEFAULT_PAGE_SIZE,
        help = "Page size used when --size is not given"
    )]
    pub(crate) page_size: u32,
    #[arg(
        long,
        global = true,
        env = "HANDSET_LOG_LEVEL",
        default_value = DEFAULT_CLI_LOG_LEVEL
    )]
    pub(crate) log_level: String,
    #[arg(
        long,
        global = true,
        env = "HANDSET_LOG_FORMAT",
        help = "Log format: pretty or json"
    )]
    pub(crate) log_format: Option<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    #[command(subcommand)]
    Categories(CategoryCommand),
    #[command(subcommand)]
    Phones(PhoneCommand),
    /// Inventory totals over the first page of phones and categories.
    Stats,
    /// Find the first list endpoint answering with a success envelope.
    Probe(ProbeArgs),
}

#[derive(Subcommand)]
pub(crate) enum CategoryCommand {
    /// List live categories.
    Ls(ListArgs),
    /// List soft-deleted categories.
    Deleted(ListArgs),
    Show(IdArgs),
    Create(CategoryFields),
    Update(CategoryUpdateArgs),
    Delete(IdArgs),
    Restore(IdArgs),
}

#[derive(Subcommand)]
pub(crate) enum PhoneCommand {
    /// List live phones.
    Ls(ListArgs),
    /// List soft-deleted phones.
    Deleted(ListArgs),
    Show(IdArgs),
    Create(PhoneFields),
    Update(PhoneUpdateArgs),
    Delete(IdArgs),
    Restore(IdArgs),
}

#[derive(Args, Default)]
pub(crate) struct ListArgs {
    #[arg(long, default_value_t = 0, help = "Zero-based page index")]
    pub(crate) page: u32,
    #[arg(long, help = "Rows per page (defaults to --page-size)")]
    pub(crate) size: Option<u32>,
}

#[derive(Args)]
pub(crate) struct IdArgs {
    #[arg(help = "Record identifier")]
    pub(crate) id: EntityId,
}

#[derive(Args, Default)]
pub(crate) struct CategoryFields {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
}

#[derive(Args)]
pub(crate) struct CategoryUpdateArgs {
    #[arg(help = "Category identifier")]
    pub(crate) id: EntityId,
    #[command(flatten)]
    pub(crate) fields: CategoryFields,
}

#[derive(Args, Default)]
pub(crate) struct PhoneFields {
    #[arg(long)]
    pub(crate) name: Option<String>,
    #[arg(long, conflicts_with = "category")]
    pub(crate) category_id: Option<EntityId>,
    #[arg(long, help = "Category name, resolved to its identifier")]
    pub(crate) category: Option<String>,
    #[arg(long)]
    pub(crate) model: Option<String>,
    #[arg(long)]
    pub(crate) os: Option<String>,
    #[arg(long)]
    pub(crate) color: Option<String>,
    #[arg(long, help = "RAM in GB")]
    pub(crate) ram: Option<u32>,
    #[arg(long, help = "Storage in GB")]
    pub(crate) rom: Option<u32>,
    #[arg(long)]
    pub(crate) screen: Option<String>,
    #[arg(long)]
    pub(crate) camera: Option<String>,
    #[arg(long)]
    pub(crate) price_import: Option<f64>,
    #[arg(long)]
    pub(crate) price_sale: Option<f64>,
    #[arg(long)]
    pub(crate) quantity: Option<u64>,
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[arg(long, help = "Whether the phone is listed for sale")]
    pub(crate) listed: Option<bool>,
    #[arg(long, help = "Avatar image: local path or http(s) URL")]
    pub(crate) avatar: Option<String>,
    #[arg(
        long = "file",
        help = "Gallery image: local path or http(s) URL (repeatable)"
    )]
    pub(crate) files: Vec<String>,
}

#[derive(Args)]
pub(crate) struct PhoneUpdateArgs {
    #[arg(help = "Phone identifier")]
    pub(crate) id: EntityId,
    #[arg(long, help = "Drop the stored gallery instead of resubmitting it")]
    pub(crate) replace_gallery: bool,
    #[command(flatten)]
    pub(crate) fields: PhoneFields,
}

#[derive(Args, Default)]
pub(crate) struct ProbeArgs {
    #[arg(help = "Paths to try in order (defaults to the category list candidates)")]
    pub(crate) paths: Vec<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_update_parses_repeated_files() {
        let cli = Cli::try_parse_from([
            "handset",
            "phones",
            "update",
            "12",
            "--name",
            "Pixel 9",
            "--file",
            "/tmp/a.png",
            "--file",
            "http://cdn/b.png",
            "--output",
            "json",
        ])
        .expect("arguments parse");

        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Phones(PhoneCommand::Update(args)) = cli.command else {
            panic!("expected phones update");
        };
        assert_eq!(args.id, 12);
        assert_eq!(args.fields.name.as_deref(), Some("Pixel 9"));
        assert_eq!(args.fields.files, vec!["/tmp/a.png", "http://cdn/b.png"]);
        assert!(!args.replace_gallery);
    }

    #[test]
    fn category_id_and_name_are_exclusive() {
        let parsed = Cli::try_parse_from([
            "handset",
            "phones",
            "create",
            "--category-id",
            "3",
            "--category",
            "Android",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn list_defaults_to_first_page() {
        let cli = Cli::try_parse_from(["handset", "categories", "deleted"]).expect("parse");
        let Command::Categories(CategoryCommand::Deleted(args)) = cli.command else {
            panic!("expected categories deleted");
        };
        assert_eq!(args.page, 0);
        assert!(args.size.is_none());
        assert_eq!(cli.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(command_label(&Command::Stats), "stats");
    }
}
