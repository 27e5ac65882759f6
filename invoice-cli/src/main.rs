mod commands;
mod delivery;
mod prompts;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use invoice_core::{Config, DraftEdits, JsonFileStore, Selection};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "invoice", version, about = "Create PDF invoices from saved sender profiles and client templates")]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an invoice PDF
    New(NewArgs),
    /// Manage sender profiles
    Profile {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Manage client templates
    Template {
        #[command(subcommand)]
        action: RecordAction,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum RecordAction {
    List,
    /// Add a record through prompts
    Add,
    /// Edit a stored record through prompts pre-filled with its values
    Edit { id: String },
    /// Remove a record by id ("default" names the configured fallback)
    Remove { id: String },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file location
    Path,
    /// Write a sample config with placeholder values
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct NewArgs {
    /// Sender profile id (default: first stored profile)
    #[arg(long, conflicts_with = "default_sender")]
    profile: Option<String>,
    /// Use the sender configured in config.toml
    #[arg(long)]
    default_sender: bool,

    /// Client template id (default: first stored template)
    #[arg(long, conflicts_with = "manual")]
    template: Option<String>,
    /// Start from the configured client defaults instead of a template
    #[arg(long)]
    manual: bool,

    #[arg(long)]
    number: Option<String>,
    /// Invoice date, YYYY-MM-DD (default: today)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Billing month relative to the current one (-1 = last month)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true, conflicts_with = "period_start")]
    month_offset: i32,
    #[arg(long, requires = "period_end")]
    period_start: Option<NaiveDate>,
    #[arg(long, requires = "period_start")]
    period_end: Option<NaiveDate>,

    #[arg(long)]
    client_name: Option<String>,
    #[arg(long)]
    address1: Option<String>,
    #[arg(long)]
    address2: Option<String>,
    /// Third address line; an empty value removes it
    #[arg(long)]
    address3: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<String>,
    /// EVM payment address; an empty value removes it
    #[arg(long)]
    evm: Option<String>,

    /// Directory for the PDF (default: from config, else Downloads)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Do not open the PDF after writing it
    #[arg(long)]
    no_open: bool,
    /// Choose records and review every field through prompts
    #[arg(short, long)]
    interactive: bool,
    /// Also save the client and service as a new template with this name
    #[arg(long)]
    save_as: Option<String>,
    /// Also save the sender and bank details as a new profile with this name
    #[arg(long)]
    save_profile_as: Option<String>,
}

impl NewArgs {
    fn profile_selection(&self) -> Option<Selection> {
        match (&self.profile, self.default_sender) {
            (Some(id), _) => Some(Selection::Stored(id.clone())),
            (None, true) => Some(Selection::DefaultFallback),
            (None, false) => None,
        }
    }

    fn template_selection(&self) -> Option<Selection> {
        match (&self.template, self.manual) {
            (Some(id), _) => Some(Selection::Stored(id.clone())),
            (None, true) => Some(Selection::DefaultFallback),
            (None, false) => None,
        }
    }

    fn edits(&self) -> DraftEdits {
        DraftEdits {
            invoice_number: self.number.clone(),
            client_name: self.client_name.clone(),
            address_line1: self.address1.clone(),
            address_line2: self.address2.clone(),
            address_line3: self.address3.clone(),
            service_description: self.description.clone(),
            price: self.price.clone(),
            evm_address: self.evm.clone(),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
            ConfigAction::Init { force } => {
                Config::init(&config_path, *force)?;
                println!("Wrote {}", config_path.display());
                Ok(())
            }
        };
    }

    let config = Config::load(&config_path).with_context(|| format!("loading {}", config_path.display()))?;
    let mut store = JsonFileStore::open(config.store_path()?);
    tracing::debug!(store = %store.path().display(), "store opened");

    match cli.command {
        Command::New(args) => commands::new_invoice(&config, &mut store, &args),
        Command::Profile { action } => match action {
            RecordAction::List => commands::list_profiles(&store),
            RecordAction::Add => commands::add_profile(&mut store),
            RecordAction::Edit { id } => commands::edit_profile(&mut store, &id),
            RecordAction::Remove { id } => commands::remove_profile(&mut store, &id),
        },
        Command::Template { action } => match action {
            RecordAction::List => commands::list_templates(&store),
            RecordAction::Add => commands::add_template(&mut store),
            RecordAction::Edit { id } => commands::edit_template(&mut store, &id),
            RecordAction::Remove { id } => commands::remove_template(&mut store, &id),
        },
        Command::Config { .. } => Ok(()),
    }
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
    fn flags_map_to_selections_and_edits() {
        let cli = Cli::try_parse_from([
            "invoice",
            "new",
            "--default-sender",
            "--template",
            "template-1",
            "--price",
            "$4000",
            "--address3",
            "",
            "--month-offset",
            "-1",
        ])
        .unwrap();
        let Command::New(args) = cli.command else {
            panic!("expected the new command");
        };
        assert_eq!(args.profile_selection(), Some(Selection::DefaultFallback));
        assert_eq!(args.template_selection(), Some(Selection::Stored("template-1".into())));
        assert_eq!(args.month_offset, -1);
        let edits = args.edits();
        assert_eq!(edits.price.as_deref(), Some("$4000"));
        assert_eq!(edits.address_line3.as_deref(), Some(""));
        assert_eq!(edits.client_name, None);
    }

    #[test]
    fn edit_takes_a_record_id() {
        let cli = Cli::try_parse_from(["invoice", "template", "edit", "template-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Template { action: RecordAction::Edit { id } } if id == "template-1"
        ));
        assert!(Cli::try_parse_from(["invoice", "profile", "edit"]).is_err());
    }

    #[test]
    fn conflicting_selections_are_rejected() {
        assert!(Cli::try_parse_from(["invoice", "new", "--profile", "p", "--default-sender"]).is_err());
        assert!(Cli::try_parse_from(["invoice", "new", "--period-start", "2025-11-01"]).is_err());
    }

    #[test]
    fn no_selection_flags_keep_stored_first() {
        let cli = Cli::try_parse_from(["invoice", "-vv", "new", "--date", "2025-12-01"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::New(args) = cli.command else {
            panic!("expected the new command");
        };
        assert_eq!(args.profile_selection(), None);
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 12, 1));
    }
}
