//! Subcommands and the session they share.

pub mod add;
pub mod delete;
pub mod list;
pub mod shell;

use clap::Args;
use log::info;
use okozukai_core::{
    init_logging, open_store, AppConfig, CurrencyConfig, ExpenseStore, StorageBackend,
    SyncController,
};
use std::error::Error;
use std::path::PathBuf;

pub type CommandResult<T = ()> = Result<T, Box<dyn Error>>;

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file; overrides `storage.path` and selects sqlite
    #[arg(long, global = true, conflicts_with = "memory")]
    pub db: Option<PathBuf>,

    /// Keep entries in memory only (useful with `shell`)
    #[arg(long, global = true)]
    pub memory: bool,
}

/// One mounted view: a subscribed controller plus display settings.
pub struct Session {
    pub controller: SyncController<Box<dyn ExpenseStore>>,
    pub currency: CurrencyConfig,
}

impl Session {
    /// Applies queued snapshots; the ledger is current afterwards.
    pub fn refresh(&mut self) -> usize {
        self.controller.sync_pending()
    }
}

pub fn load_config(args: &SessionArgs) -> CommandResult<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(db) = &args.db {
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.path = db.clone();
    }
    if args.memory {
        config.storage.backend = StorageBackend::Memory;
    }
    config.validate()?;
    Ok(config)
}

/// Composes store, controller and logging from the command line.
pub fn open_session(args: &SessionArgs) -> CommandResult<Session> {
    let config = load_config(args)?;
    if let Some(dir) = &config.logging.dir {
        init_logging(&config.logging.level, dir)?;
    }

    let store = open_store(&config.storage)?;
    let mut controller =
        SyncController::new(store).with_currency_scale(config.currency.scale);
    controller.activate()?;
    controller.sync_pending();
    info!(
        "event=cli_session module=cli status=ok backend={} version={} entries={}",
        controller.store().backend(),
        okozukai_core::core_version(),
        controller.ledger().len()
    );

    Ok(Session {
        controller,
        currency: config.currency,
    })
}
