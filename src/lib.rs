pub mod commands;
pub mod db;
pub mod logging;
pub mod models;
pub mod notify;
pub mod settings;

use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use tracing::{error, info};

use db::{Entity, RecordStore, CLIENTS_TABLE};
use notify::{LogNotifier, Notice, Notifier};
use settings::{SettingsFile, Theme};

/// Everything a screen needs for the lifetime of the application.
pub struct Session {
    pub settings: SettingsFile,
    pub store: RecordStore,
    pub theme: Theme,
}

impl Session {
    /// Load the settings document, open the store it points at, and seed the
    /// example rows into an empty client table.
    pub fn start(settings_path: &Path, notifier: Rc<dyn Notifier>) -> anyhow::Result<Self> {
        let settings = SettingsFile::load(settings_path)
            .with_context(|| format!("Error reading settings from {}", settings_path.display()))?;
        let theme = settings.resolved_theme();

        let mut store = RecordStore::open(settings.storage_path(), notifier)
            .context("Database Error")?;

        if store.count_rows(Entity::Clients, CLIENTS_TABLE)? == 0 {
            db::seed_example_clients(&mut store)?;
            db::seed_example_orders(&mut store)?;
        }

        Ok(Self {
            settings,
            store,
            theme,
        })
    }
}

/// Start the application, exiting with status 1 if the settings or the
/// store cannot be brought up.
pub fn run() {
    logging::init();

    let notifier = Rc::new(LogNotifier);
    let settings_path = settings::settings_path();

    let session = match Session::start(&settings_path, notifier.clone()) {
        Ok(session) => session,
        Err(e) => {
            error!("startup failed: {e:#}");
            notifier.notify(Notice::error("Error", format!("{e:#}")));
            std::process::exit(1);
        }
    };

    info!(
        "storage at {}, theme {:?}",
        session.store.directory().display(),
        session.theme
    );
    for client in commands::search_clients(&session.store, "") {
        info!("{client}");
    }
}
