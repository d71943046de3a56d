//! Binary entry point: resolve paths, start logging, open the catalog, and
//! drive the Ratatui event loop until the user exits.
use bookshelf_manager::config::Config;
use bookshelf_manager::logging::init_logging;
use bookshelf_manager::{close_catalog, open_catalog, run_app, App};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_logging(&config.log_path)?;

    let conn = open_catalog(&config.db_path)?;
    let mut app = App::new(conn)?;
    let result = run_app(&mut app);

    close_catalog(app.into_connection())?;
    if let Err(err) = &result {
        tracing::error!(error = %err, "exited with error");
    }
    result
}
