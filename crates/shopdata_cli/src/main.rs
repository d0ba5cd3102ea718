//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured database and print per-table row counts.
//! - Keep output deterministic for quick local sanity checks.

use shopdata_core::db::open_db;
use shopdata_core::{
    core_version, default_log_level, init_logging, Brand, ConnectionSettings, Product,
    ProductType, RepoResult, Repository, SqliteRepository, TableMapping, Town,
};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "SHOPDATA_LOG_DIR";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("shopdata logging disabled: {err}");
        }
    }

    println!("shopdata_core version={}", core_version());

    let settings = match ConnectionSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("shopdata config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("connection {}", settings.connection_string());

    match print_counts(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("shopdata probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_counts(settings: &ConnectionSettings) -> RepoResult<()> {
    let conn = open_db(settings)?;
    print_count::<Town>(&SqliteRepository::try_new(&conn)?)?;
    print_count::<Brand>(&SqliteRepository::try_new(&conn)?)?;
    print_count::<ProductType>(&SqliteRepository::try_new(&conn)?)?;
    print_count::<Product>(&SqliteRepository::try_new(&conn)?)?;
    Ok(())
}

fn print_count<T: TableMapping>(repo: &SqliteRepository<'_, T>) -> RepoResult<()> {
    println!("{} rows={}", T::TABLE, repo.get_all()?.len());
    Ok(())
}
