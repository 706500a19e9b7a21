//! Database export.
//!
//! Copies the `SQLite` file to a user-visible export directory under a name
//! derived from today's date, overwriting any export already made the same
//! day. Earlier releases shelled out to `zip`; a plain file copy keeps the
//! export self-contained and restorable by pointing `DATABASE_URL` at it.

use crate::errors::{Error, Result};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

/// Resolves the filesystem path behind a `sqlite://` connection URL.
///
/// Rejects in-memory databases, which have no file to export.
pub fn database_file_path(database_url: &str) -> Result<PathBuf> {
    let without_scheme = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = without_scheme.split('?').next().unwrap_or(without_scheme);

    if path.is_empty() || path == ":memory:" {
        return Err(Error::Config {
            message: format!("Database URL {database_url} has no file to export"),
        });
    }
    Ok(PathBuf::from(path))
}

/// Exports the current database file into `export_dir`.
///
/// The archive is named `AbonementusDB<ddMMyyyy>.sqlite` after today's local
/// date; a same-day export is overwritten. Returns the path written.
pub fn backup_database(database_url: &str, export_dir: &Path) -> Result<PathBuf> {
    let source = database_file_path(database_url)?;
    if !source.exists() {
        return Err(Error::Config {
            message: format!("Database file not found at {}", source.display()),
        });
    }

    std::fs::create_dir_all(export_dir)?;
    let date_stamp = Local::now().format("%d%m%Y");
    let target = export_dir.join(format!("AbonementusDB{date_stamp}.sqlite"));

    std::fs::copy(&source, &target)?;
    info!("Exported database to {}", target.display());
    Ok(target)
}
