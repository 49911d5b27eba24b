use std::{fs, io, path::Path};

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Turns `DATABASE_PATH` into a SeaORM DSN.
///
/// Values that already look like a DSN are returned unchanged; anything else is
/// treated as a SQLite file path (opened read-write, created if missing).
pub fn database_url(path_or_url: &str) -> String {
    if is_dsn(path_or_url) {
        path_or_url.to_owned()
    } else {
        format!("sqlite://{path_or_url}?mode=rwc")
    }
}

pub fn is_dsn(value: &str) -> bool {
    value.starts_with("sqlite:") || value.starts_with("postgres://") || value.starts_with("mysql://")
}
