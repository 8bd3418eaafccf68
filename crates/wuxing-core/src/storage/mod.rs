pub mod snapshot;

pub use snapshot::{MemoryStore, SnapshotStore, SqliteStore};

use std::io;
use std::path::PathBuf;

/// Returns `~/.config/wuxing[-dev]/`, creating it if needed.
///
/// Set WUXING_ENV=dev to keep development data apart from the real
/// profile.
pub fn data_dir() -> io::Result<PathBuf> {
    let name = match std::env::var("WUXING_ENV").as_deref() {
        Ok("dev") => "wuxing-dev",
        _ => "wuxing",
    };
    let home = dirs::home_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "home directory not found")
    })?;
    let dir = home.join(".config").join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
