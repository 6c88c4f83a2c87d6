use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

/// Environment variable that overrides the data directory location.
const DATA_DIR_ENV: &str = "SCHOLARMATE_DATA_DIR";

pub struct PortablePathManager;

impl PortablePathManager {
    /// Returns the application root directory (where the executable lives).
    pub fn root_dir() -> PathBuf {
        match std::env::current_exe() {
            Ok(mut path) => {
                path.pop(); // drop the executable name, keep its directory
                path
            }
            Err(e) => {
                error!(
                    "Failed to get current exe path: {}. Falling back to current_dir.",
                    e
                );
                std::env::current_dir().expect("Failed to get current directory")
            }
        }
    }

    /// Returns the main data directory.
    ///
    /// Defaults to `./data` next to the executable; `SCHOLARMATE_DATA_DIR`
    /// takes precedence when set.
    pub fn data_dir() -> PathBuf {
        match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => Self::root_dir().join("data"),
        }
    }

    /// Returns the database directory (`<data>/db`).
    pub fn db_dir() -> PathBuf {
        Self::data_dir().join("db")
    }

    /// Creates the on-disk directory layout if it does not exist yet.
    pub fn init() -> Result<(), std::io::Error> {
        let data_path = Self::data_dir();
        let db_path = Self::db_dir();

        if !data_path.exists() {
            info!("Creating data directory: {:?}", data_path);
            fs::create_dir_all(&data_path)?;
        }

        if !db_path.exists() {
            info!("Creating db directory: {:?}", db_path);
            fs::create_dir_all(&db_path)?;
        }

        Ok(())
    }
}
