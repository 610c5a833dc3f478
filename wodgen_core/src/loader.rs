//! Input file loading with shared file locking.
//!
//! Files are read under an `fs2` shared lock so a concurrent writer never
//! hands us a half-written file. Missing profile and history files fall back
//! to defaults; a library file that exists must parse.

use crate::library::{get_default_library, MovementLibrary};
use crate::normalize::normalize_profile;
use crate::{Profile, Result};
use fs2::FileExt;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const PROFILE_FILE: &str = "profile.json";
pub const HISTORY_JSON_FILE: &str = "history.json";
pub const HISTORY_CSV_FILE: &str = "history.csv";
pub const LIBRARY_FILE: &str = "movements.json";

/// Input file locations inside a data directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPaths {
    pub profile: PathBuf,
    pub history: PathBuf,
    pub library: PathBuf,
}

impl DataPaths {
    /// Standard layout under `data_dir`
    ///
    /// `history.json` wins over `history.csv` when both exist.
    pub fn in_dir(data_dir: &Path) -> Self {
        let json_history = data_dir.join(HISTORY_JSON_FILE);
        let csv_history = data_dir.join(HISTORY_CSV_FILE);
        let history = if !json_history.exists() && csv_history.exists() {
            csv_history
        } else {
            json_history
        };

        Self {
            profile: data_dir.join(PROFILE_FILE),
            history,
            library: data_dir.join(LIBRARY_FILE),
        }
    }
}

/// Read a whole file under a shared lock, `None` if it does not exist
pub fn read_locked_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = Vec::new();
    let read = file.read_to_end(&mut contents);
    file.unlock()?;
    read?;

    Ok(Some(contents))
}

/// Like [`read_locked_bytes`], for UTF-8 text files
pub fn read_locked(path: &Path) -> Result<Option<String>> {
    match read_locked_bytes(path)? {
        Some(bytes) => {
            let text = String::from_utf8(bytes).map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("{} is not valid UTF-8: {}", path.display(), e),
                )
            })?;
            Ok(Some(text))
        }
        None => Ok(None),
    }
}

/// Read and parse a JSON file, `None` if it does not exist
pub fn read_json(path: &Path) -> Result<Option<Value>> {
    match read_locked(path)? {
        Some(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        None => Ok(None),
    }
}

/// Load and normalize the athlete profile
pub fn load_profile(path: &Path) -> Result<Profile> {
    match read_json(path)? {
        Some(raw) => {
            let profile = normalize_profile(&raw)?;
            tracing::debug!("Loaded profile from {:?}", path);
            Ok(profile)
        }
        None => {
            tracing::info!("No profile at {:?}, using defaults", path);
            Ok(Profile::default())
        }
    }
}

/// Load a movement library file, which must exist
pub fn load_library(path: &Path) -> Result<MovementLibrary> {
    let contents = read_locked(path)?.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("movement library not found: {}", path.display()),
        )
    })?;
    let raw: Value = serde_json::from_str(&contents)?;
    let library = MovementLibrary::from_json(&raw)?;
    tracing::info!("Loaded {} movements from {:?}", library.len(), path);
    Ok(library)
}

/// Load the library file if present, otherwise the built-in library
pub fn load_library_or_default(path: &Path) -> Result<MovementLibrary> {
    if path.exists() {
        load_library(path)
    } else {
        tracing::info!("No library at {:?}, using built-in movements", path);
        Ok(get_default_library().clone())
    }
}
