use std::{
    fs,
    io::{self, ErrorKind, Write},
    ops::Deref,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::entities::UserRecord;

pub const RECORD_FILE_NAME: &str = "user_data.json";
pub const ARCHIVE_DIR_NAME: &str = "archives";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("user record {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("archive {0:?} already exists")]
    ArchiveExists(PathBuf),
    #[error("`{0}` can't be used as an archive name")]
    InvalidArchiveName(String),
}

/// The only component allowed to touch the user record on disk. Flows hold a copy of the record,
/// change it and hand it back through [RecordStore::save].
#[cfg_attr(test, mockall::automock)]
pub trait RecordStore {
    /// Returns `None` if no record was ever saved.
    fn load(&self) -> Result<Option<UserRecord>, StoreError>;

    /// Replaces the record atomically. On failure the previous record stays in place.
    fn save(&self, record: &UserRecord) -> Result<(), StoreError>;

    /// Writes a copy of the record under the archive directory. Never overwrites an existing
    /// archive.
    fn archive(&self, record: &UserRecord, name: &str) -> Result<PathBuf, StoreError>;

    /// Removes the record so that the next launch starts from setup.
    fn delete(&self) -> Result<(), StoreError>;
}

impl<T: Deref> RecordStore for T
where
    T::Target: RecordStore,
{
    fn load(&self) -> Result<Option<UserRecord>, StoreError> {
        self.deref().load()
    }

    fn save(&self, record: &UserRecord) -> Result<(), StoreError> {
        self.deref().save(record)
    }

    fn archive(&self, record: &UserRecord, name: &str) -> Result<PathBuf, StoreError> {
        self.deref().archive(record, name)
    }

    fn delete(&self) -> Result<(), StoreError> {
        self.deref().delete()
    }
}

/// The main realization of [RecordStore]. Records are kept as pretty printed json.
pub struct JsonRecordStore {
    record_path: PathBuf,
    archive_dir: PathBuf,
}

impl JsonRecordStore {
    pub fn new(record_path: PathBuf, archive_dir: PathBuf) -> Self {
        Self {
            record_path,
            archive_dir,
        }
    }

    /// Standard layout inside the application directory.
    pub fn in_dir(application_dir: &Path) -> Self {
        Self::new(
            application_dir.join(RECORD_FILE_NAME),
            application_dir.join(ARCHIVE_DIR_NAME),
        )
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Serializes the record into a temporary file next to `target`. The temporary file is
    /// removed on drop unless it gets persisted.
    fn write_temporary(dir: &Path, record: &UserRecord) -> io::Result<NamedTempFile> {
        fs::create_dir_all(dir)?;
        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, record)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        Ok(file)
    }
}

fn archive_file_name(name: &str) -> Option<String> {
    let name = name.trim();
    let illegal = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if illegal {
        return None;
    }
    if name.ends_with(".json") {
        Some(name.to_string())
    } else {
        Some(format!("{name}.json"))
    }
}

/// Flushes the directory entry so that a completed rename survives a power loss.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl RecordStore for JsonRecordStore {
    fn load(&self) -> Result<Option<UserRecord>, StoreError> {
        let data = match fs::read_to_string(&self.record_path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No user record at {:?}", self.record_path);
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.record_path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.record_path.clone(),
                source,
            })
    }

    fn save(&self, record: &UserRecord) -> Result<(), StoreError> {
        let write_error = |source| StoreError::Write {
            path: self.record_path.clone(),
            source,
        };

        let dir = parent_dir(&self.record_path);
        let file = Self::write_temporary(dir, record).map_err(write_error)?;
        file.persist(&self.record_path)
            .map_err(|e| write_error(e.error))?;
        sync_dir(dir).map_err(write_error)?;

        debug!(
            "Saved user record with {} entries to {:?}",
            record.flight_logs.len(),
            self.record_path
        );
        Ok(())
    }

    fn archive(&self, record: &UserRecord, name: &str) -> Result<PathBuf, StoreError> {
        let file_name =
            archive_file_name(name).ok_or_else(|| StoreError::InvalidArchiveName(name.into()))?;
        let path = self.archive_dir.join(file_name);
        if path.exists() {
            return Err(StoreError::ArchiveExists(path));
        }

        let file = Self::write_temporary(&self.archive_dir, record).map_err(|source| {
            StoreError::Write {
                path: path.clone(),
                source,
            }
        })?;

        // persist_noclobber refuses to replace a file created after the check above.
        match file.persist_noclobber(&path) {
            Ok(_) => {
                sync_dir(&self.archive_dir).map_err(|source| StoreError::Write {
                    path: path.clone(),
                    source,
                })?;
                info!("Archived user record to {path:?}");
                Ok(path)
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::ArchiveExists(path))
            }
            Err(e) => Err(StoreError::Write {
                path,
                source: e.error,
            }),
        }
    }

    fn delete(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.record_path) {
            Ok(()) => {
                info!("Deleted user record {:?}", self.record_path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("User record {:?} was already gone", self.record_path);
                Ok(())
            }
            Err(source) => Err(StoreError::Write {
                path: self.record_path.clone(),
                source,
            }),
        }
    }
}
