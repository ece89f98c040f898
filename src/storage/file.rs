use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Seek, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs4::fs_std::FileExt;
use tracing::debug;

use super::KeyValueStorage;

/// Stores every key in its own `<key>.json` file inside a directory. Files are locked while
/// they are read or written so two processes don't interleave a write.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read(path: &Path) -> Result<String, std::io::Error> {
        let mut file = File::open(path)?;
        FileExt::lock_shared(&file)?;
        let mut value = String::new();
        let result = file.read_to_string(&mut value);
        FileExt::unlock(&file)?;
        result.map(|_| value)
    }

    fn write(path: &Path, value: &str) -> Result<(), std::io::Error> {
        // Truncating happens after the lock is taken, otherwise a reader could see an empty file.
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        FileExt::lock_exclusive(&file)?;
        let result = Self::overwrite(&mut file, value);
        FileExt::unlock(&file)?;
        result
    }

    fn overwrite(file: &mut File, value: &str) -> Result<(), std::io::Error> {
        file.set_len(0)?;
        file.rewind()?;
        file.write_all(value.as_bytes())?;
        file.flush()?;
        file.sync_data()
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        debug!("Reading {path:?}");
        match Self::read(&path) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)?,
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        debug!("Writing {} bytes into {path:?}", value.len());
        Self::write(&path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        debug!("Removing {path:?}");
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)?,
        }
    }
}
