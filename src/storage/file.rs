//! File-backed storage implementation.
//!
//! The store is kept in memory and every commit rewrites a single image file
//! in the configured directory. The image is written to a temporary file,
//! synced and renamed over the previous one, so a crash leaves either the old
//! or the new generation on disk.
//!
//! Image format (little-endian):
//!
//! ```text
//! b"QRRY" u32 version u64 generation u64 key_count
//! key_count × (u32 key_len, key, u32 value_len, value)
//! u32 crc32 of everything above
//! ```

use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};
use crate::storage::memory::MemoryStorage;
use crate::storage::{KeyMap, Snapshot, Storage, WriteBatch};

const MAGIC: &[u8; 4] = b"QRRY";
const VERSION: u32 = 1;
const IMAGE_FILE: &str = "quarry.img";
const TEMP_FILE: &str = "quarry.img.tmp";

/// Configuration for [`FileStorage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStorageConfig {
    /// Directory holding the image file; created if missing.
    pub path: PathBuf,
    /// fsync the image before publishing a commit.
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

fn default_sync_writes() -> bool {
    true
}

impl FileStorageConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileStorageConfig {
            path: path.as_ref().to_path_buf(),
            sync_writes: true,
        }
    }
}

/// Durable store persisted as one image file per directory.
#[derive(Debug)]
pub struct FileStorage {
    directory: PathBuf,
    config: FileStorageConfig,
    inner: MemoryStorage,
}

impl FileStorage {
    /// Open (or create) the store in `config.path`.
    pub fn open(config: FileStorageConfig) -> Result<Self> {
        let directory = config.path.clone();
        if !directory.exists() {
            fs::create_dir_all(&directory)
                .map_err(|e| QuarryError::storage(format!("Failed to create directory: {e}")))?;
        }
        if !directory.is_dir() {
            return Err(QuarryError::storage(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        let image = directory.join(IMAGE_FILE);
        let snapshot = if image.exists() {
            let mut bytes = Vec::new();
            File::open(&image)?.read_to_end(&mut bytes)?;
            let (data, generation) = decode_image(&bytes).inspect_err(|e| {
                warn!("rejecting storage image {}: {e}", image.display());
            })?;
            debug!(
                "loaded {} keys at generation {generation} from {}",
                data.len(),
                image.display()
            );
            Snapshot::new(Arc::new(data), generation)
        } else {
            Snapshot::default()
        };

        Ok(FileStorage {
            directory,
            config,
            inner: MemoryStorage::from_snapshot(snapshot),
        })
    }

    /// Directory holding the image.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn persist(&self, data: &KeyMap, generation: u64) -> Result<()> {
        let bytes = encode_image(data, generation)?;
        let temp = self.directory.join(TEMP_FILE);
        {
            let mut file = File::create(&temp)?;
            file.write_all(&bytes)?;
            if self.config.sync_writes {
                file.sync_all()?;
            }
        }
        fs::rename(&temp, self.directory.join(IMAGE_FILE))
            .map_err(|e| QuarryError::storage(format!("Failed to publish image: {e}")))?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn snapshot(&self) -> Result<Snapshot> {
        self.inner.snapshot()
    }

    fn commit(&self, batch: WriteBatch) -> Result<u64> {
        self.inner
            .commit_with(batch, |data, generation| self.persist(data, generation))
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

fn encode_image(data: &KeyMap, generation: u64) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.write_all(MAGIC)?;
    out.write_u32::<LittleEndian>(VERSION)?;
    out.write_u64::<LittleEndian>(generation)?;
    out.write_u64::<LittleEndian>(data.len() as u64)?;
    for (key, value) in data {
        out.write_u32::<LittleEndian>(key.len() as u32)?;
        out.write_all(key)?;
        out.write_u32::<LittleEndian>(value.len() as u32)?;
        out.write_all(value)?;
    }
    let checksum = crc32fast::hash(&out);
    out.write_u32::<LittleEndian>(checksum)?;
    Ok(out)
}

fn decode_image(bytes: &[u8]) -> Result<(KeyMap, u64)> {
    if bytes.len() < MAGIC.len() + 4 + 8 + 8 + 4 {
        return Err(QuarryError::corrupted("storage image is truncated"));
    }
    let (body, trailer) = bytes.split_at(bytes.len() - 4);
    let expected = Cursor::new(trailer).read_u32::<LittleEndian>()?;
    let actual = crc32fast::hash(body);
    if expected != actual {
        return Err(QuarryError::corrupted(format!(
            "storage image checksum mismatch (expected {expected:08x}, found {actual:08x})"
        )));
    }

    let mut cursor = Cursor::new(body);
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(QuarryError::corrupted("not a storage image"));
    }
    let version = cursor.read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(QuarryError::corrupted(format!(
            "unsupported storage image version {version}"
        )));
    }
    let generation = cursor.read_u64::<LittleEndian>()?;
    let count = cursor.read_u64::<LittleEndian>()?;

    let mut data = KeyMap::new();
    for _ in 0..count {
        let key = read_chunk(&mut cursor)?;
        let value = read_chunk(&mut cursor)?;
        data.insert(key, Arc::from(value));
    }
    Ok((data, generation))
}

fn read_chunk(cursor: &mut Cursor<&[u8]>) -> Result<Vec<u8>> {
    let len = cursor.read_u32::<LittleEndian>()? as usize;
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if len > remaining {
        return Err(QuarryError::corrupted("storage image record is truncated"));
    }
    let mut chunk = vec![0u8; len];
    cursor.read_exact(&mut chunk)?;
    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn commit_pair(storage: &FileStorage, key: &[u8], value: &[u8]) -> u64 {
        let mut batch = WriteBatch::new();
        batch.put(key.to_vec(), value.to_vec());
        storage.commit(batch).unwrap()
    }

    #[test]
    fn test_reopen_restores_last_commit() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig::new(temp_dir.path());

        {
            let storage = FileStorage::open(config.clone()).unwrap();
            commit_pair(&storage, b"a", b"1");
            assert_eq!(commit_pair(&storage, b"b", b"2"), 2);
        }

        let storage = FileStorage::open(config).unwrap();
        let snapshot = storage.snapshot().unwrap();
        assert_eq!(snapshot.generation(), 2);
        assert_eq!(snapshot.get(b"a"), Some(&b"1"[..]));
        assert_eq!(snapshot.get(b"b"), Some(&b"2"[..]));
        assert!(!temp_dir.path().join(TEMP_FILE).exists());
    }

    #[test]
    fn test_checksum_mismatch_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileStorageConfig::new(temp_dir.path());
        {
            let storage = FileStorage::open(config.clone()).unwrap();
            commit_pair(&storage, b"key", b"value");
        }

        let image = temp_dir.path().join(IMAGE_FILE);
        let mut bytes = fs::read(&image).unwrap();
        let middle = bytes.len() / 2;
        bytes[middle] ^= 0xff;
        fs::write(&image, bytes).unwrap();

        assert!(matches!(
            FileStorage::open(config),
            Err(QuarryError::Corrupted(_))
        ));
    }

    #[test]
    fn test_image_roundtrip() {
        let mut data = KeyMap::new();
        data.insert(b"x".to_vec(), Arc::from(&b""[..]));
        data.insert(vec![0, 1, 2], Arc::from(&[9u8; 300][..]));

        let bytes = encode_image(&data, 7).unwrap();
        let (decoded, generation) = decode_image(&bytes).unwrap();
        assert_eq!(generation, 7);
        assert_eq!(decoded, data);
    }
}
