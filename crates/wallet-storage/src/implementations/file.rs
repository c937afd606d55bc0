//! File-backed storage backend.
//!
//! Each key maps to one file under the configured directory. Keys are
//! sanitized into filenames; writes go through a temp file and rename so
//! a crash mid-write never leaves a truncated document behind.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage implementation.
pub struct FileStorage {
	directory: PathBuf,
}

impl FileStorage {
	/// Creates a backend rooted at `directory`, creating it if needed.
	pub fn new(directory: impl AsRef<Path>) -> Result<Self, StorageError> {
		let directory = directory.as_ref().to_path_buf();
		std::fs::create_dir_all(&directory)
			.map_err(|e| StorageError::Backend(format!("cannot create {:?}: {}", directory, e)))?;
		Ok(Self { directory })
	}

	fn path_for(&self, key: &str) -> PathBuf {
		// Keys contain ':' separators and addresses; keep filenames tame.
		let sanitized: String = key
			.chars()
			.map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
			.collect();
		self.directory.join(format!("{}.json", sanitized))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.path_for(key);
		match fs::read(&path).await {
			Ok(bytes) => Ok(bytes),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.path_for(key);
		let tmp = path.with_extension("json.tmp");
		fs::write(&tmp, &value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&tmp, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.path_for(key);
		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(fs::try_exists(self.path_for(key)).await.unwrap_or(false))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn round_trip_and_delete() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path()).unwrap();

		storage
			.set_bytes("transactions:0xabc:mainnet", b"[]".to_vec())
			.await
			.unwrap();
		assert_eq!(
			storage.get_bytes("transactions:0xabc:mainnet").await.unwrap(),
			b"[]"
		);

		storage.delete("transactions:0xabc:mainnet").await.unwrap();
		assert!(matches!(
			storage.get_bytes("transactions:0xabc:mainnet").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn overwrite_replaces_previous_value() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path()).unwrap();

		storage.set_bytes("key", b"one".to_vec()).await.unwrap();
		storage.set_bytes("key", b"two".to_vec()).await.unwrap();
		assert_eq!(storage.get_bytes("key").await.unwrap(), b"two");
	}
}
