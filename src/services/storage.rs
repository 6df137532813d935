use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

/// Loads a JSON array file. A missing file is an empty collection.
pub fn read_collection<T: DeserializeOwned>(path: &Path) -> CoreResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&data).map_err(|e| CoreError::json(path, e))
}

pub fn read_json_value(path: &Path) -> CoreResult<serde_json::Value> {
    let data = fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    serde_json::from_str(&data).map_err(|e| CoreError::json(path, e))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> CoreResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CoreError::json(path, e))?;
    write_atomic(path, json.as_bytes())
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
    }

    fs::write(&tmp, bytes).map_err(|e| CoreError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| CoreError::io(path, e))?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "collection".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

/// 24 hex characters of randomness.
pub fn new_id() -> String {
    let bytes: [u8; 12] = rand::thread_rng().gen();
    hex::encode(bytes)
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let items: Vec<String> = read_collection(&dir.path().join("nope.json")).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn write_then_read_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("items.json");

        write_json(&path, &vec!["a", "b"]).unwrap();
        write_json(&path, &vec!["c"]).unwrap();

        let items: Vec<String> = read_collection(&path).unwrap();
        assert_eq!(items, vec!["c".to_string()]);
        assert!(!dir.path().join("nested").join("items.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_collection::<String>(&path).unwrap_err();
        assert_eq!(err.code(), "json");
    }

    #[test]
    fn ids_are_unique_hex() {
        let a = new_id();
        let b = new_id();
        assert_eq!(a.len(), 24);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn checksum_is_stable() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
