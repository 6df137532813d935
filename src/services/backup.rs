use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::storage::{now_rfc3339, read_json_value, sha256_hex, write_json};
use crate::config::BackupConfig;
use crate::error::{CoreError, CoreResult};

/// One snapshot file as written to the backup directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub collection: String,
    pub created_at: String,
    pub count: usize,
    pub checksum: String,
    pub records: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub file: String,
    pub collection: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub collection: String,
    pub file: String,
    pub count: usize,
    pub checksum: String,
}

/// JSON snapshots of whole collections, taken after each write.
#[derive(Debug, Clone)]
pub struct Backups {
    cfg: BackupConfig,
}

fn records_checksum(records: &Value) -> CoreResult<String> {
    let compact = serde_json::to_vec(records)
        .map_err(|e| CoreError::Protocol(format!("unserializable records: {e}")))?;
    Ok(sha256_hex(&compact))
}

fn collection_of(file: &str) -> Option<&str> {
    let stem = file.strip_suffix(".json")?;
    let mut parts = stem.rsplitn(3, '-');
    let _seq = parts.next()?;
    let _ts = parts.next()?;
    parts.next()
}

impl Backups {
    pub fn new(cfg: BackupConfig) -> Self {
        Backups { cfg }
    }

    pub fn dir(&self) -> &Path {
        &self.cfg.dir
    }

    /// Best-effort snapshot after a write. Failures are logged, never
    /// returned.
    pub fn snapshot<T: Serialize>(&self, collection: &str, records: &[T]) -> Option<SnapshotInfo> {
        if !self.cfg.enabled {
            tracing::debug!(collection, "backups disabled, skipping snapshot");
            return None;
        }

        match self.write_snapshot(collection, records) {
            Ok(info) => {
                if let Err(e) = self.prune(collection) {
                    tracing::warn!(collection, error = %e, "failed to prune old backups");
                }
                Some(info)
            }
            Err(e) => {
                tracing::warn!(collection, error = %e, "backup snapshot failed");
                None
            }
        }
    }

    /// Writes a snapshot unconditionally.
    pub fn write_snapshot<T: Serialize>(
        &self,
        collection: &str,
        records: &[T],
    ) -> CoreResult<SnapshotInfo> {
        let records = serde_json::to_value(records)
            .map_err(|e| CoreError::Protocol(format!("unserializable records: {e}")))?;
        let checksum = records_checksum(&records)?;
        let count = records.as_array().map(Vec::len).unwrap_or(0);

        let doc = BackupDocument {
            collection: collection.to_string(),
            created_at: now_rfc3339(),
            count,
            checksum: checksum.clone(),
            records,
        };

        let path = self.next_path(collection);
        write_json(&path, &doc)?;

        let file = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        tracing::debug!(collection, file = %file, count, "backup written");

        Ok(SnapshotInfo {
            collection: collection.to_string(),
            file,
            count,
            checksum,
        })
    }

    fn next_path(&self, collection: &str) -> PathBuf {
        let prefix = format!("{collection}-{}-", chrono::Utc::now().format("%Y%m%dT%H%M%S%3fZ"));

        // sequence numbers only grow within one millisecond, even after pruning
        let next_seq = fs::read_dir(&self.cfg.dir)
            .map(|entries| {
                entries
                    .flatten()
                    .filter_map(|e| {
                        let name = e.file_name().to_string_lossy().to_string();
                        name.strip_prefix(&prefix)?
                            .strip_suffix(".json")?
                            .parse::<u32>()
                            .ok()
                    })
                    .max()
                    .map(|n| n + 1)
                    .unwrap_or(0)
            })
            .unwrap_or(0);

        self.cfg.dir.join(format!("{prefix}{next_seq:03}.json"))
    }

    fn prune(&self, collection: &str) -> CoreResult<usize> {
        let files = self
            .list()?
            .into_iter()
            .filter(|f| f.collection == collection)
            .map(|f| f.file);

        // list() is newest first
        let mut removed = 0usize;
        for file in files.skip(self.cfg.keep) {
            let path = self.cfg.dir.join(&file);
            fs::remove_file(&path).map_err(|e| CoreError::io(&path, e))?;
            removed += 1;
        }

        if removed > 0 {
            tracing::debug!(collection, removed, "pruned old backups");
        }
        Ok(removed)
    }

    /// Backup files, newest first.
    pub fn list(&self) -> CoreResult<Vec<BackupFile>> {
        if !self.cfg.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.cfg.dir).map_err(|e| CoreError::io(&self.cfg.dir, e))?;

        let mut out = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            let Some(collection) = collection_of(&name) else {
                continue;
            };
            let bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            out.push(BackupFile {
                collection: collection.to_string(),
                file: name,
                bytes,
            });
        }

        out.sort_by(|a, b| {
            let ka = a.file.trim_start_matches(&a.collection);
            let kb = b.file.trim_start_matches(&b.collection);
            kb.cmp(ka).then_with(|| a.collection.cmp(&b.collection))
        });
        Ok(out)
    }

    /// Reads a backup file and verifies its checksum.
    pub fn load(&self, file: &str) -> CoreResult<BackupDocument> {
        if file.contains(['/', '\\']) || file.contains("..") || collection_of(file).is_none() {
            return Err(CoreError::invalid("file", "not a backup file name"));
        }

        let path = self.cfg.dir.join(file);
        if !path.exists() {
            return Err(CoreError::NotFound {
                kind: "backup",
                id: file.to_string(),
            });
        }

        let value = read_json_value(&path)?;
        let doc: BackupDocument =
            serde_json::from_value(value).map_err(|e| CoreError::json(&path, e))?;

        if records_checksum(&doc.records)? != doc.checksum {
            return Err(CoreError::invalid("checksum", "backup content does not match its checksum"));
        }
        if !doc.records.is_array() {
            return Err(CoreError::invalid("records", "must be an array"));
        }

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn backups(dir: &TempDir, keep: usize) -> Backups {
        Backups::new(BackupConfig {
            enabled: true,
            dir: dir.path().join("backups"),
            keep,
        })
    }

    #[test]
    fn snapshot_writes_document_with_checksum() {
        let dir = TempDir::new().unwrap();
        let b = backups(&dir, 5);

        let info = b.snapshot("projects", &[json!({ "id": "a" })]).unwrap();
        assert_eq!(info.count, 1);
        assert!(info.file.starts_with("projects-"));

        let doc = b.load(&info.file).unwrap();
        assert_eq!(doc.collection, "projects");
        assert_eq!(doc.records, json!([{ "id": "a" }]));
        assert_eq!(doc.checksum, info.checksum);
    }

    #[test]
    fn keeps_only_newest_snapshots_per_collection() {
        let dir = TempDir::new().unwrap();
        let b = backups(&dir, 2);

        for i in 0..4 {
            b.snapshot("projects", &[json!({ "n": i })]).unwrap();
        }
        b.snapshot("messages", &Vec::<Value>::new()).unwrap();

        let files = b.list().unwrap();
        let projects: Vec<&BackupFile> =
            files.iter().filter(|f| f.collection == "projects").collect();
        assert_eq!(projects.len(), 2);
        assert_eq!(b.load(&projects[0].file).unwrap().records, json!([{ "n": 3 }]));
        assert_eq!(b.load(&projects[1].file).unwrap().records, json!([{ "n": 2 }]));
        assert_eq!(files.iter().filter(|f| f.collection == "messages").count(), 1);
    }

    #[test]
    fn disabled_backups_write_nothing() {
        let dir = TempDir::new().unwrap();
        let b = Backups::new(BackupConfig {
            enabled: false,
            dir: dir.path().join("backups"),
            keep: 5,
        });
        assert!(b.snapshot("projects", &[json!({})]).is_none());
        assert!(b.list().unwrap().is_empty());
    }

    #[test]
    fn unwritable_directory_is_swallowed() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let b = Backups::new(BackupConfig {
            enabled: true,
            dir: blocker.join("backups"),
            keep: 5,
        });
        assert!(b.snapshot("projects", &[json!({})]).is_none());
    }

    #[test]
    fn tampered_backup_is_rejected() {
        let dir = TempDir::new().unwrap();
        let b = backups(&dir, 5);
        let info = b.snapshot("projects", &[json!({ "id": "a" })]).unwrap();

        let path = b.dir().join(&info.file);
        let text = fs::read_to_string(&path).unwrap().replace("\"a\"", "\"b\"");
        fs::write(&path, text).unwrap();

        let err = b.load(&info.file).unwrap_err();
        assert_eq!(err.field_errors()[0].field, "checksum");
    }

    #[test]
    fn rejects_paths_outside_backup_dir() {
        let dir = TempDir::new().unwrap();
        let b = backups(&dir, 5);
        assert_eq!(b.load("../secrets-1-2.json").unwrap_err().code(), "validation");
        assert_eq!(b.load("notes.txt").unwrap_err().code(), "validation");
    }

    #[test]
    fn snapshot_names_carry_timestamp_and_sequence() {
        let dir = TempDir::new().unwrap();
        let b = backups(&dir, 5);
        let name = regex::Regex::new(r"^projects-\d{8}T\d{9}Z-\d{3}\.json$").unwrap();

        let first = b.snapshot("projects", &[json!({})]).unwrap().file;
        let second = b.snapshot("projects", &[json!({})]).unwrap().file;
        assert!(name.is_match(&first), "{first}");
        assert!(name.is_match(&second), "{second}");
        assert_ne!(first, second);
        assert_eq!(b.list().unwrap()[0].file, second);
    }

    #[test]
    fn collection_name_parses_from_file() {
        assert_eq!(collection_of("projects-20240101T000000000Z-000.json"), Some("projects"));
        assert_eq!(collection_of("projects.json"), None);
    }
}
