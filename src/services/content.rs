use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};

use super::backup::Backups;
use super::storage::{new_id, now_rfc3339, read_collection, write_json};
use crate::error::{CoreError, CoreResult, FieldError};
use crate::i18n::{resolve_collection, FallbackChain};
use crate::model::{Content, ContentKind};

/// File-backed store for the admin-managed content collections.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    backups: Backups,
}

fn sort_records<T: Content>(records: &mut [T]) {
    records.sort_by(|a, b| {
        (a.meta().order, a.meta().created_at.as_str())
            .cmp(&(b.meta().order, b.meta().created_at.as_str()))
    });
}

/// RFC 7386 JSON merge patch.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    let Value::Object(patch_map) = patch else {
        *target = patch.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    if let Value::Object(target_map) = target {
        for (k, v) in patch_map {
            if v.is_null() {
                target_map.remove(k);
            } else {
                merge_patch(target_map.entry(k.clone()).or_insert(Value::Null), v);
            }
        }
    }
}

/// Resolves the per-type localized fields of every record.
pub fn localize<T: Content>(records: &[T], chain: &FallbackChain) -> Vec<T> {
    resolve_collection(records, T::KIND.localized_fields(), chain)
}

impl ContentStore {
    pub fn open(root: impl Into<PathBuf>, backups: Backups) -> CoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| CoreError::io(&root, e))?;
        Ok(ContentStore { root, backups })
    }

    fn path(&self, kind: ContentKind) -> PathBuf {
        self.root.join(format!("{kind}.json"))
    }

    pub fn list<T: Content>(&self) -> CoreResult<Vec<T>> {
        let mut records: Vec<T> = read_collection(&self.path(T::KIND))?;
        sort_records(&mut records);
        Ok(records)
    }

    /// Stored records of any kind, untyped and unsorted.
    pub fn list_raw(&self, kind: ContentKind) -> CoreResult<Vec<Value>> {
        read_collection(&self.path(kind))
    }

    pub fn count(&self, kind: ContentKind) -> CoreResult<usize> {
        Ok(self.list_raw(kind)?.len())
    }

    pub fn get<T: Content>(&self, id: &str) -> CoreResult<T> {
        self.list::<T>()?
            .into_iter()
            .find(|r| r.meta().id == id)
            .ok_or_else(|| not_found::<T>(id))
    }

    pub fn create<T: Content>(&self, mut record: T) -> CoreResult<T> {
        let mut records = self.list::<T>()?;

        let now = now_rfc3339();
        let meta = record.meta_mut();
        if meta.id.trim().is_empty() {
            meta.id = new_id();
        }
        meta.created_at = now.clone();
        meta.updated_at = now;

        let mut errors = record.validate();
        if records.iter().any(|r| r.meta().id == record.meta().id) {
            errors.push(FieldError::new("id", "already exists"));
        }
        errors.extend(records.iter().filter_map(|r| record.conflict_with(r)));
        if !errors.is_empty() {
            return Err(CoreError::Validation(errors));
        }

        records.push(record.clone());
        sort_records(&mut records);
        self.persist(&records)?;

        tracing::info!(kind = %T::KIND, id = %record.meta().id, "record created");
        Ok(record)
    }

    /// Applies a JSON merge patch. The id and creation time never change.
    pub fn update<T: Content>(&self, id: &str, patch: &Value) -> CoreResult<T> {
        let mut records = self.list::<T>()?;
        let idx = records
            .iter()
            .position(|r| r.meta().id == id)
            .ok_or_else(|| not_found::<T>(id))?;

        let current = &records[idx];
        let mut merged = serde_json::to_value(current)
            .map_err(|e| CoreError::Protocol(format!("unserializable record: {e}")))?;
        merge_patch(&mut merged, patch);

        let mut updated: T = serde_json::from_value(merged)
            .map_err(|e| CoreError::invalid("patch", e.to_string()))?;
        {
            let meta = updated.meta_mut();
            meta.id = current.meta().id.clone();
            meta.created_at = current.meta().created_at.clone();
            meta.updated_at = now_rfc3339();
        }

        let mut errors = updated.validate();
        errors.extend(
            records
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .filter_map(|(_, r)| updated.conflict_with(r)),
        );
        if !errors.is_empty() {
            return Err(CoreError::Validation(errors));
        }

        records[idx] = updated.clone();
        sort_records(&mut records);
        self.persist(&records)?;

        tracing::info!(kind = %T::KIND, id, "record updated");
        Ok(updated)
    }

    pub fn delete<T: Content>(&self, id: &str) -> CoreResult<T> {
        let mut records = self.list::<T>()?;
        let idx = records
            .iter()
            .position(|r| r.meta().id == id)
            .ok_or_else(|| not_found::<T>(id))?;

        let removed = records.remove(idx);
        self.persist(&records)?;

        tracing::info!(kind = %T::KIND, id, "record deleted");
        Ok(removed)
    }

    /// Listed ids take positions `0..n`; the rest follow in their current
    /// order.
    pub fn reorder<T: Content>(&self, ids: &[String]) -> CoreResult<Vec<T>> {
        let records = self.list::<T>()?;

        for id in ids {
            if !records.iter().any(|r| &r.meta().id == id) {
                return Err(not_found::<T>(id));
            }
        }

        let (mut listed, rest): (Vec<T>, Vec<T>) =
            records.into_iter().partition(|r| ids.contains(&r.meta().id));
        listed.sort_by_key(|r| ids.iter().position(|id| id == &r.meta().id));

        let mut out: Vec<T> = listed.into_iter().chain(rest).collect();
        for (pos, r) in out.iter_mut().enumerate() {
            r.meta_mut().order = pos as i32;
        }

        self.persist(&out)?;
        tracing::info!(kind = %T::KIND, count = ids.len(), "records reordered");
        Ok(out)
    }

    /// Typed, validated records for a whole-collection replace. Nothing is
    /// written.
    pub fn check_all<T: Content>(records: Vec<Value>) -> CoreResult<Vec<T>> {
        let mut typed: Vec<T> = Vec::with_capacity(records.len());
        let mut errors = Vec::new();

        for (i, v) in records.into_iter().enumerate() {
            match serde_json::from_value::<T>(v) {
                Ok(r) => {
                    errors.extend(r.validate().into_iter().map(|e| {
                        FieldError::new(format!("records[{i}].{}", e.field), e.message)
                    }));
                    typed.push(r);
                }
                Err(e) => errors.push(FieldError::new(format!("records[{i}]"), e.to_string())),
            }
        }
        if !errors.is_empty() {
            return Err(CoreError::Validation(errors));
        }

        sort_records(&mut typed);
        Ok(typed)
    }

    /// Overwrites a collection without a snapshot; the caller snapshots the
    /// records being replaced.
    pub fn replace_all<T: Content>(&self, records: &[T]) -> CoreResult<usize> {
        write_json(&self.path(T::KIND), records)?;
        Ok(records.len())
    }

    fn persist<T: Content>(&self, records: &[T]) -> CoreResult<()> {
        write_json(&self.path(T::KIND), records)?;
        self.backups.snapshot(T::KIND.as_str(), records);
        Ok(())
    }
}

fn not_found<T: Content>(id: &str) -> CoreError {
    CoreError::NotFound {
        kind: T::KIND.as_str(),
        id: id.to_string(),
    }
}
