use serde_json::{json, Map, Value};

use super::{optional_locale, required_locale, required_str, to_json};
use crate::app::App;
use crate::error::{CoreError, CoreResult};
use crate::i18n::{resolve_collection, resolve_record};
use crate::model::{Content, ContentKind};
use crate::services::content::localize;
use crate::with_content_type;

fn kind_of(payload: &Value) -> CoreResult<ContentKind> {
    ContentKind::parse(required_str(payload, "kind")?)
}

fn object(v: &Value, what: &str) -> CoreResult<Map<String, Value>> {
    match v {
        Value::Object(m) => Ok(m.clone()),
        _ => Err(CoreError::Protocol(format!("{what} must be an object"))),
    }
}

pub fn list(app: &App, payload: &Value) -> CoreResult<Value> {
    let kind = kind_of(payload)?;
    let locale = optional_locale(payload)?;

    with_content_type!(kind, T => {
        let mut records = app.content.list::<T>()?;
        if let Some(l) = locale {
            records = localize(&records, &app.config.locales.chain_for(l));
        }
        Ok(json!({ "kind": kind, "records": to_json(&records)? }))
    })
}

pub fn get(app: &App, payload: &Value) -> CoreResult<Value> {
    let kind = kind_of(payload)?;
    let id = required_str(payload, "id")?;
    let locale = optional_locale(payload)?;

    with_content_type!(kind, T => {
        let mut record = app.content.get::<T>(id)?;
        if let Some(l) = locale {
            record = resolve_record(&record, T::KIND.localized_fields(), &app.config.locales.chain_for(l));
        }
        Ok(json!({ "record": to_json(&record)? }))
    })
}

pub fn create(app: &App, payload: &Value) -> CoreResult<Value> {
    let kind = kind_of(payload)?;
    let raw = payload
        .get("record")
        .filter(|v| v.is_object())
        .ok_or_else(|| CoreError::Protocol("payload.record must be an object".into()))?;

    with_content_type!(kind, T => {
        let record: T = serde_json::from_value(raw.clone())
            .map_err(|e| CoreError::invalid("record", e.to_string()))?;
        let created = app.content.create(record)?;
        Ok(json!({ "record": to_json(&created)? }))
    })
}

pub fn update(app: &App, payload: &Value) -> CoreResult<Value> {
    let kind = kind_of(payload)?;
    let id = required_str(payload, "id")?;
    let patch = payload
        .get("patch")
        .filter(|v| v.is_object())
        .ok_or_else(|| CoreError::Protocol("payload.patch must be an object".into()))?;

    with_content_type!(kind, T => {
        let updated = app.content.update::<T>(id, patch)?;
        Ok(json!({ "record": to_json(&updated)? }))
    })
}

pub fn delete(app: &App, payload: &Value) -> CoreResult<Value> {
    let kind = kind_of(payload)?;
    let id = required_str(payload, "id")?;

    with_content_type!(kind, T => {
        let removed = app.content.delete::<T>(id)?;
        Ok(json!({ "deleted": removed.meta().id }))
    })
}

pub fn reorder(app: &App, payload: &Value) -> CoreResult<Value> {
    let kind = kind_of(payload)?;
    let ids: Vec<String> = payload
        .get("ids")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| CoreError::Protocol(format!("payload.ids: {e}")))?
        .ok_or_else(|| CoreError::Protocol("payload.ids is required".into()))?;

    with_content_type!(kind, T => {
        let records = app.content.reorder::<T>(&ids)?;
        Ok(json!({ "records": to_json(&records)? }))
    })
}

/// Resolves an arbitrary string-keyed record against an explicit field list.
pub fn localize_record(app: &App, payload: &Value) -> CoreResult<Value> {
    let locale = required_locale(payload)?;
    let record = object(payload.get("record").unwrap_or(&Value::Null), "payload.record")?;
    let fields: Vec<String> = match payload.get("fields") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<_>>()
            .ok_or_else(|| CoreError::Protocol("payload.fields must be strings".into()))?,
        _ => return Err(CoreError::Protocol("payload.fields must be an array".into())),
    };
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();

    let out = resolve_record(&record, &fields, &app.config.locales.chain_for(locale));
    Ok(json!({ "record": Value::Object(out) }))
}

/// Resolves caller-supplied records with the fixed field list of a content
/// type.
pub fn localize_collection(app: &App, payload: &Value) -> CoreResult<Value> {
    let kind = kind_of(payload)?;
    let locale = required_locale(payload)?;
    let records = match payload.get("records") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| object(v, &format!("payload.records[{i}]")))
            .collect::<CoreResult<Vec<_>>>()?,
        _ => return Err(CoreError::Protocol("payload.records must be an array".into())),
    };

    let out = resolve_collection(
        &records,
        kind.localized_fields(),
        &app.config.locales.chain_for(locale),
    );
    Ok(json!({
        "records": out.into_iter().map(Value::Object).collect::<Vec<_>>()
    }))
}
