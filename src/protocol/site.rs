use chrono::Utc;
use serde_json::{json, Value};

use super::{parse_payload, to_json};
use crate::app::App;
use crate::error::{CoreError, CoreResult};
use crate::model::Project;
use crate::services::analytics::TrackRequest;
use crate::services::routing::{self, RouteRequest};
use crate::services::seo;
use crate::services::storage::now_rfc3339;

pub fn route(app: &App, payload: &Value) -> CoreResult<Value> {
    let req: RouteRequest = parse_payload(payload)?;
    if req.path.trim().is_empty() {
        return Err(CoreError::Protocol("payload.path is required".into()));
    }
    to_json(&routing::decide(&req, &app.config.locales))
}

pub fn sitemap(app: &App) -> CoreResult<Value> {
    let projects = app.content.list::<Project>()?;
    let xml = seo::sitemap(&app.config.site_url, &app.config.locales, &projects, &now_rfc3339());
    Ok(json!({ "xml": xml }))
}

pub fn robots(app: &App) -> CoreResult<Value> {
    Ok(json!({ "text": seo::robots(&app.config.site_url) }))
}

pub fn track(app: &App, payload: &Value) -> CoreResult<Value> {
    let req: TrackRequest = parse_payload(payload)?;
    if req.path.trim().is_empty() {
        return Err(CoreError::Protocol("payload.path is required".into()));
    }
    let recorded = app.analytics.track(&req)?;
    Ok(json!({ "recorded": recorded }))
}

pub fn summary(app: &App, payload: &Value) -> CoreResult<Value> {
    let days = match payload.get("days") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_u64()
                .and_then(|d| u32::try_from(d).ok())
                .ok_or_else(|| CoreError::Protocol("payload.days must be a positive integer".into()))?,
        ),
    };
    to_json(&app.analytics.summary(days, Utc::now())?)
}
