use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::app::App;
use crate::error::{CoreError, CoreResult};
use crate::i18n::Locale;
use crate::model::ContactForm;

mod command;
mod content;
mod site;

pub use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, e: &CoreError) -> String {
    let mut body = json!({
        "id": id,
        "status": "error",
        "code": e.code(),
        "message": e.to_string()
    });
    if !e.field_errors().is_empty() {
        body["errors"] = json!(e.field_errors());
    }
    body.to_string()
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> CoreResult<Value> {
    serde_json::to_value(value).map_err(|e| CoreError::Protocol(format!("unserializable result: {e}")))
}

pub(crate) fn parse_payload<T: DeserializeOwned>(payload: &Value) -> CoreResult<T> {
    serde_json::from_value(payload.clone())
        .map_err(|e| CoreError::Protocol(format!("invalid payload: {e}")))
}

pub(crate) fn required_str<'a>(payload: &'a Value, key: &str) -> CoreResult<&'a str> {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| CoreError::Protocol(format!("payload.{key} is required")))
}

pub(crate) fn optional_locale(payload: &Value) -> CoreResult<Option<Locale>> {
    match payload.get("locale").and_then(|v| v.as_str()) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

pub(crate) fn required_locale(payload: &Value) -> CoreResult<Locale> {
    required_str(payload, "locale")?.parse()
}

fn dispatch(app: &App, cmd: Command, payload: &Value) -> CoreResult<Value> {
    match cmd {
        Command::Ping => Ok(json!({ "message": "portfolio-core alive" })),

        Command::ContentList => content::list(app, payload),
        Command::ContentGet => content::get(app, payload),
        Command::ContentCreate => content::create(app, payload),
        Command::ContentUpdate => content::update(app, payload),
        Command::ContentDelete => content::delete(app, payload),
        Command::ContentReorder => content::reorder(app, payload),
        Command::LocalizeRecord => content::localize_record(app, payload),
        Command::LocalizeCollection => content::localize_collection(app, payload),

        Command::ContactSubmit => {
            let form: ContactForm = parse_payload(payload)?;
            to_json(&app.inbox.submit(form)?)
        }
        Command::ContactList => Ok(json!({ "messages": to_json(&app.inbox.list()?)? })),
        Command::ContactMarkRead => {
            let id = required_str(payload, "id")?;
            let read = payload.get("read").and_then(|v| v.as_bool()).unwrap_or(true);
            Ok(json!({ "message": to_json(&app.inbox.mark_read(id, read)?)? }))
        }
        Command::ContactDelete => {
            let id = required_str(payload, "id")?;
            let removed = app.inbox.delete(id)?;
            Ok(json!({ "deleted": removed.id }))
        }

        Command::RouteResolve => site::route(app, payload),
        Command::SeoSitemap => site::sitemap(app),
        Command::SeoRobots => site::robots(app),
        Command::AnalyticsTrack => site::track(app, payload),
        Command::AnalyticsSummary => site::summary(app, payload),

        Command::AdminStats => to_json(&app.stats()?),
        Command::BackupExport => Ok(json!({ "files": to_json(&app.export_backup()?)? })),
        Command::BackupList => Ok(json!({ "files": to_json(&app.backups.list()?)? })),
        Command::BackupRestore => {
            let file = required_str(payload, "file")?;
            to_json(&app.restore_backup(file)?)
        }

        Command::Unknown => Err(CoreError::Protocol("unknown command".into())),
    }
}

fn invalid_json() -> String {
    json!({
        "status": "error",
        "code": "bad_request",
        "message": "invalid json"
    })
    .to_string()
}

/// Handles one raw request line. Bytes that are not UTF-8 get the same reply
/// as malformed JSON.
pub fn handle_bytes(app: &App, input: &[u8]) -> String {
    match std::str::from_utf8(input) {
        Ok(line) => handle(app, line),
        Err(_) => invalid_json(),
    }
}

/// Answers every non-blank request line of `reader` with exactly one line
/// on `writer`, until end of input.
pub fn serve<R: BufRead, W: Write>(app: &App, mut reader: R, mut writer: W) -> io::Result<()> {
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }

        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let response = match panic::catch_unwind(AssertUnwindSafe(|| handle_bytes(app, &buf))) {
            Ok(resp) => resp,
            Err(_) => {
                tracing::error!("request handler panicked");
                json!({
                    "status": "error",
                    "code": "internal",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        writeln!(writer, "{response}")?;
        writer.flush()?;
    }
}

/// Handles one request line and returns one response line.
pub fn handle(app: &App, input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => return invalid_json(),
    };

    let id = get_id(&req);
    let cmd_str = get_cmd(&req);
    let payload = get_payload(&req);

    match dispatch(app, Command::from(cmd_str), payload) {
        Ok(result) => ok(id, result),
        Err(e) => {
            match &e {
                CoreError::Io { .. } | CoreError::Json { .. } | CoreError::Config(_) => {
                    tracing::error!(cmd = cmd_str, error = %e, "request failed")
                }
                _ => tracing::debug!(cmd = cmd_str, error = %e, "request rejected"),
            }
            err(id, &e)
        }
    }
}
