use std::path::PathBuf;

use serde::Serialize;

use super::backup::Backups;
use super::notify::{Delivery, Notifier};
use super::storage::{new_id, now_rfc3339, read_collection, write_json};
use crate::error::{CoreError, CoreResult};
use crate::i18n::Locale;
use crate::model::{ContactForm, ContactMessage};
use crate::validate::Checks;

const COLLECTION: &str = "messages";

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Submission {
    Stored {
        message: ContactMessage,
        notification: Option<Delivery>,
    },
    /// Honeypot filled: acknowledged to the client, never stored.
    Spam,
}

/// Contact form messages received from the public site.
#[derive(Debug, Clone)]
pub struct Inbox {
    path: PathBuf,
    backups: Backups,
    notifier: Notifier,
}

pub fn validate_form(form: &ContactForm) -> CoreResult<()> {
    let mut c = Checks::new();
    c.length("name", &form.name, 1, 100)
        .email("email", &form.email)
        .max_len("subject", form.subject.as_deref(), 200)
        .length("message", &form.message, 10, 5000);
    if let Some(l) = form.locale.as_deref().filter(|l| !l.trim().is_empty()) {
        if Locale::parse(l).is_none() {
            c.push("locale", "must be fr or en");
        }
    }
    c.finish()
}

impl Inbox {
    pub fn new(data_dir: PathBuf, backups: Backups, notifier: Notifier) -> Self {
        Inbox {
            path: data_dir.join(format!("{COLLECTION}.json")),
            backups,
            notifier,
        }
    }

    /// Newest first.
    pub fn list(&self) -> CoreResult<Vec<ContactMessage>> {
        let mut messages: Vec<ContactMessage> = read_collection(&self.path)?;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    pub fn submit(&self, form: ContactForm) -> CoreResult<Submission> {
        if form.website.as_deref().is_some_and(|w| !w.trim().is_empty()) {
            tracing::info!("contact form honeypot triggered, dropping message");
            return Ok(Submission::Spam);
        }

        validate_form(&form)?;

        let message = ContactMessage {
            id: new_id(),
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            subject: form
                .subject
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            message: form.message.trim().to_string(),
            locale: form.locale.as_deref().and_then(Locale::parse),
            read: false,
            created_at: now_rfc3339(),
        };

        let mut messages = self.list()?;
        messages.insert(0, message.clone());
        self.persist(&messages)?;
        tracing::info!(id = %message.id, "contact message stored");

        let notification = match self.notifier.contact_received(&message) {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::warn!(id = %message.id, error = %e, "contact notification failed");
                None
            }
        };

        Ok(Submission::Stored {
            message,
            notification,
        })
    }

    pub fn mark_read(&self, id: &str, read: bool) -> CoreResult<ContactMessage> {
        let mut messages = self.list()?;
        let msg = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| not_found(id))?;
        msg.read = read;
        let out = msg.clone();

        self.persist(&messages)?;
        Ok(out)
    }

    pub fn delete(&self, id: &str) -> CoreResult<ContactMessage> {
        let mut messages = self.list()?;
        let idx = messages
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| not_found(id))?;
        let removed = messages.remove(idx);

        self.persist(&messages)?;
        tracing::info!(id, "contact message deleted");
        Ok(removed)
    }

    /// Overwrites the inbox without a snapshot; the caller snapshots the
    /// messages being replaced.
    pub fn replace_all(&self, messages: Vec<ContactMessage>) -> CoreResult<usize> {
        write_json(&self.path, &messages)?;
        Ok(messages.len())
    }

    fn persist(&self, messages: &[ContactMessage]) -> CoreResult<()> {
        write_json(&self.path, messages)?;
        self.backups.snapshot(COLLECTION, messages);
        Ok(())
    }
}

fn not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        kind: COLLECTION,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackupConfig;
    use tempfile::TempDir;

    fn inbox(dir: &TempDir) -> Inbox {
        let backups = Backups::new(BackupConfig {
            enabled: false,
            dir: dir.path().join("backups"),
            keep: 5,
        });
        Inbox::new(dir.path().to_path_buf(), backups, Notifier::disabled())
    }

    fn form() -> ContactForm {
        ContactForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: Some("  ".into()),
            message: "I'd like to talk about a project.".into(),
            locale: Some("en-GB".into()),
            website: None,
        }
    }

    #[test]
    fn submit_stores_unread_message() {
        let dir = TempDir::new().unwrap();
        let inbox = inbox(&dir);

        let Submission::Stored { message, notification } = inbox.submit(form()).unwrap() else {
            panic!("expected a stored message");
        };
        assert_eq!(message.subject, None);
        assert_eq!(message.locale, Some(Locale::En));
        assert_eq!(notification, Some(Delivery::Skipped));
        assert!(!inbox.list().unwrap()[0].read);

        let read = inbox.mark_read(&message.id, true).unwrap();
        assert!(read.read);
        assert!(inbox.list().unwrap()[0].read);
    }

    #[test]
    fn honeypot_drops_message() {
        let dir = TempDir::new().unwrap();
        let inbox = inbox(&dir);
        let mut f = form();
        f.website = Some("http://spam.example".into());

        assert!(matches!(inbox.submit(f).unwrap(), Submission::Spam));
        assert!(inbox.list().unwrap().is_empty());
    }

    #[test]
    fn invalid_form_lists_fields() {
        let f = ContactForm {
            name: String::new(),
            email: "nope".into(),
            message: "short".into(),
            locale: Some("de".into()),
            ..ContactForm::default()
        };
        let err = validate_form(&f).unwrap_err();
        let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "message", "locale"]);
    }

    #[test]
    fn delete_unknown_message_is_not_found() {
        let dir = TempDir::new().unwrap();
        let inbox = inbox(&dir);
        assert_eq!(inbox.delete("nope").unwrap_err().code(), "not_found");
    }
}
