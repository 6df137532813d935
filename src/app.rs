use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::model::{ContactMessage, ContentKind};
use crate::services::analytics::Analytics;
use crate::services::backup::{Backups, SnapshotInfo};
use crate::services::contact::Inbox;
use crate::services::content::ContentStore;
use crate::services::notify::Notifier;
use crate::with_content_type;

const MESSAGES: &str = "messages";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub content: BTreeMap<String, usize>,
    pub messages: usize,
    pub unread_messages: usize,
    pub page_views: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub collection: String,
    pub restored: usize,
    pub previous: Option<SnapshotInfo>,
}

/// Everything a request handler needs, built once at startup.
#[derive(Debug, Clone)]
pub struct App {
    pub config: Config,
    pub content: ContentStore,
    pub inbox: Inbox,
    pub analytics: Analytics,
    pub backups: Backups,
}

impl App {
    pub fn new(config: Config) -> CoreResult<Self> {
        let notifier = Notifier::new(config.mail.clone())?;
        Self::with_notifier(config, notifier)
    }

    pub fn with_notifier(config: Config, notifier: Notifier) -> CoreResult<Self> {
        let backups = Backups::new(config.backup.clone());
        let content = ContentStore::open(config.data_dir.clone(), backups.clone())?;
        let mail = notifier.is_enabled();
        let inbox = Inbox::new(config.data_dir.clone(), backups.clone(), notifier);
        let analytics = Analytics::new(config.data_dir.clone());

        tracing::info!(
            data_dir = %config.data_dir.display(),
            backups = config.backup.enabled,
            mail,
            "portfolio core ready"
        );

        Ok(App {
            config,
            content,
            inbox,
            analytics,
            backups,
        })
    }

    /// Snapshots every collection, regardless of the backup toggle.
    pub fn export_backup(&self) -> CoreResult<Vec<SnapshotInfo>> {
        let mut out = Vec::with_capacity(ContentKind::ALL.len() + 1);
        for kind in ContentKind::ALL {
            let records = self.content.list_raw(kind)?;
            out.push(self.backups.write_snapshot(kind.as_str(), &records)?);
        }
        let messages = self.inbox.list()?;
        out.push(self.backups.write_snapshot(MESSAGES, &messages)?);

        tracing::info!(files = out.len(), "full backup exported");
        Ok(out)
    }

    pub fn restore_backup(&self, file: &str) -> CoreResult<RestoreReport> {
        let doc = self.backups.load(file)?;
        let records = match doc.records {
            serde_json::Value::Array(items) => items,
            _ => return Err(CoreError::invalid("records", "must be an array")),
        };

        let (previous, restored) = if doc.collection == MESSAGES {
            let messages: Vec<ContactMessage> = records
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<_, _>>()
                .map_err(|e| CoreError::invalid("records", e.to_string()))?;
            let previous = self.backups.snapshot(MESSAGES, &self.inbox.list()?);
            (previous, self.inbox.replace_all(messages)?)
        } else {
            let kind = ContentKind::parse(&doc.collection)?;
            with_content_type!(kind, T => {
                let typed = ContentStore::check_all::<T>(records)?;
                let previous = self.backups.snapshot(kind.as_str(), &self.content.list_raw(kind)?);
                (previous, self.content.replace_all(&typed)?)
            })
        };

        tracing::info!(collection = %doc.collection, restored, file, "backup restored");
        Ok(RestoreReport {
            collection: doc.collection,
            restored,
            previous,
        })
    }

    pub fn stats(&self) -> CoreResult<Stats> {
        let mut content = BTreeMap::new();
        for kind in ContentKind::ALL {
            content.insert(kind.as_str().to_string(), self.content.count(kind)?);
        }

        let messages = self.inbox.list()?;
        Ok(Stats {
            content,
            unread_messages: messages.iter().filter(|m| !m.read).count(),
            messages: messages.len(),
            page_views: self.analytics.total()?,
        })
    }
}
