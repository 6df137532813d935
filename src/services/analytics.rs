use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::storage::{read_collection, write_json};
use crate::error::CoreResult;
use crate::i18n::Locale;

const MAX_VIEWS: usize = 10_000;
const TOP_REFERRERS: usize = 10;

fn bot_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)bot|crawl|spider|slurp|headless|lighthouse").expect("bot pattern")
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,

    pub at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub locale: Option<String>,

    #[serde(default)]
    pub referrer: Option<String>,

    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Count {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub by_path: Vec<Count>,
    pub by_locale: BTreeMap<String, usize>,
    pub by_day: BTreeMap<String, usize>,
    pub top_referrers: Vec<Count>,
}

fn normalize_path(raw: &str) -> String {
    let p = raw.split(['?', '#']).next().unwrap_or("").trim();
    let p = p.trim_end_matches('/');
    if p.is_empty() {
        "/".to_string()
    } else if p.starts_with('/') {
        p.to_string()
    } else {
        format!("/{p}")
    }
}

fn is_private(path: &str) -> bool {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let first = segments.first().copied().unwrap_or("");
    let second = segments.get(1).copied().unwrap_or("");
    first == "api" || first == "admin" || (Locale::parse(first).is_some() && second == "admin")
}

fn referrer_host(raw: Option<&str>) -> Option<String> {
    let u = url::Url::parse(raw?.trim()).ok()?;
    u.host_str().map(|h| h.trim_start_matches("www.").to_string())
}

fn ranked(counts: HashMap<String, usize>) -> Vec<Count> {
    let mut out: Vec<Count> = counts
        .into_iter()
        .map(|(key, count)| Count { key, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    out
}

/// Page view log of the public site.
#[derive(Debug, Clone)]
pub struct Analytics {
    path: PathBuf,
}

impl Analytics {
    pub fn new(data_dir: PathBuf) -> Self {
        Analytics {
            path: data_dir.join("analytics.json"),
        }
    }

    pub fn views(&self) -> CoreResult<Vec<PageView>> {
        read_collection(&self.path)
    }

    pub fn total(&self) -> CoreResult<usize> {
        Ok(self.views()?.len())
    }

    /// Returns whether the view was recorded.
    pub fn track(&self, req: &TrackRequest) -> CoreResult<bool> {
        self.track_at(req, Utc::now())
    }

    pub fn track_at(&self, req: &TrackRequest, at: DateTime<Utc>) -> CoreResult<bool> {
        let path = normalize_path(&req.path);

        if is_private(&path) {
            return Ok(false);
        }
        if req.user_agent.as_deref().is_some_and(|ua| bot_re().is_match(ua)) {
            tracing::debug!(path = %path, "ignoring bot page view");
            return Ok(false);
        }

        let locale = req.locale.as_deref().and_then(Locale::parse).or_else(|| {
            let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
            Locale::ALL.into_iter().find(|l| l.as_str() == first)
        });

        let mut views = self.views()?;
        views.push(PageView {
            path,
            locale,
            referrer: referrer_host(req.referrer.as_deref()),
            at: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        if views.len() > MAX_VIEWS {
            let excess = views.len() - MAX_VIEWS;
            views.drain(..excess);
        }

        write_json(&self.path, &views)?;
        Ok(true)
    }

    /// Aggregates views from the last `days` days, or all time.
    pub fn summary(&self, days: Option<u32>, now: DateTime<Utc>) -> CoreResult<Summary> {
        let since = days.map(|d| now - Duration::days(i64::from(d)));

        let mut total = 0usize;
        let mut by_path: HashMap<String, usize> = HashMap::new();
        let mut by_locale: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_day: BTreeMap<String, usize> = BTreeMap::new();
        let mut referrers: HashMap<String, usize> = HashMap::new();

        for v in self.views()? {
            let Ok(at) = DateTime::parse_from_rfc3339(&v.at) else {
                continue;
            };
            let at = at.with_timezone(&Utc);
            if since.is_some_and(|s| at < s) {
                continue;
            }

            total += 1;
            *by_path.entry(v.path).or_default() += 1;
            let locale = v.locale.map(Locale::as_str).unwrap_or("unknown");
            *by_locale.entry(locale.to_string()).or_default() += 1;
            *by_day.entry(at.format("%Y-%m-%d").to_string()).or_default() += 1;
            if let Some(r) = v.referrer {
                *referrers.entry(r).or_default() += 1;
            }
        }

        let mut top_referrers = ranked(referrers);
        top_referrers.truncate(TOP_REFERRERS);

        Ok(Summary {
            total,
            by_path: ranked(by_path),
            by_locale,
            by_day,
            top_referrers,
        })
    }
}
