use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};
use crate::i18n::{Locale, LocalePriority};

const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_BACKUP_KEEP: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub keep: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub endpoint: String,
    pub api_key: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub site_url: String,
    pub locales: LocalePriority,
    pub backup: BackupConfig,
    pub mail: Option<MailConfig>,
    pub log_json: bool,
}

fn default_data_dir() -> PathBuf {
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        return PathBuf::from(local).join("Portfolio").join("data");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("data")
}

fn parse_bool(key: &str, raw: Option<String>, default: bool) -> CoreResult<bool> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(CoreError::Config(format!("{key} must be a boolean, got {v:?}"))),
        },
    }
}

impl Config {
    pub fn from_env() -> CoreResult<Self> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let non_empty = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let data_dir = non_empty("PORTFOLIO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let site_url = non_empty("PORTFOLIO_SITE_URL")
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        url::Url::parse(&site_url)
            .map_err(|e| CoreError::Config(format!("PORTFOLIO_SITE_URL {site_url:?}: {e}")))?;

        let locales = match non_empty("PORTFOLIO_LOCALES") {
            None => LocalePriority::default(),
            Some(raw) => {
                let parsed = raw
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| s.parse::<Locale>())
                    .collect::<CoreResult<Vec<_>>>()
                    .map_err(|e| CoreError::Config(format!("PORTFOLIO_LOCALES: {e}")))?;
                LocalePriority::new(parsed)
            }
        };

        let keep = match non_empty("PORTFOLIO_BACKUP_KEEP") {
            None => DEFAULT_BACKUP_KEEP,
            Some(v) => v.trim().parse::<usize>().map_err(|_| {
                CoreError::Config(format!("PORTFOLIO_BACKUP_KEEP must be a number, got {v:?}"))
            })?,
        };

        let backup = BackupConfig {
            enabled: parse_bool("PORTFOLIO_BACKUP_ENABLED", get("PORTFOLIO_BACKUP_ENABLED"), true)?,
            dir: non_empty("PORTFOLIO_BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("backups")),
            keep: keep.max(1),
        };

        let mail = match (
            non_empty("PORTFOLIO_MAIL_ENDPOINT"),
            non_empty("PORTFOLIO_MAIL_API_KEY"),
            non_empty("PORTFOLIO_MAIL_FROM"),
            non_empty("PORTFOLIO_MAIL_TO"),
        ) {
            (Some(endpoint), Some(api_key), Some(from), Some(to)) => Some(MailConfig {
                endpoint,
                api_key,
                from,
                to,
            }),
            _ => None,
        };

        Ok(Config {
            data_dir,
            site_url,
            locales,
            backup,
            mail,
            log_json: parse_bool("PORTFOLIO_LOG_JSON", get("PORTFOLIO_LOG_JSON"), false)?,
        })
    }

    /// Configuration rooted at `data_dir` with every other setting at its
    /// default.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Config {
            backup: BackupConfig {
                enabled: true,
                dir: data_dir.join("backups"),
                keep: DEFAULT_BACKUP_KEEP,
            },
            data_dir,
            site_url: DEFAULT_SITE_URL.to_string(),
            locales: LocalePriority::default(),
            mail: None,
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::from_lookup(lookup(&[("PORTFOLIO_DATA_DIR", "/srv/portfolio")])).unwrap();
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/portfolio"));
        assert_eq!(cfg.site_url, "http://localhost:3000");
        assert_eq!(cfg.locales.default_locale(), Locale::Fr);
        assert!(cfg.backup.enabled);
        assert_eq!(cfg.backup.dir, PathBuf::from("/srv/portfolio/backups"));
        assert_eq!(cfg.backup.keep, 20);
        assert!(cfg.mail.is_none());
        assert!(!cfg.log_json);
    }

    #[test]
    fn reads_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("PORTFOLIO_DATA_DIR", "/data"),
            ("PORTFOLIO_SITE_URL", "https://jane.dev/"),
            ("PORTFOLIO_LOCALES", "en, fr"),
            ("PORTFOLIO_BACKUP_ENABLED", "off"),
            ("PORTFOLIO_BACKUP_KEEP", "3"),
            ("PORTFOLIO_MAIL_ENDPOINT", "https://mail.example.com/send"),
            ("PORTFOLIO_MAIL_API_KEY", "key"),
            ("PORTFOLIO_MAIL_FROM", "site@jane.dev"),
            ("PORTFOLIO_MAIL_TO", "jane@jane.dev"),
            ("PORTFOLIO_LOG_JSON", "true"),
        ]))
        .unwrap();
        assert_eq!(cfg.site_url, "https://jane.dev");
        assert_eq!(cfg.locales.locales(), &[Locale::En, Locale::Fr]);
        assert!(!cfg.backup.enabled);
        assert_eq!(cfg.backup.keep, 3);
        assert_eq!(cfg.mail.map(|m| m.to), Some("jane@jane.dev".to_string()));
        assert!(cfg.log_json);
    }

    #[test]
    fn partial_mail_settings_disable_mail() {
        let cfg = Config::from_lookup(lookup(&[
            ("PORTFOLIO_DATA_DIR", "/data"),
            ("PORTFOLIO_MAIL_ENDPOINT", "https://mail.example.com/send"),
        ]))
        .unwrap();
        assert!(cfg.mail.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        for pairs in [
            [("PORTFOLIO_DATA_DIR", "/d"), ("PORTFOLIO_LOCALES", "fr,de")],
            [("PORTFOLIO_DATA_DIR", "/d"), ("PORTFOLIO_BACKUP_KEEP", "many")],
            [("PORTFOLIO_DATA_DIR", "/d"), ("PORTFOLIO_LOG_JSON", "maybe")],
            [("PORTFOLIO_DATA_DIR", "/d"), ("PORTFOLIO_SITE_URL", "not a url")],
        ] {
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert_eq!(err.code(), "config");
        }
    }
}
