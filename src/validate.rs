use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{CoreError, CoreResult, FieldError};
use crate::i18n::{resolve_field, FallbackChain, FieldRef, Locale, LocalizedSource, Slot};

pub const TITLE_MAX: usize = 200;
pub const TEXT_MAX: usize = 5000;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern")
    })
}

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern"))
}

pub fn is_email(value: &str) -> bool {
    email_re().is_match(value.trim())
}

pub fn is_slug(value: &str) -> bool {
    slug_re().is_match(value)
}

/// `YYYY-MM-DD` naming a real calendar day, or `YYYY-MM`.
pub fn is_date(value: &str) -> bool {
    let value = value.trim();
    let full = match value.len() {
        7 => format!("{value}-01"),
        10 => value.to_string(),
        _ => return false,
    };
    NaiveDate::parse_from_str(&full, "%Y-%m-%d").is_ok()
}

/// Collects field errors for one payload.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Checks::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
        self
    }

    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let n = value.trim().chars().count();
        if n < min {
            self.push(field, format!("must be at least {min} characters"));
        } else if n > max {
            self.push(field, format!("must be at most {max} characters"));
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(v) = value {
            if v.chars().count() > max {
                self.push(field, format!("must be at most {max} characters"));
            }
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_email(value) {
            self.push(field, "must be a valid email address");
        }
        self
    }

    pub fn slug(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            if !is_slug(v) {
                self.push(field, "must contain lowercase letters, digits and single dashes");
            }
        }
        self
    }

    pub fn date(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            if !is_date(v) {
                self.push(field, "must be YYYY-MM or YYYY-MM-DD");
            }
        }
        self
    }

    pub fn http_url(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            let ok = url::Url::parse(v.trim())
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
                .unwrap_or(false);
            if !ok {
                self.push(field, "must be an http(s) URL");
            }
        }
        self
    }

    /// The logical field must resolve to a value in at least one slot.
    pub fn translated<R>(&mut self, record: &R, field: &str) -> &mut Self
    where
        R: LocalizedSource + ?Sized,
    {
        let chain = FallbackChain::for_locale(Locale::ALL[0]);
        if resolve_field(record, field, &chain).is_none() {
            self.push(field, "is required in at least one language");
        }
        self
    }

    /// Applies `max` to every text variant of a logical field.
    pub fn translated_max_len<R>(&mut self, record: &R, field: &str, max: usize) -> &mut Self
    where
        R: LocalizedSource + ?Sized,
    {
        let slots = Locale::ALL.into_iter().map(Slot::Lang).chain([Slot::Legacy]);
        for slot in slots {
            if let Some(FieldRef::Text(v)) = record.field(field, slot) {
                if v.chars().count() > max {
                    let key = match slot {
                        Slot::Lang(l) => format!("{field}_{l}"),
                        Slot::Legacy => field.to_string(),
                    };
                    self.push(key, format!("must be at most {max} characters"));
                }
            }
        }
        self
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn finish(self) -> CoreResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_shapes() {
        assert!(is_email("ada@example.com"));
        assert!(is_email(" first.last+tag@mail.example.co.uk "));
        assert!(!is_email("ada@"));
        assert!(!is_email("ada example.com"));
        assert!(!is_email("ada@example"));
    }

    #[test]
    fn slug_shapes() {
        assert!(is_slug("portfolio-v2"));
        assert!(!is_slug("Portfolio"));
        assert!(!is_slug("double--dash"));
        assert!(!is_slug("-leading"));
    }

    #[test]
    fn collects_all_errors() {
        let mut c = Checks::new();
        c.required("name", "  ")
            .length("message", "short", 10, 5000)
            .date("startDate", Some("2024-13"))
            .http_url("githubUrl", Some("ftp://example.com"))
            .http_url("demoUrl", Some(""));
        let errors = c.into_errors();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "message", "startDate", "githubUrl"]);
    }

    #[test]
    fn dates_accept_month_and_day_precision() {
        let mut c = Checks::new();
        c.date("a", Some("2023-04")).date("b", Some("2023-04-30")).date("c", None);
        assert!(c.finish().is_ok());

        let mut c = Checks::new();
        c.date("a", Some("2023-02-31"))
            .date("b", Some("2023-13"))
            .date("c", Some("2023-4-1"))
            .date("d", Some("2024-02-29"));
        let fields: Vec<String> = c.into_errors().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["a", "b", "c"]);
    }

    #[test]
    fn translated_checks_every_slot() {
        let record = match json!({ "title_en": "Hello", "title_fr": "x".repeat(5) }) {
            serde_json::Value::Object(m) => m,
            _ => unreachable!(),
        };
        let mut c = Checks::new();
        c.translated(&record, "title")
            .translated_max_len(&record, "title", 4)
            .translated(&record, "description");
        let errors = c.into_errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "title_fr");
        assert_eq!(errors[1].field, "title_en");
        assert_eq!(errors[2].field, "description");
    }
}
