use serde::{Deserialize, Serialize};

use super::{Content, ContentKind, RecordMeta};
use crate::error::FieldError;
use crate::localized_fields;
use crate::validate::{Checks, TEXT_MAX, TITLE_MAX};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(flatten)]
    pub meta: RecordMeta,

    #[serde(default)]
    pub company: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, rename = "title_fr", skip_serializing_if = "Option::is_none")]
    pub title_fr: Option<String>,

    #[serde(default, rename = "title_en", skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, rename = "description_fr", skip_serializing_if = "Option::is_none")]
    pub description_fr: Option<String>,

    #[serde(default, rename = "description_en", skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,

    #[serde(default)]
    pub achievements: Vec<String>,

    #[serde(default, rename = "achievements_fr")]
    pub achievements_fr: Vec<String>,

    #[serde(default, rename = "achievements_en")]
    pub achievements_en: Vec<String>,

    #[serde(default)]
    pub technologies: Vec<String>,

    #[serde(default)]
    pub start_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    #[serde(default)]
    pub current: bool,
}

localized_fields!(Experience {
    "title" => (title, title_fr, title_en),
    "description" => (description, description_fr, description_en),
    "achievements" => (achievements, achievements_fr, achievements_en),
});

impl Content for Experience {
    const KIND: ContentKind = ContentKind::Experiences;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut c = Checks::new();
        c.required("company", &self.company)
            .translated(self, "title")
            .translated_max_len(self, "title", TITLE_MAX)
            .translated_max_len(self, "description", TEXT_MAX)
            .required("startDate", &self.start_date)
            .date("startDate", Some(self.start_date.as_str()))
            .date("endDate", self.end_date.as_deref());
        c.into_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{resolve_record, FallbackChain, Locale};

    #[test]
    fn achievements_fall_back_across_languages() {
        let e = Experience {
            company: "Acme".into(),
            title_fr: Some("Développeur".into()),
            achievements_en: vec!["Shipped v1".into()],
            start_date: "2021-03".into(),
            ..Experience::default()
        };
        let out = resolve_record(
            &e,
            Experience::KIND.localized_fields(),
            &FallbackChain::for_locale(Locale::Fr),
        );
        assert_eq!(out.achievements, vec!["Shipped v1".to_string()]);
        assert_eq!(out.title.as_deref(), Some("Développeur"));
        assert!(e.validate().is_empty());
    }

    #[test]
    fn start_date_is_required() {
        let e = Experience {
            company: "Acme".into(),
            title: Some("Dev".into()),
            end_date: Some("last year".into()),
            ..Experience::default()
        };
        let fields: Vec<String> = e.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["startDate", "endDate"]);
    }
}
