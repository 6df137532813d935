use serde::{Deserialize, Serialize};

use super::{Content, ContentKind, RecordMeta};
use crate::error::FieldError;
use crate::localized_fields;
use crate::validate::{Checks, TEXT_MAX, TITLE_MAX};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(flatten)]
    pub meta: RecordMeta,

    #[serde(default)]
    pub institution: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,

    #[serde(default, rename = "degree_fr", skip_serializing_if = "Option::is_none")]
    pub degree_fr: Option<String>,

    #[serde(default, rename = "degree_en", skip_serializing_if = "Option::is_none")]
    pub degree_en: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default, rename = "field_fr", skip_serializing_if = "Option::is_none")]
    pub field_fr: Option<String>,

    #[serde(default, rename = "field_en", skip_serializing_if = "Option::is_none")]
    pub field_en: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, rename = "description_fr", skip_serializing_if = "Option::is_none")]
    pub description_fr: Option<String>,

    #[serde(default, rename = "description_en", skip_serializing_if = "Option::is_none")]
    pub description_en: Option<String>,

    /// Grade or distinction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default, rename = "note_fr", skip_serializing_if = "Option::is_none")]
    pub note_fr: Option<String>,

    #[serde(default, rename = "note_en", skip_serializing_if = "Option::is_none")]
    pub note_en: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

localized_fields!(Education {
    "degree" => (degree, degree_fr, degree_en),
    "field" => (field, field_fr, field_en),
    "description" => (description, description_fr, description_en),
    "note" => (note, note_fr, note_en),
});

impl Content for Education {
    const KIND: ContentKind = ContentKind::Education;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut c = Checks::new();
        c.required("institution", &self.institution)
            .translated(self, "degree")
            .translated_max_len(self, "degree", TITLE_MAX)
            .translated_max_len(self, "field", TITLE_MAX)
            .translated_max_len(self, "description", TEXT_MAX)
            .date("startDate", self.start_date.as_deref())
            .date("endDate", self.end_date.as_deref());
        c.into_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{resolve_record, FallbackChain, Locale};

    #[test]
    fn resolves_all_four_fields() {
        let e = Education {
            institution: "Université".into(),
            degree_en: Some("MSc".into()),
            degree_fr: Some("Master".into()),
            field: Some("Informatique".into()),
            note_en: Some("With honours".into()),
            ..Education::default()
        };
        let out = resolve_record(
            &e,
            Education::KIND.localized_fields(),
            &FallbackChain::for_locale(Locale::En),
        );
        assert_eq!(out.degree.as_deref(), Some("MSc"));
        assert_eq!(out.field.as_deref(), Some("Informatique"));
        assert_eq!(out.note.as_deref(), Some("With honours"));
        assert_eq!(out.description, None);
        assert_eq!(out.institution, "Université");
    }

    #[test]
    fn degree_is_required() {
        let e = Education {
            institution: "École".into(),
            ..Education::default()
        };
        let errors = e.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "degree");
    }
}
