use serde::{Deserialize, Serialize};

use super::{Content, ContentKind, RecordMeta};
use crate::error::FieldError;
use crate::localized_fields;
use crate::validate::{Checks, TEXT_MAX, TITLE_MAX};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    #[serde(flatten)]
    pub meta: RecordMeta,

    #[serde(default)]
    pub organization: String,

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

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

localized_fields!(Volunteer {
    "title" => (title, title_fr, title_en),
    "description" => (description, description_fr, description_en),
});

impl Content for Volunteer {
    const KIND: ContentKind = ContentKind::Volunteer;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut c = Checks::new();
        c.required("organization", &self.organization)
            .translated(self, "title")
            .translated_max_len(self, "title", TITLE_MAX)
            .translated_max_len(self, "description", TEXT_MAX)
            .date("startDate", self.start_date.as_deref())
            .date("endDate", self.end_date.as_deref());
        c.into_errors()
    }
}
