use serde::{Deserialize, Serialize};

use super::{Content, ContentKind, RecordMeta};
use crate::error::FieldError;
use crate::localized_fields;
use crate::validate::{Checks, TEXT_MAX, TITLE_MAX};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    #[serde(flatten)]
    pub meta: RecordMeta,

    #[serde(default)]
    pub issuer: String,

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
    pub issue_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_url: Option<String>,
}

localized_fields!(Certification {
    "title" => (title, title_fr, title_en),
    "description" => (description, description_fr, description_en),
});

impl Content for Certification {
    const KIND: ContentKind = ContentKind::Certifications;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut c = Checks::new();
        c.required("issuer", &self.issuer)
            .translated(self, "title")
            .translated_max_len(self, "title", TITLE_MAX)
            .translated_max_len(self, "description", TEXT_MAX)
            .date("issueDate", self.issue_date.as_deref())
            .date("expiryDate", self.expiry_date.as_deref())
            .http_url("credentialUrl", self.credential_url.as_deref());
        c.into_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_url_must_be_http() {
        let c = Certification {
            issuer: "AWS".into(),
            title: Some("Solutions Architect".into()),
            credential_url: Some("javascript:alert(1)".into()),
            ..Certification::default()
        };
        let errors = c.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "credentialUrl");
    }
}
