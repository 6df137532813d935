use serde::{Deserialize, Serialize};

use super::{Content, ContentKind, RecordMeta};
use crate::error::FieldError;
use crate::localized_fields;
use crate::validate::{Checks, TEXT_MAX, TITLE_MAX};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(flatten)]
    pub meta: RecordMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

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
    pub long_desc: Option<String>,

    #[serde(default, rename = "longDesc_fr", skip_serializing_if = "Option::is_none")]
    pub long_desc_fr: Option<String>,

    #[serde(default, rename = "longDesc_en", skip_serializing_if = "Option::is_none")]
    pub long_desc_en: Option<String>,

    #[serde(default)]
    pub technologies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_url: Option<String>,

    #[serde(default)]
    pub featured: bool,
}

localized_fields!(Project {
    "title" => (title, title_fr, title_en),
    "description" => (description, description_fr, description_en),
    "longDesc" => (long_desc, long_desc_fr, long_desc_en),
});

impl Project {
    /// Path segment used for the public detail page.
    pub fn path_key(&self) -> &str {
        match self.slug.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => &self.meta.id,
        }
    }
}

impl Content for Project {
    const KIND: ContentKind = ContentKind::Projects;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut c = Checks::new();
        c.translated(self, "title")
            .translated_max_len(self, "title", TITLE_MAX)
            .translated_max_len(self, "description", TEXT_MAX)
            .slug("slug", self.slug.as_deref())
            .http_url("imageUrl", self.image_url.as_deref())
            .http_url("githubUrl", self.github_url.as_deref())
            .http_url("demoUrl", self.demo_url.as_deref());
        c.into_errors()
    }

    fn conflict_with(&self, other: &Self) -> Option<FieldError> {
        match (self.slug.as_deref(), other.slug.as_deref()) {
            (Some(a), Some(b)) if !a.is_empty() && a == b => {
                Some(FieldError::new("slug", format!("{a:?} is already used")))
            }
            _ => None,
        }
    }
}
