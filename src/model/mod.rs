use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldError};
use crate::i18n::LocalizedRecord;

pub mod certification;
pub mod education;
pub mod experience;
pub mod message;
pub mod project;
pub mod volunteer;

pub use certification::Certification;
pub use education::Education;
pub use experience::Experience;
pub use message::{ContactForm, ContactMessage};
pub use project::Project;
pub use volunteer::Volunteer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Projects,
    Experiences,
    Education,
    Certifications,
    Volunteer,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Projects,
        ContentKind::Experiences,
        ContentKind::Education,
        ContentKind::Certifications,
        ContentKind::Volunteer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Projects => "projects",
            ContentKind::Experiences => "experiences",
            ContentKind::Education => "education",
            ContentKind::Certifications => "certifications",
            ContentKind::Volunteer => "volunteer",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        ContentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }

    /// Logical fields resolved per locale for this content type.
    pub fn localized_fields(self) -> &'static [&'static str] {
        match self {
            ContentKind::Projects => &["title", "description", "longDesc"],
            ContentKind::Experiences => &["title", "description", "achievements"],
            ContentKind::Education => &["degree", "field", "description", "note"],
            ContentKind::Certifications => &["title", "description"],
            ContentKind::Volunteer => &["title", "description"],
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs `$body` with `$T` bound to the record type of `$kind`.
#[macro_export]
macro_rules! with_content_type {
    ($kind:expr, $T:ident => $body:expr) => {
        match $kind {
            $crate::model::ContentKind::Projects => {
                type $T = $crate::model::Project;
                $body
            }
            $crate::model::ContentKind::Experiences => {
                type $T = $crate::model::Experience;
                $body
            }
            $crate::model::ContentKind::Education => {
                type $T = $crate::model::Education;
                $body
            }
            $crate::model::ContentKind::Certifications => {
                type $T = $crate::model::Certification;
                $body
            }
            $crate::model::ContentKind::Volunteer => {
                type $T = $crate::model::Volunteer;
                $body
            }
        }
    };
}

/// Bookkeeping shared by every stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub order: i32,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: String,
}

/// A content type managed from the admin dashboard.
pub trait Content: Serialize + DeserializeOwned + LocalizedRecord {
    const KIND: ContentKind;

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    fn validate(&self) -> Vec<FieldError>;

    /// Uniqueness violation against another stored record, if any.
    fn conflict_with(&self, _other: &Self) -> Option<FieldError> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_collection_names() {
        for kind in ContentKind::ALL {
            assert_eq!(ContentKind::parse(kind.as_str()).ok(), Some(kind));
        }
        assert!(matches!(
            ContentKind::parse("skills"),
            Err(CoreError::UnknownKind(_))
        ));
    }

    #[test]
    fn field_lists_match_content_types() {
        assert_eq!(
            ContentKind::Education.localized_fields(),
            &["degree", "field", "description", "note"]
        );
        assert!(ContentKind::Experiences
            .localized_fields()
            .contains(&"achievements"));
    }
}
