use serde::{Deserialize, Serialize};

use crate::i18n::Locale;

/// A message left through the public contact form.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: String,

    pub name: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<Locale>,

    #[serde(default)]
    pub read: bool,

    #[serde(default)]
    pub created_at: String,
}

/// Raw contact form submission.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub subject: Option<String>,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub locale: Option<String>,

    /// Honeypot, left empty by humans.
    #[serde(default)]
    pub website: Option<String>,
}
