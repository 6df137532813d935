//! Locale handling and resolution of per-language content fields.
//!
//! Translatable content stores each logical field up to three times:
//! `{name}_fr`, `{name}_en` and the legacy unsuffixed `{name}`. The resolver
//! walks a [`FallbackChain`] and returns the first non-empty variant.

pub mod locale;
pub mod resolver;

pub use locale::{negotiate, FallbackChain, Locale, LocalePriority, Slot};
pub use resolver::{
    resolve_collection, resolve_field, resolve_record, FieldRef, FieldValue, LocalizedRecord,
    LocalizedSource, SlotValue,
};
