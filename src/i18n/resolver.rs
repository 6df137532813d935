use serde::Serialize;
use serde_json::{Map, Value};

use super::locale::{FallbackChain, Slot};

/// A resolved translatable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(v) => v.is_empty(),
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s),
            FieldValue::List(v) => Value::Array(v.into_iter().map(Value::String).collect()),
        }
    }
}

/// Borrowed view of one physical slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Text(&'a str),
    List(Vec<&'a str>),
}

impl FieldRef<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldRef::Text(s) => s.trim().is_empty(),
            FieldRef::List(v) => v.is_empty(),
        }
    }

    pub fn to_value(&self) -> FieldValue {
        match self {
            FieldRef::Text(s) => FieldValue::Text((*s).to_string()),
            FieldRef::List(v) => FieldValue::List(v.iter().map(|s| (*s).to_string()).collect()),
        }
    }
}

/// Read access to the physical variants of logical fields.
pub trait LocalizedSource {
    fn field(&self, name: &str, slot: Slot) -> Option<FieldRef<'_>>;
}

/// A record whose logical fields can be overwritten with resolved values.
pub trait LocalizedRecord: LocalizedSource + Clone {
    fn assign(&mut self, name: &str, value: FieldValue);
}

/// Storage for one physical variant in a typed record.
pub trait SlotValue {
    fn field_ref(&self) -> Option<FieldRef<'_>>;
    fn store(&mut self, value: FieldValue);
}

impl SlotValue for Option<String> {
    fn field_ref(&self) -> Option<FieldRef<'_>> {
        self.as_deref().map(FieldRef::Text)
    }

    fn store(&mut self, value: FieldValue) {
        if let FieldValue::Text(s) = value {
            *self = Some(s);
        }
    }
}

impl SlotValue for Vec<String> {
    fn field_ref(&self) -> Option<FieldRef<'_>> {
        Some(FieldRef::List(self.iter().map(String::as_str).collect()))
    }

    fn store(&mut self, value: FieldValue) {
        if let FieldValue::List(v) = value {
            *self = v;
        }
    }
}

/// Builds the logical-name lookup table of a typed record: each entry maps a
/// field name to its legacy, French and English members.
#[macro_export]
macro_rules! localized_fields {
    ($ty:ty { $($name:literal => ($legacy:ident, $fr:ident, $en:ident)),+ $(,)? }) => {
        impl $crate::i18n::LocalizedSource for $ty {
            fn field(
                &self,
                name: &str,
                slot: $crate::i18n::Slot,
            ) -> Option<$crate::i18n::FieldRef<'_>> {
                use $crate::i18n::{Locale, Slot, SlotValue};
                let value: &dyn SlotValue = match (name, slot) {
                    $(
                        ($name, Slot::Legacy) => &self.$legacy,
                        ($name, Slot::Lang(Locale::Fr)) => &self.$fr,
                        ($name, Slot::Lang(Locale::En)) => &self.$en,
                    )+
                    _ => return None,
                };
                value.field_ref()
            }
        }

        impl $crate::i18n::LocalizedRecord for $ty {
            fn assign(&mut self, name: &str, value: $crate::i18n::FieldValue) {
                use $crate::i18n::SlotValue;
                match name {
                    $($name => self.$legacy.store(value),)+
                    _ => {}
                }
            }
        }
    };
}

fn slot_key(name: &str, slot: Slot) -> String {
    match slot {
        Slot::Lang(l) => format!("{name}_{l}"),
        Slot::Legacy => name.to_string(),
    }
}

impl LocalizedSource for Map<String, Value> {
    fn field(&self, name: &str, slot: Slot) -> Option<FieldRef<'_>> {
        match self.get(&slot_key(name, slot))? {
            Value::String(s) => Some(FieldRef::Text(s)),
            Value::Array(items) => items
                .iter()
                .map(Value::as_str)
                .collect::<Option<Vec<&str>>>()
                .map(FieldRef::List),
            _ => None,
        }
    }
}

impl LocalizedRecord for Map<String, Value> {
    fn assign(&mut self, name: &str, value: FieldValue) {
        self.insert(name.to_string(), value.into_json());
    }
}

/// First non-empty slot along `chain`, or `None` when every slot is empty or
/// absent.
pub fn resolve_field<R>(record: &R, field: &str, chain: &FallbackChain) -> Option<FieldValue>
where
    R: LocalizedSource + ?Sized,
{
    chain
        .slots()
        .iter()
        .filter_map(|slot| record.field(field, *slot))
        .find(|v| !v.is_empty())
        .map(|v| v.to_value())
}

pub fn resolve_record<R: LocalizedRecord>(record: &R, fields: &[&str], chain: &FallbackChain) -> R {
    let mut out = record.clone();
    for field in fields {
        if let Some(value) = resolve_field(record, field, chain) {
            out.assign(field, value);
        }
    }
    out
}

pub fn resolve_collection<R: LocalizedRecord>(
    records: &[R],
    fields: &[&str],
    chain: &FallbackChain,
) -> Vec<R> {
    records
        .iter()
        .map(|r| resolve_record(r, fields, chain))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use serde_json::json;

    fn record(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("test record must be an object"),
        }
    }

    fn text(s: &str) -> Option<FieldValue> {
        Some(FieldValue::Text(s.to_string()))
    }

    #[test]
    fn requested_language_wins() {
        let r = record(json!({ "title_fr": "Bonjour", "title_en": "Hello", "title": "Legacy" }));
        assert_eq!(resolve_field(&r, "title", &FallbackChain::for_locale(Locale::En)), text("Hello"));
        assert_eq!(resolve_field(&r, "title", &FallbackChain::for_locale(Locale::Fr)), text("Bonjour"));
    }

    #[test]
    fn falls_back_to_other_language() {
        let r = record(json!({ "title_fr": "Bonjour", "title_en": "", "title": "Legacy" }));
        assert_eq!(resolve_field(&r, "title", &FallbackChain::for_locale(Locale::En)), text("Bonjour"));

        let r = record(json!({ "title_fr": "   ", "title_en": "Hello" }));
        assert_eq!(resolve_field(&r, "title", &FallbackChain::for_locale(Locale::Fr)), text("Hello"));
    }

    #[test]
    fn falls_back_to_legacy() {
        let r = record(json!({ "title_fr": "", "title_en": "", "title": "Legacy" }));
        assert_eq!(resolve_field(&r, "title", &FallbackChain::for_locale(Locale::Fr)), text("Legacy"));
    }

    #[test]
    fn sequences_use_length_for_emptiness() {
        let r = record(json!({
            "achievements_fr": [],
            "achievements_en": ["Shipped v1"],
            "achievements": []
        }));
        assert_eq!(
            resolve_field(&r, "achievements", &FallbackChain::for_locale(Locale::Fr)),
            Some(FieldValue::List(vec!["Shipped v1".to_string()]))
        );
    }

    #[test]
    fn missing_everywhere_is_no_value() {
        let r = record(json!({ "id": "p1" }));
        assert_eq!(resolve_field(&r, "title", &FallbackChain::for_locale(Locale::En)), None);

        let r = record(json!({ "title_fr": null, "title_en": 3, "title": ["a", 1] }));
        assert_eq!(resolve_field(&r, "title", &FallbackChain::for_locale(Locale::En)), None);
    }

    #[test]
    fn record_resolution_keeps_other_keys_and_order() {
        let r = record(json!({
            "id": "p1",
            "title": "Legacy",
            "title_fr": "Titre",
            "featured": true,
            "description": "kept as is"
        }));
        let chain = FallbackChain::for_locale(Locale::En);
        let out = resolve_record(&r, &["title", "description", "longDesc"], &chain);

        assert_eq!(out["title"], json!("Titre"));
        assert_eq!(out["description"], json!("kept as is"));
        assert_eq!(out["featured"], json!(true));
        assert!(!out.contains_key("longDesc"));
        assert_eq!(
            out.keys().collect::<Vec<_>>(),
            vec!["id", "title", "title_fr", "featured", "description"]
        );
        // source untouched
        assert_eq!(r["title"], json!("Legacy"));
    }

    #[test]
    fn unresolved_field_keeps_original_value() {
        let r = record(json!({ "note": "", "note_fr": "", "note_en": "  " }));
        let out = resolve_record(&r, &["note"], &FallbackChain::for_locale(Locale::Fr));
        assert_eq!(out["note"], json!(""));
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = record(json!({ "title_en": "Hello", "title": "Legacy" }));
        let chain = FallbackChain::for_locale(Locale::Fr);
        let once = resolve_record(&r, &["title"], &chain);
        let twice = resolve_record(&r, &["title"], &chain);
        assert_eq!(once, twice);
        assert_eq!(resolve_record(&once, &["title"], &chain), once);
    }

    #[test]
    fn collection_keeps_length_and_order() {
        let records = vec![
            record(json!({ "id": 1, "title_fr": "Un" })),
            record(json!({ "id": 2 })),
            record(json!({ "id": 3, "title": "Trois" })),
        ];
        let out = resolve_collection(&records, &["title"], &FallbackChain::for_locale(Locale::En));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["title"], json!("Un"));
        assert!(!out[1].contains_key("title"));
        assert_eq!(out[2]["title"], json!("Trois"));
        assert_eq!(out[2]["id"], json!(3));
    }
}
