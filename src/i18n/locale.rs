use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Fr,
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Fr, Locale::En];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Fr => "fr",
            Locale::En => "en",
        }
    }

    /// Accepts bare codes and region-qualified tags (`fr-CA`, `en_US`),
    /// matching on the primary subtag only.
    pub fn parse(tag: &str) -> Option<Locale> {
        let tag = tag.trim().replace('_', "-");
        let primary = tag.split('-').next().unwrap_or("");
        match primary.to_ascii_lowercase().as_str() {
            "fr" => Some(Locale::Fr),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s).ok_or_else(|| CoreError::UnsupportedLocale(s.to_string()))
    }
}

/// One physical variant of a logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Lang(Locale),
    Legacy,
}

/// Ordered list of slots to try when resolving a field. Always ends in
/// [`Slot::Legacy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackChain {
    slots: Vec<Slot>,
}

impl FallbackChain {
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Chain for `requested` under the default site priority.
    pub fn for_locale(requested: Locale) -> Self {
        LocalePriority::default().chain_for(requested)
    }
}

/// Site-wide locale order. The first entry is the default locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalePriority {
    order: Vec<Locale>,
}

impl LocalePriority {
    pub fn new(order: impl IntoIterator<Item = Locale>) -> Self {
        let mut out: Vec<Locale> = Vec::with_capacity(Locale::ALL.len());
        for l in order.into_iter().chain(Locale::ALL) {
            if !out.contains(&l) {
                out.push(l);
            }
        }
        LocalePriority { order: out }
    }

    pub fn default_locale(&self) -> Locale {
        self.order[0]
    }

    pub fn locales(&self) -> &[Locale] {
        &self.order
    }

    pub fn chain_for(&self, requested: Locale) -> FallbackChain {
        let mut slots = Vec::with_capacity(self.order.len() + 1);
        slots.push(Slot::Lang(requested));
        slots.extend(
            self.order
                .iter()
                .filter(|l| **l != requested)
                .map(|l| Slot::Lang(*l)),
        );
        slots.push(Slot::Legacy);
        FallbackChain { slots }
    }
}

impl Default for LocalePriority {
    fn default() -> Self {
        LocalePriority::new(Locale::ALL)
    }
}

/// Picks the best supported locale from an `Accept-Language` header.
pub fn negotiate(accept_language: &str, priority: &LocalePriority) -> Option<Locale> {
    let mut ranked: Vec<(f32, usize, Locale)> = Vec::new();

    for (pos, part) in accept_language.split(',').enumerate() {
        let mut pieces = part.split(';');
        let tag = pieces.next().unwrap_or("").trim();

        let mut q = 1.0_f32;
        for param in pieces {
            if let Some(v) = param.trim().strip_prefix("q=") {
                q = v
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|q| q.is_finite())
                    .map(|q| q.clamp(0.0, 1.0))
                    .unwrap_or(1.0);
            }
        }

        if q <= 0.0 {
            continue;
        }

        if let Some(l) = Locale::parse(tag) {
            if priority.locales().contains(&l) {
                ranked.push((q, pos, l));
            }
        }
    }

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.first().map(|(_, _, l)| *l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_tags_and_case() {
        assert_eq!(Locale::parse("FR"), Some(Locale::Fr));
        assert_eq!(Locale::parse("en_US"), Some(Locale::En));
        assert_eq!(Locale::parse(" fr-CA "), Some(Locale::Fr));
        assert_eq!(Locale::parse("de"), None);
        assert_eq!(Locale::parse(""), None);
        assert!("es".parse::<Locale>().is_err());
    }

    #[test]
    fn chain_puts_requested_first_and_legacy_last() {
        let chain = FallbackChain::for_locale(Locale::En);
        assert_eq!(
            chain.slots(),
            &[Slot::Lang(Locale::En), Slot::Lang(Locale::Fr), Slot::Legacy]
        );

        let chain = FallbackChain::for_locale(Locale::Fr);
        assert_eq!(
            chain.slots(),
            &[Slot::Lang(Locale::Fr), Slot::Lang(Locale::En), Slot::Legacy]
        );
    }

    #[test]
    fn priority_dedups_and_fills_missing_locales() {
        let p = LocalePriority::new([Locale::En, Locale::En]);
        assert_eq!(p.locales(), &[Locale::En, Locale::Fr]);
        assert_eq!(p.default_locale(), Locale::En);

        let empty = LocalePriority::new(Vec::new());
        assert_eq!(empty.default_locale(), Locale::Fr);
    }

    #[test]
    fn negotiate_honours_quality_values() {
        let p = LocalePriority::default();
        assert_eq!(negotiate("en-US,en;q=0.9,fr;q=0.8", &p), Some(Locale::En));
        assert_eq!(negotiate("de-DE, fr;q=0.5, en;q=0.7", &p), Some(Locale::En));
        assert_eq!(negotiate("en;q=0, fr;q=0.1", &p), Some(Locale::Fr));
        assert_eq!(negotiate("de, it", &p), None);
        assert_eq!(negotiate("", &p), None);
    }

    #[test]
    fn negotiate_keeps_header_order_on_ties() {
        let p = LocalePriority::default();
        assert_eq!(negotiate("en, fr", &p), Some(Locale::En));
        assert_eq!(negotiate("fr;q=bogus, en", &p), Some(Locale::Fr));
    }

    #[test]
    fn negotiate_bounds_quality_values() {
        let p = LocalePriority::default();
        assert_eq!(negotiate("fr;q=1, en;q=NaN", &p), Some(Locale::Fr));
        assert_eq!(negotiate("fr;q=1, en;q=5", &p), Some(Locale::Fr));
        assert_eq!(negotiate("fr;q=inf, en", &p), Some(Locale::Fr));
        assert_eq!(negotiate("fr;q=-2, en;q=0.3", &p), Some(Locale::En));
    }
}
