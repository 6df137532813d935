//! Content engine of a bilingual (fr/en) portfolio site.
//!
//! The web front-end talks to this crate through the line-oriented JSON
//! [`protocol`]; everything else (stores, localization, routing decisions,
//! SEO documents) is usable directly as a library.

pub mod app;
pub mod config;
pub mod error;
pub mod i18n;
pub mod model;
pub mod protocol;
pub mod services;
pub mod validate;

pub use app::App;
pub use config::Config;
pub use error::{CoreError, CoreResult};
