pub mod analytics;
pub mod backup;
pub mod contact;
pub mod content;
pub mod notify;
pub mod routing;
pub mod seo;
pub mod storage;
