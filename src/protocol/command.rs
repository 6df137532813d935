#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    ContentList,
    ContentGet,
    ContentCreate,
    ContentUpdate,
    ContentDelete,
    ContentReorder,
    LocalizeRecord,
    LocalizeCollection,
    ContactSubmit,
    ContactList,
    ContactMarkRead,
    ContactDelete,
    RouteResolve,
    SeoSitemap,
    SeoRobots,
    AnalyticsTrack,
    AnalyticsSummary,
    AdminStats,
    BackupExport,
    BackupList,
    BackupRestore,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "content.list" => Command::ContentList,
            "content.get" => Command::ContentGet,
            "content.create" => Command::ContentCreate,
            "content.update" => Command::ContentUpdate,
            "content.delete" => Command::ContentDelete,
            "content.reorder" => Command::ContentReorder,
            "localize.record" => Command::LocalizeRecord,
            "localize.collection" => Command::LocalizeCollection,
            "contact.submit" => Command::ContactSubmit,
            "contact.list" => Command::ContactList,
            "contact.mark_read" => Command::ContactMarkRead,
            "contact.delete" => Command::ContactDelete,
            "route.resolve" => Command::RouteResolve,
            "seo.sitemap" => Command::SeoSitemap,
            "seo.robots" => Command::SeoRobots,
            "analytics.track" => Command::AnalyticsTrack,
            "analytics.summary" => Command::AnalyticsSummary,
            "admin.stats" => Command::AdminStats,
            "backup.export" => Command::BackupExport,
            "backup.list" => Command::BackupList,
            "backup.restore" => Command::BackupRestore,
            _ => Command::Unknown,
        }
    }
}
