use serde::{Deserialize, Serialize};

use crate::i18n::{negotiate, Locale, LocalePriority};

const BYPASS_PREFIXES: [&str; 3] = ["/api", "/_next", "/static"];
const ADMIN_ROOT: &str = "/admin";
const ADMIN_LOGIN: &str = "/admin/login";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub path: String,

    #[serde(default)]
    pub locale_cookie: Option<String>,

    #[serde(default)]
    pub accept_language: Option<String>,

    #[serde(default)]
    pub authenticated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RouteDecision {
    Next {
        #[serde(skip_serializing_if = "Option::is_none")]
        locale: Option<Locale>,
    },
    Rewrite {
        path: String,
        locale: Locale,
    },
    Redirect {
        location: String,
        locale: Locale,
    },
}

fn is_bypassed(path: &str) -> bool {
    let under = |prefix: &str| {
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    };
    if BYPASS_PREFIXES.iter().any(|&p| under(p)) {
        return true;
    }
    path.rsplit('/').next().is_some_and(|last| last.contains('.'))
}

/// Splits a leading locale segment off `path`. The remainder always starts
/// with `/`.
fn split_locale(path: &str) -> (Option<Locale>, String) {
    let trimmed = path.trim_start_matches('/');
    let (first, rest) = match trimmed.split_once('/') {
        Some((f, r)) => (f, format!("/{r}")),
        None => (trimmed, "/".to_string()),
    };

    match Locale::ALL.into_iter().find(|l| l.as_str() == first) {
        Some(l) => (Some(l), rest),
        None => (None, format!("/{trimmed}")),
    }
}

fn is_under(path: &str, root: &str) -> bool {
    let path = path.trim_end_matches('/');
    path == root
        || path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn localized(locale: Locale, rest: &str) -> String {
    if rest == "/" {
        format!("/{locale}")
    } else {
        format!("/{locale}{rest}")
    }
}

fn login_location(locale: Locale, callback: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("callbackUrl", callback)
        .finish();
    format!("/{locale}{ADMIN_LOGIN}?{query}")
}

/// Decides how an incoming page request is routed.
pub fn decide(req: &RouteRequest, priority: &LocalePriority) -> RouteDecision {
    let path = if req.path.starts_with('/') {
        req.path.clone()
    } else {
        format!("/{}", req.path)
    };

    if is_bypassed(&path) {
        return RouteDecision::Next { locale: None };
    }

    let (prefix, rest) = split_locale(&path);

    let locale = prefix
        .or_else(|| {
            req.locale_cookie
                .as_deref()
                .and_then(Locale::parse)
                .filter(|l| priority.locales().contains(l))
        })
        .or_else(|| {
            req.accept_language
                .as_deref()
                .and_then(|h| negotiate(h, priority))
        })
        .unwrap_or_else(|| priority.default_locale());

    if is_under(&rest, ADMIN_ROOT) {
        let on_login = is_under(&rest, ADMIN_LOGIN);
        if !req.authenticated && !on_login {
            return RouteDecision::Redirect {
                location: login_location(locale, &path),
                locale,
            };
        }
        if req.authenticated && on_login {
            return RouteDecision::Redirect {
                location: localized(locale, ADMIN_ROOT),
                locale,
            };
        }
    }

    if prefix.is_none() {
        return RouteDecision::Rewrite {
            path: localized(locale, &rest),
            locale,
        };
    }

    RouteDecision::Next {
        locale: Some(locale),
    }
}
