use crate::i18n::{Locale, LocalePriority};
use crate::model::Project;

const STATIC_PAGES: [(&str, &str, &str); 4] = [
    ("/", "monthly", "1.0"),
    ("/projects", "weekly", "0.9"),
    ("/experience", "monthly", "0.8"),
    ("/contact", "yearly", "0.5"),
];

pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn page_url(site_url: &str, locale: Locale, page: &str) -> String {
    let base = site_url.trim_end_matches('/');
    if page == "/" {
        format!("{base}/{locale}")
    } else {
        format!("{base}/{locale}{page}")
    }
}

struct Entry<'a> {
    page: &'a str,
    lastmod: &'a str,
    changefreq: &'a str,
    weight: &'a str,
}

fn push_url(out: &mut String, site_url: &str, priority: &LocalePriority, locale: Locale, e: &Entry) {
    let page = e.page;
    out.push_str("  <url>\n");
    out.push_str(&format!(
        "    <loc>{}</loc>\n",
        xml_escape(&page_url(site_url, locale, page))
    ));
    for alt in priority.locales() {
        out.push_str(&format!(
            "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>\n",
            alt,
            xml_escape(&page_url(site_url, *alt, page))
        ));
    }
    out.push_str(&format!(
        "    <xhtml:link rel=\"alternate\" hreflang=\"x-default\" href=\"{}\"/>\n",
        xml_escape(&page_url(site_url, priority.default_locale(), page))
    ));
    if !e.lastmod.is_empty() {
        out.push_str(&format!("    <lastmod>{}</lastmod>\n", xml_escape(e.lastmod)));
    }
    out.push_str(&format!("    <changefreq>{}</changefreq>\n", e.changefreq));
    out.push_str(&format!("    <priority>{}</priority>\n", e.weight));
    out.push_str("  </url>\n");
}

/// `sitemap.xml` covering every public page in every locale.
pub fn sitemap(site_url: &str, priority: &LocalePriority, projects: &[Project], now: &str) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(
        "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );

    for (page, changefreq, weight) in STATIC_PAGES {
        let entry = Entry {
            page,
            lastmod: now,
            changefreq,
            weight,
        };
        for locale in priority.locales() {
            push_url(&mut out, site_url, priority, *locale, &entry);
        }
    }

    for p in projects {
        let key = p.path_key();
        if key.trim().is_empty() {
            continue;
        }
        let page = format!("/projects/{key}");
        let lastmod = if p.meta.updated_at.is_empty() {
            now
        } else {
            p.meta.updated_at.as_str()
        };
        let entry = Entry {
            page: &page,
            lastmod,
            changefreq: "monthly",
            weight: "0.7",
        };
        for locale in priority.locales() {
            push_url(&mut out, site_url, priority, *locale, &entry);
        }
    }

    out.push_str("</urlset>\n");
    out
}

pub fn robots(site_url: &str) -> String {
    let base = site_url.trim_end_matches('/');
    format!(
        "User-agent: *\n\
         Allow: /\n\
         Disallow: /admin\n\
         Disallow: /*/admin\n\
         Disallow: /api\n\
         \n\
         Sitemap: {base}/sitemap.xml\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: &str, slug: Option<&str>, updated: &str) -> Project {
        let mut p = Project {
            slug: slug.map(str::to_string),
            ..Project::default()
        };
        p.meta.id = id.to_string();
        p.meta.updated_at = updated.to_string();
        p
    }

    #[test]
    fn sitemap_lists_pages_per_locale_with_alternates() {
        let xml = sitemap(
            "https://jane.dev/",
            &LocalePriority::default(),
            &[project("p1", Some("shop"), "2024-02-01T00:00:00.000Z")],
            "2024-03-01T00:00:00.000Z",
        );

        assert_eq!(xml.matches("<url>").count(), 10);
        assert!(xml.contains("<loc>https://jane.dev/fr</loc>"));
        assert!(xml.contains("<loc>https://jane.dev/en/contact</loc>"));
        assert!(xml.contains("<loc>https://jane.dev/en/projects/shop</loc>"));
        assert!(xml.contains("<lastmod>2024-02-01T00:00:00.000Z</lastmod>"));
        assert!(xml.contains(
            "hreflang=\"x-default\" href=\"https://jane.dev/fr/projects/shop\""
        ));
    }

    #[test]
    fn sitemap_escapes_and_falls_back_to_id() {
        let xml = sitemap(
            "https://jane.dev",
            &LocalePriority::default(),
            &[project("a&b", None, "")],
            "now",
        );
        assert!(xml.contains("/projects/a&amp;b</loc>"));
        assert!(!xml.contains("a&b"));
    }

    #[test]
    fn robots_blocks_admin_and_api() {
        let txt = robots("https://jane.dev/");
        assert!(txt.contains("Disallow: /admin\n"));
        assert!(txt.contains("Disallow: /*/admin\n"));
        assert!(txt.contains("Disallow: /api\n"));
        assert!(txt.ends_with("Sitemap: https://jane.dev/sitemap.xml\n"));
    }
}
