//! HTML pages: homepage index, post pages and standalone pages.
//!
//! All pages share one layout. The homepage sits at the output root, posts
//! and pages one level down, which only changes the relative link prefix.

use super::{fill_template, write_output};
use crate::{
    config::{SiteConfig, paths::INDEX_FILE},
    content::{Page, Post},
    utils::{
        date,
        html::{encode_href, escape},
    },
};
use anyhow::Result;
use chrono::Datelike;
use rayon::prelude::*;
use std::path::Path;

const LAYOUT_TEMPLATE: &str = include_str!("../embed/layout.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    Root,
    Nested,
}

impl Depth {
    /// Prefix for links to root-level files (`style.css`, `feed.xml`).
    const fn prefix(self) -> &'static str {
        match self {
            Self::Root => "",
            Self::Nested => "../",
        }
    }

    const fn home(self) -> &'static str {
        match self {
            Self::Root => "./",
            Self::Nested => "../",
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Homepage: description, then posts grouped under one `<h2>` per year.
///
/// `posts` must already be newest first; a new year section opens each time
/// the year changes while walking the list.
pub fn render_index(config: &SiteConfig, posts: &[Post], pages: &[Page]) -> String {
    let mut main = String::new();

    if !config.description.is_empty() {
        main.push_str(&format!(
            "        <div style=\"margin-bottom: 2rem;\">\n            <p>{}</p>\n        </div>\n\n",
            escape(&config.description)
        ));
    }
    main.push_str("        <hr>\n");

    let mut current_year = None;
    for post in posts {
        let year = post.date.year();
        if current_year != Some(year) {
            if current_year.is_some() {
                main.push_str("        </ul>\n");
            }
            main.push_str(&format!(
                "\n        <h2>{year}</h2>\n        <ul class=\"site-list-of-posts\">\n"
            ));
            current_year = Some(year);
        }
        main.push_str(&format!(
            "            <li>\n                <time>{}</time>\n                <div class=\"post-link\"><a href=\"{}\">{}</a></div>\n            </li>\n",
            date::format_compact(&post.date),
            encode_href(&post.url),
            escape(&post.title),
        ));
    }
    if current_year.is_some() {
        main.push_str("        </ul>\n");
    }

    render_layout(config, pages, Depth::Root, &config.title, main.trim_end())
}

pub fn render_post(config: &SiteConfig, post: &Post, pages: &[Page]) -> String {
    let main = format!(
        "        <h1>{}</h1>\n        <div class=\"post-date\">{}</div>\n        <div class=\"post-content\">\n{}\n        </div>",
        escape(&post.title),
        date::format_long(&post.date),
        post.body.trim_end(),
    );
    let title = format!("{} - {}", post.title, config.title);
    render_layout(config, pages, Depth::Nested, &title, &main)
}

pub fn render_page(config: &SiteConfig, page: &Page, pages: &[Page]) -> String {
    let title = format!("{} - {}", page.title, config.title);
    render_layout(config, pages, Depth::Nested, &title, page.body.trim_end())
}

fn render_layout(config: &SiteConfig, pages: &[Page], depth: Depth, title: &str, main: &str) -> String {
    let title = escape(title);
    let site_title = escape(&config.title);
    let nav = render_nav(pages, depth);
    let socials = render_socials(config);

    fill_template(
        LAYOUT_TEMPLATE,
        &[
            ("title", title.as_str()),
            ("root", depth.prefix()),
            ("home", depth.home()),
            ("site_title", site_title.as_str()),
            ("nav", nav.as_str()),
            ("socials", socials.as_str()),
            ("main", main),
        ],
    )
}

/// Navigation links. Nested pages get an extra `Home` link first.
fn render_nav(pages: &[Page], depth: Depth) -> String {
    let mut nav = String::new();
    if depth == Depth::Nested {
        nav.push_str("\n                <a href=\"../\">Home</a>");
    }
    for page in pages {
        nav.push_str(&format!(
            "\n                <a href=\"{}{}\">{}</a>",
            depth.prefix(),
            encode_href(&page.url),
            escape(&page.title)
        ));
    }
    nav
}

/// Footer social links, in platform name order.
fn render_socials(config: &SiteConfig) -> String {
    if config.socials.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n            | Connect with us:");
    for (platform, url) in &config.socials {
        out.push_str(&format!(
            "\n            <a href=\"{}\">{}</a>",
            escape(url),
            escape(platform)
        ));
    }
    out
}

// ============================================================================
// Writing
// ============================================================================

pub fn write_index(config: &SiteConfig, posts: &[Post], pages: &[Page], out_dir: &Path) -> Result<()> {
    write_output(&out_dir.join(INDEX_FILE), &render_index(config, posts, pages))
}

pub fn write_posts(config: &SiteConfig, posts: &[Post], pages: &[Page], out_dir: &Path) -> Result<()> {
    posts
        .par_iter()
        .try_for_each(|post| write_output(&out_dir.join(&post.url), &render_post(config, post, pages)))
}

pub fn write_pages(config: &SiteConfig, pages: &[Page], out_dir: &Path) -> Result<()> {
    pages
        .par_iter()
        .try_for_each(|page| write_output(&out_dir.join(&page.url), &render_page(config, page, pages)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn post(title: &str, date: DateTime<Utc>) -> Post {
        Post {
            title: title.into(),
            date,
            body: format!("<p>{title} body</p>\n"),
            source: format!("{title}.md"),
            url: format!("posts/{title}.html"),
        }
    }

    fn page(title: &str) -> Page {
        Page {
            title: title.into(),
            body: format!("<h1>{title}</h1>"),
            source: format!("{title}.md"),
            url: format!("pages/{title}.html"),
        }
    }

    #[test]
    fn test_index_groups_by_year() {
        let config = SiteConfig::default();
        let posts = [
            post("First Steps", at(2025, 7, 1)),
            post("Design Ideas", at(2025, 6, 20)),
            post("Old News", at(2023, 12, 25)),
        ];
        let html = render_index(&config, &posts, &[]);

        assert_eq!(html.matches("<h2>2025</h2>").count(), 1);
        assert_eq!(html.matches("<h2>2023</h2>").count(), 1);
        assert_eq!(
            html.matches("<ul class=\"site-list-of-posts\">").count(),
            html.matches("</ul>").count()
        );

        let y2025 = html.find("<h2>2025</h2>").unwrap();
        let y2023 = html.find("<h2>2023</h2>").unwrap();
        let first = html.find("First Steps</a>").unwrap();
        let old = html.find("Old News</a>").unwrap();
        assert!(y2025 < first && first < y2023 && y2023 < old);

        assert!(html.contains("<time>1 Jul</time>"));
        assert!(html.contains(r#"<a href="posts/First%20Steps.html">First Steps</a>"#));
    }

    #[test]
    fn test_index_without_posts_has_no_year_section() {
        let html = render_index(&SiteConfig::default(), &[], &[]);
        assert!(!html.contains("site-list-of-posts"));
        assert!(!html.contains("<h2>2"));
        assert!(html.contains("<hr>"));
    }

    #[test]
    fn test_index_description_and_nav() {
        let config = SiteConfig {
            title: "Tom & Jerry".into(),
            description: String::new(),
            ..Default::default()
        };
        let html = render_index(&config, &[], &[page("about")]);

        assert!(html.contains("<title>Tom &amp; Jerry</title>"));
        assert!(!html.contains("margin-bottom: 2rem"));
        assert!(html.contains(r#"<a href="pages/about.html">about</a>"#));
        assert!(!html.contains(">Home</a>"));
        assert!(html.contains(r#"href="style.css""#));
    }

    #[test]
    fn test_post_page() {
        let mut config = SiteConfig::default();
        config.title = "Blog".into();
        let html = render_post(&config, &post("First Steps", at(2025, 7, 1)), &[page("about")]);

        assert!(html.contains("<title>First Steps - Blog</title>"));
        assert!(html.contains("<h1>First Steps</h1>"));
        assert!(html.contains("<div class=\"post-date\">July 1, 2025</div>"));
        assert!(html.contains("<p>First Steps body</p>"));
        assert!(html.contains(r#"<a href="../">Home</a>"#));
        assert!(html.contains(r#"<a href="../pages/about.html">about</a>"#));
        assert!(html.contains(r#"href="../style.css""#));
    }

    #[test]
    fn test_page_uses_body_verbatim() {
        let config = SiteConfig::default();
        let about = page("about");
        let html = render_page(&config, &about, std::slice::from_ref(&about));
        assert!(html.contains("<main class=\"site-main\">\n<h1>about</h1>\n    </main>"));
    }

    #[test]
    fn test_footer_socials() {
        let mut config = SiteConfig::default();
        assert!(!render_index(&config, &[], &[]).contains("Connect with us"));

        config.set_social("twitter", "https://twitter.com/me");
        config.set_social("github", "https://github.com/me");
        let html = render_index(&config, &[], &[]);

        assert!(html.contains("| Connect with us:"));
        let github = html.find(">github</a>").unwrap();
        let twitter = html.find(">twitter</a>").unwrap();
        assert!(github < twitter);
    }
}
