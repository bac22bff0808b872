//! RSS 2.0 feed of all posts, newest first.

use super::write_output;
use crate::{
    config::{SiteConfig, paths::FEED_FILE},
    content::Post,
    log,
    utils::{date, html::encode_href},
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rss::{
    ChannelBuilder, GuidBuilder, Item, ItemBuilder,
    extension::atom::{AtomExtensionBuilder, Link},
    validation::Validate,
};
use std::path::Path;

const GENERATOR: &str = "Bazel Static Site Generator";
const LANGUAGE: &str = "en-us";

/// Render the feed XML. `build_time` becomes `lastBuildDate`.
pub fn render_feed(config: &SiteConfig, posts: &[Post], build_time: DateTime<Utc>) -> String {
    let base_url = config.base_url.trim_end_matches('/');

    let mut self_link = Link::default();
    self_link.set_href(format!("{base_url}/{FEED_FILE}"));
    self_link.set_rel("self");
    self_link.set_mime_type(Some("application/rss+xml".to_owned()));

    let items: Vec<Item> = posts.iter().map(|post| post_to_item(post, base_url)).collect();

    let channel = ChannelBuilder::default()
        .title(&config.title)
        .link(base_url)
        .description(&config.description)
        .language(LANGUAGE.to_owned())
        .last_build_date(date::format_rfc822(&build_time))
        .generator(GENERATOR.to_owned())
        .atom_ext(AtomExtensionBuilder::default().links(vec![self_link]).build())
        .items(items)
        .build();

    if let Err(err) = channel.validate() {
        log!("warn"; "feed validation: {err}");
    }
    channel.to_string()
}

pub fn write_feed(config: &SiteConfig, posts: &[Post], build_time: DateTime<Utc>, out_dir: &Path) -> Result<()> {
    write_output(&out_dir.join(FEED_FILE), &render_feed(config, posts, build_time))
}

fn post_to_item(post: &Post, base_url: &str) -> Item {
    let link = format!("{base_url}/{}", encode_href(&post.url));

    ItemBuilder::default()
        .title(post.title.clone())
        .description(post.body.clone())
        .link(link.clone())
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .pub_date(date::format_rfc822(&post.date))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(title: &str, y: i32, m: u32, d: u32) -> Post {
        Post {
            title: title.into(),
            date: Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap(),
            body: "<p>body</p>".into(),
            source: format!("{title}.md"),
            url: format!("posts/{title}.html"),
        }
    }

    fn build_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_feed_has_no_items() {
        let xml = render_feed(&SiteConfig::default(), &[], build_time());

        assert_eq!(xml.matches("<item>").count(), 0);
        assert!(xml.contains("<title>My Bazel Site</title>"));
        assert!(xml.contains("<language>en-us</language>"));
        assert!(xml.contains("<generator>Bazel Static Site Generator</generator>"));
        assert!(xml.contains("<lastBuildDate>Wed, 02 Jul 2025 12:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains(r#"href="https://example.com/feed.xml""#));
    }

    #[test]
    fn test_feed_items_keep_post_order() {
        let config = SiteConfig {
            base_url: "https://blog.example/".into(),
            ..Default::default()
        };
        let posts = [post("First Steps", 2025, 7, 1), post("Design Ideas", 2025, 6, 20)];
        let xml = render_feed(&config, &posts, build_time());

        assert_eq!(xml.matches("<item>").count(), 2);
        assert!(xml.find("First Steps").unwrap() < xml.find("Design Ideas").unwrap());
        assert!(xml.contains("<link>https://blog.example/posts/First%20Steps.html</link>"));
        assert!(xml.contains("<pubDate>Tue, 01 Jul 2025 00:00:00 +0000</pubDate>"));
        assert!(xml.contains("<pubDate>Fri, 20 Jun 2025 00:00:00 +0000</pubDate>"));
    }
}
