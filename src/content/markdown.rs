//! Markdown to HTML rendering.

use crate::utils::slug::HeadingIds;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

/// Converts markdown source to an HTML fragment.
///
/// Rendering never fails; malformed markup degrades to literal text.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, source: &str) -> String;
}

/// CommonMark renderer with the GitHub-flavoured extensions.
///
/// - tables, strikethrough, task lists, footnotes
/// - raw HTML passes through
/// - single newlines become `<br />`
/// - headings get `id` anchors
#[derive(Debug, Default, Clone, Copy)]
pub struct CmarkRenderer;

impl CmarkRenderer {
    const OPTIONS: Options = Options::ENABLE_TABLES
        .union(Options::ENABLE_STRIKETHROUGH)
        .union(Options::ENABLE_TASKLISTS)
        .union(Options::ENABLE_FOOTNOTES);
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, source: &str) -> String {
        let mut events: Vec<Event<'_>> = Parser::new_ext(source, Self::OPTIONS)
            .map(|event| match event {
                Event::SoftBreak => Event::HardBreak,
                other => other,
            })
            .collect();
        assign_heading_ids(&mut events);

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }
}

/// Give every heading without an explicit id a unique slug of its text.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut ids = HeadingIds::default();

    for i in 0..events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            continue;
        }
        let text = heading_text(&events[i + 1..]);
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(ids.next_id(&text)));
        }
    }
}

fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}
