//! Heading anchor ids.

use rustc_hash::FxHashMap;

/// Convert heading text to an anchor id.
///
/// Text is folded to ASCII, lowercased, and every run of characters outside
/// `[a-z0-9_-]` collapses to a single `-`.
///
/// `Getting Started with Bazel` → `getting-started-with-bazel`
pub fn slugify(text: &str) -> String {
    let folded = deunicode::deunicode(text).to_ascii_lowercase();
    let mut slug = String::with_capacity(folded.len());
    let mut pending_dash = false;

    for c in folded.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "heading".to_owned()
    } else {
        slug
    }
}

/// Hands out unique anchor ids within one document.
///
/// Every issued id is recorded, so a suffixed id never collides with a
/// heading whose own slug already ends in `-N`.
#[derive(Debug, Default)]
pub struct HeadingIds {
    /// Issued id → next suffix to try when it repeats.
    seen: FxHashMap<String, usize>,
}

impl HeadingIds {
    /// Slugify `text`, appending `-1`, `-2`, ... on repeats.
    pub fn next_id(&mut self, text: &str) -> String {
        let base = slugify(text);
        let Some(&start) = self.seen.get(&base) else {
            self.seen.insert(base.clone(), 1);
            return base;
        };

        let mut n = start;
        let id = loop {
            let candidate = format!("{base}-{n}");
            if !self.seen.contains_key(&candidate) {
                break candidate;
            }
            n += 1;
        };
        self.seen.insert(base, n + 1);
        self.seen.insert(id.clone(), 1);
        id
    }
}
