//! Inline category/tag markers
//!
//! Articles declare their labels anywhere in the body as
//! `categories: [a, b]` and `tags: [x, y]`. Only the first occurrence of each
//! key counts, and only this bracketed literal form is recognised; YAML block
//! lists are not.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CATEGORIES_RE: Regex = Regex::new(r"(?i)categories:\s*\[([^\]]+)\]").unwrap();
    static ref TAGS_RE: Regex = Regex::new(r"(?i)tags:\s*\[([^\]]+)\]").unwrap();
}

/// Labels declared inline in an article body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

impl Markers {
    /// Extract the category and tag markers from `content`
    pub fn extract(content: &str) -> Self {
        Self {
            categories: extract_list(&CATEGORIES_RE, content),
            tags: extract_list(&TAGS_RE, content),
        }
    }

    /// Remove the first category marker and the first tag marker
    pub fn strip(content: &str) -> String {
        let without_categories = CATEGORIES_RE.replace(content, "");
        TAGS_RE.replace(&without_categories, "").into_owned()
    }
}

fn extract_list(re: &Regex, content: &str) -> Vec<String> {
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
