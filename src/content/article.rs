//! Article and taxonomy models

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A blog article sourced from one markdown file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Title, taken from the first bracket pair of the file name
    pub name: String,

    /// Publication date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Markdown body (empty in listings)
    pub content: String,

    /// Category labels in declaration order
    #[serde(default)]
    pub categories: Vec<String>,

    /// Tag labels in declaration order
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Article {
    /// Create an article with no body or labels
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            content: String::new(),
            categories: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// Articles filed under one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub blogs: Vec<Article>,
}

/// Articles filed under one tag
#[derive(Debug, Clone, Serialize)]
pub struct TagGroup {
    pub tag: String,
    pub blogs: Vec<Article>,
}

/// Group articles by every label `labels` yields for them.
///
/// Groups come out largest first; equal sizes keep first-seen order.
pub(crate) fn group_by_label<F>(articles: &[Article], labels: F) -> Vec<(String, Vec<Article>)>
where
    F: Fn(&Article) -> &[String],
{
    let mut groups: IndexMap<String, Vec<Article>> = IndexMap::new();
    for article in articles {
        for label in labels(article) {
            groups
                .entry(label.clone())
                .or_default()
                .push(article.clone());
        }
    }

    let mut groups: Vec<_> = groups.into_iter().collect();
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(name: &str, categories: &[&str]) -> Article {
        let mut a = Article::new(name, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        a.categories = categories.iter().map(|c| c.to_string()).collect();
        a
    }

    #[test]
    fn test_group_by_label() {
        let articles = vec![
            article("a", &["life"]),
            article("b", &["rust", "life"]),
            article("c", &["rust"]),
            article("d", &["web"]),
            article("e", &["rust"]),
        ];

        let groups = group_by_label(&articles, |a| &a.categories);
        let names: Vec<_> = groups.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(names, vec!["rust", "life", "web"]);
        assert_eq!(groups[0].1.len(), 3);
        assert_eq!(groups[1].1[1].name, "b");
    }

    #[test]
    fn test_article_json_shape() {
        let a = article("Hello", &["rust"]);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["name"], "Hello");
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["categories"][0], "rust");
    }
}
