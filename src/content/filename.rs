//! Article file names of the form `[title]-[date].md`

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use super::ContentError;
use crate::helpers::{iso_date, parse_article_date};

lazy_static! {
    static ref FILE_NAME_RE: Regex = Regex::new(r"\[(.*?)\]-\[(.*?)\]").unwrap();
}

/// Title and date encoded in an article file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFileName {
    pub name: String,
    pub date: NaiveDate,
}

impl ArticleFileName {
    /// Parse a file name such as `[Hello]-[2024-01-05].md`
    pub fn parse(file_name: &str) -> Result<Self, ContentError> {
        let caps = FILE_NAME_RE
            .captures(file_name)
            .ok_or_else(|| ContentError::MalformedFileName(file_name.to_string()))?;

        let name = caps[1].to_string();
        let raw_date = &caps[2];
        let date = parse_article_date(raw_date).ok_or_else(|| ContentError::InvalidDate {
            file_name: file_name.to_string(),
            date: raw_date.to_string(),
        })?;

        Ok(Self { name, date })
    }

    /// Build the file name for a new article
    pub fn to_file_name(&self) -> String {
        format!("[{}]-[{}].md", self.name, iso_date(&self.date))
    }
}

/// Prefix every file of the article `name` starts with
pub fn lookup_prefix(name: &str) -> String {
    format!("[{}]", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_name() {
        let parsed = ArticleFileName::parse("[Hello World]-[2024-1-5].md").unwrap();
        assert_eq!(parsed.name, "Hello World");
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(parsed.to_file_name(), "[Hello World]-[2024-01-05].md");
    }

    #[test]
    fn test_malformed_file_name() {
        let err = ArticleFileName::parse("notes.md").unwrap_err();
        assert!(matches!(err, ContentError::MalformedFileName(_)));

        let err = ArticleFileName::parse("[Only title].md").unwrap_err();
        assert!(matches!(err, ContentError::MalformedFileName(_)));
    }

    #[test]
    fn test_invalid_date() {
        let err = ArticleFileName::parse("[Post]-[tomorrow].md").unwrap_err();
        match err {
            ContentError::InvalidDate { date, .. } => assert_eq!(date, "tomorrow"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lookup_prefix() {
        assert!("[about]-[2023-01-01].md".starts_with(&lookup_prefix("about")));
        assert!(!"[about me]-[2023-01-01].md".starts_with(&lookup_prefix("about")));
    }
}
