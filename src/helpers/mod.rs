//! Helper functions shared by the reader and the stores

pub mod date;

pub use date::{iso_date, offset_timestamp, parse_article_date, parse_timestamp};
