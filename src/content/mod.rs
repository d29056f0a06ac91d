//! Content module - reads articles from the markdown directory

mod article;
mod filename;
pub mod loader;
mod markers;

use thiserror::Error;

pub use article::{Article, CategoryGroup, TagGroup};
pub use filename::ArticleFileName;
pub use loader::ContentReader;
pub use markers::Markers;

/// Errors that abort an article listing
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("File name does not match [title]-[date]: {0}")]
    MalformedFileName(String),

    #[error("Invalid date {date:?} in file name {file_name}")]
    InvalidDate { file_name: String, date: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
