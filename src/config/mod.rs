//! Configuration module

mod site;

pub use site::BlobConfig;
pub use site::CommentsConfig;
pub use site::ReadStatsConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::StorageKind;
pub use site::BLOB_STORAGE_ENV;
