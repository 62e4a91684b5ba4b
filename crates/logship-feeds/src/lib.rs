//! logship-feeds — the concrete clients behind logship's pipeline seams.
//!
//! Each source implements [`logship_core::source::FileSystem`]; each store
//! implements [`logship_core::sink::DocumentStore`]. Nothing in here retries,
//! counts or decides policy; that is the core's job.

mod http;

pub mod file;
pub mod opensearch;
pub mod webhdfs;

pub use file::LocalFs;
pub use opensearch::OpenSearch;
pub use webhdfs::WebHdfs;
