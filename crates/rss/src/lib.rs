//! RSS/Atom ingestion pipeline: parsing (C1), parallel fetching (C2), and
//! the daily cache materialiser (C3).

pub mod cache;
pub mod fetcher;
pub mod parser;

pub use cache::{generate_cache, generate_cache_with_deadline, load_artifact, CacheError};
pub use fetcher::fetch_all;
pub use parser::parse_feed;
