// Cache module for local filesystem caching.
// Keeps GitHub listings and metric records across runs to save API quota.

pub mod paths;
pub mod store;

pub use paths::snapshot_path;
pub use store::SnapshotCache;
