// BookmarkPro services
// Engines operating on the library: persistence, querying, interchange,
// and bulk operations.

pub mod bulk_ops;
pub mod export_engine;
pub mod import_engine;
pub mod query_engine;
pub mod storage;
