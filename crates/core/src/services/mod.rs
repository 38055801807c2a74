//! Services that drive a full run: mounting the share, walking source trees,
//! populating the binary cache, and rebuilding the UUID database.

pub mod binary_cache;
pub mod manifest;
pub mod mount;
pub mod uuid_db;
pub mod walk;

pub use binary_cache::{BinaryCachePopulator, CacheError, CacheReport};
pub use mount::{ensure_share_mounted, MountError};
pub use uuid_db::{UuidDbBuilder, UuidDbError, UuidDbReport};
