pub mod local;
pub mod memory;

#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalStore;
pub use memory::MemoryStore;

#[cfg(feature = "s3")]
pub use s3::S3Store;
