use std::sync::Arc;

use nv_core::config::StoreConfig;
use nv_core::{ArtifactStore, Error, Result};

pub mod backends;

pub use backends::*;

pub const STORAGE_NAMES: &[&str] = &["memory", "local", "s3"];

/// Build the artifact store named `kind`.
pub async fn create_storage(kind: &str, config: &StoreConfig) -> Result<Arc<dyn ArtifactStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "local" => Ok(Arc::new(LocalStore::new(&config.root))),
        #[cfg(feature = "s3")]
        "s3" => {
            let bucket = nv_core::config::require(&config.bucket, "BUCKET_NAME")?;
            Ok(Arc::new(S3Store::new(bucket, config.region.as_deref()).await))
        }
        #[cfg(not(feature = "s3"))]
        "s3" => Err(Error::Config(
            "S3 storage requires the `s3` feature of nv_storage".to_string(),
        )),
        other => Err(Error::Config(format!(
            "Unknown storage {:?} (available: {})",
            other,
            STORAGE_NAMES.join(", ")
        ))),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::create_storage;
}
