pub mod config;
pub mod error;
pub mod gallery;
pub mod generator;
pub mod keys;
pub mod models;
pub mod prompt;
pub mod rotation;
pub mod storage;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, Result};
pub use gallery::{Gallery, GallerySettings, ImageEntry};
pub use generator::{GenerationOutcome, Generator, GeneratorSettings};
pub use models::{ImageSource, NewsSource};
pub use rotation::{record_processed, reset, select_next, Selection};
pub use storage::ArtifactStore;
pub use types::{Article, GeneratedArtifact, ObjectSummary, ProcessedSet};
