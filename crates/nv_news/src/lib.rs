pub mod sources;

pub use sources::{create_source, FixedNewsSource, NewsApiSource};

pub mod prelude {
    pub use super::sources::{FixedNewsSource, NewsApiSource};
    pub use nv_core::{Article, Error, NewsSource, Result};
}
