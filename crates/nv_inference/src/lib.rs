pub mod models;

pub use models::create_model;

pub mod prelude {
    pub use super::models::create_model;
    pub use super::models::dummy::DummyImageModel;
    pub use super::models::openai::OpenAiImageModel;
    pub use nv_core::{Error, ImageSource, Result};
}
