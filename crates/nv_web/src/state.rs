use std::sync::Arc;

use nv_core::{Gallery, Generator};

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<Generator>,
    pub gallery: Arc<Gallery>,
}

impl AppState {
    pub fn new(generator: Generator, gallery: Gallery) -> Self {
        Self {
            generator: Arc::new(generator),
            gallery: Arc::new(gallery),
        }
    }
}
