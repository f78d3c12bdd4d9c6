use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch up to `page_size` candidate articles matching `query`.
    ///
    /// An empty batch is reported as `Error::UpstreamUnavailable`, never as `Ok(vec![])`.
    async fn fetch_candidates(&self, query: &str, page_size: usize) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait ImageSource: Send + Sync {
    fn name(&self) -> &str;

    /// Render `prompt` into encoded image bytes (PNG).
    async fn render(&self, prompt: &str) -> Result<Vec<u8>>;
}
