pub mod assemblyai;

pub use assemblyai::AssemblyAiClient;

use crate::caption::ProviderWord;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A speech-to-text provider that returns word-level timings in milliseconds.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<Vec<ProviderWord>>;
    fn name(&self) -> &'static str;
}
