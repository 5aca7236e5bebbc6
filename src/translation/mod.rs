pub mod deepl;

use async_trait::async_trait;

use crate::error::TranslateError;
use crate::types::caption_data::TranslationRequest;

pub use deepl::DeepLTranslator;

/// The external translation backend. Only `text` and `direction` of the
/// request are its business; the generation is carried for the caller.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> Result<String, TranslateError>;
}
