use tolka_types::languages::{LANGUAGES, Language};

pub mod google;

pub use google::GoogleTranslator;

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider error: {0}")]
    Api(String),

    #[error("provider returned no translation")]
    EmptyResponse,
}

/// Translation provider interface. The source language is detected by the
/// provider; only the target is chosen by the user.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the target language code.
    async fn translate(&self, text: &str, to: &str) -> Result<String, TranslateError>;

    /// Target languages this provider accepts.
    fn supported_targets(&self) -> &'static [Language] {
        LANGUAGES
    }
}
