use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::Value;

use crate::{TranslateError, Translator};

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// The provider splits its output on line breaks, which destroys the
/// layout of OCR'd text. Breaks are masked with a zero-width space before
/// the request and restored afterwards.
const LINEBREAK_MASK: char = '\u{200B}';

/// Unauthenticated Google web-endpoint translator.
pub struct GoogleTranslator {
    client: Client,
}

impl GoogleTranslator {
    pub fn new() -> Result<Self, TranslateError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(20))
            .https_only(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, to: &str) -> Result<String, TranslateError> {
        let masked = mask_linebreaks(text);

        let mut url = Url::parse(ENDPOINT).expect("endpoint url is valid");
        url.query_pairs_mut()
            .append_pair("client", "gtx")
            .append_pair("sl", "auto")
            .append_pair("tl", to)
            .append_pair("dt", "t")
            .append_pair("q", &masked);

        tracing::debug!(to, chars = text.len(), "requesting translation");
        let res = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .inspect_err(|e| tracing::warn!("translation request failed: {e}"))?;
        let body = res.text().await?;

        let translated = parse_response(&body)
            .inspect_err(|e| tracing::warn!("unusable translation payload: {e}"))?;
        Ok(restore_linebreaks(&translated))
    }
}

fn mask_linebreaks(text: &str) -> String {
    let mut masked = text.to_string();
    for lb in ["\r\n", "\n", "\r"] {
        masked = masked.replace(lb, &LINEBREAK_MASK.to_string());
    }
    masked
}

fn restore_linebreaks(text: &str) -> String {
    text.replace(LINEBREAK_MASK, "\n")
}

/// Extract the translated text from the endpoint's nested-array payload:
/// `[[["<translated>", "<original>", ...], ...], ...]`.
fn parse_response(body: &str) -> Result<String, TranslateError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| TranslateError::Api(e.to_string()))?;

    let segments = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or(TranslateError::EmptyResponse)?;

    let mut out = String::new();
    for segment in segments {
        if let Some(text) = segment.get(0).and_then(|t| t.as_str()) {
            out.push_str(text);
        }
    }

    if out.is_empty() {
        return Err(TranslateError::EmptyResponse);
    }
    Ok(out)
}
