use anyhow::{Context, Result, bail};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Translator;

const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Cloud Translation backend (v2 REST API, API-key auth).
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: Vec<&'a str>,
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl GoogleTranslator {
    pub fn new(api_key: String, endpoint: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key,
        }
    }

    async fn request(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let body = TranslateRequest {
            q: vec![text],
            source: from,
            target: to,
            // "text" turns off HTML entity encoding in results
            format: "text",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to connect to Google Translate: {}", self.endpoint))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Google Translate request failed with status {status}: {body}");
        }

        let payload: TranslateResponse = response
            .json()
            .await
            .context("Failed to parse Google Translate response")?;

        payload
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .context("Google Translate response contained no translations")
    }
}

impl Translator for GoogleTranslator {
    fn name(&self) -> &'static str {
        "Google Translate"
    }

    fn cache_namespace(&self) -> String {
        "google".to_string()
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        from: &'a str,
        to: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        self.request(text, from, to).boxed()
    }
}
