use std::sync::OnceLock;

use anyhow::{Context, Result, bail};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::Translator;

const PAID_ENDPOINT: &str = "https://api.deepl.com";
const FREE_ENDPOINT: &str = "https://api-free.deepl.com";

/// DeepL backend (v2 REST API).
///
/// A `preserve` pattern marks substrings the service must not touch.
/// Matches are wrapped in `<keep>` tags, the request asks DeepL to leave
/// those tags alone, and the tags are stripped from the response.
pub struct DeepLTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
    preserve: Option<Regex>,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: Vec<&'a str>,
    source_lang: &'a str,
    target_lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_handling: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_tags: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    text: String,
}

impl DeepLTranslator {
    pub fn new(api_key: String, endpoint: Option<String>, preserve: Option<Regex>) -> Self {
        let endpoint = endpoint.unwrap_or_else(|| default_endpoint(&api_key).to_string());
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            preserve,
        }
    }

    async fn request(&self, text: &str, from: &str, to: &str) -> Result<String> {
        let wrapped = self.preserve.as_ref().map(|re| wrap_preserved(re, text));
        let tagged = wrapped.is_some();

        let body = TranslateRequest {
            text: vec![wrapped.as_deref().unwrap_or(text)],
            source_lang: from,
            target_lang: to,
            tag_handling: tagged.then_some("xml"),
            ignore_tags: tagged.then_some("keep"),
        };

        let url = format!("{}/v2/translate", self.endpoint.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to connect to DeepL: {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("DeepL request failed with status {status}: {body}");
        }

        let payload: TranslateResponse = response
            .json()
            .await
            .context("Failed to parse DeepL response")?;

        let translated = payload
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .context("DeepL response contained no translations")?;

        Ok(strip_keep_tags(&translated))
    }
}

impl Translator for DeepLTranslator {
    fn name(&self) -> &'static str {
        "DeepL"
    }

    fn cache_namespace(&self) -> String {
        "deepl".to_string()
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

/// Free-tier API keys end in `:fx` and use a separate host.
fn default_endpoint(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        FREE_ENDPOINT
    } else {
        PAID_ENDPOINT
    }
}

fn wrap_preserved(re: &Regex, text: &str) -> String {
    re.replace_all(text, "<keep>$0</keep>").into_owned()
}

#[allow(clippy::unwrap_used)] // the pattern is a compile-time constant
fn strip_keep_tags(text: &str) -> String {
    static KEEP_TAG: OnceLock<Regex> = OnceLock::new();
    let keep_tag = KEEP_TAG.get_or_init(|| Regex::new("(?i)</?keep>").unwrap());
    keep_tag.replace_all(text, "").into_owned()
}
