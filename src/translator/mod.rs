//! Translation backends.
//!
//! Every backend implements [`Translator`], so the orchestration loop is
//! written once against the trait and a concrete backend is selected at
//! startup.

mod deepl;
mod google;
mod script;

pub use deepl::DeepLTranslator;
pub use google::GoogleTranslator;
pub use script::ScriptTranslator;

use anyhow::Result;
use futures_util::future::BoxFuture;

/// A translation service invoked on cache misses.
pub trait Translator: Send + Sync {
    /// Backend name as shown in the run banner.
    fn name(&self) -> &'static str;

    /// Cache namespace for this backend.
    ///
    /// Distinct backends must never serve each other's cached output.
    fn cache_namespace(&self) -> String;

    /// Translates one text between the given language codes.
    ///
    /// Language codes are passed through to the service untouched. Any
    /// provider failure is returned as an error and aborts the run.
    fn translate<'a>(
        &'a self,
        text: &'a str,
        from: &'a str,
        to: &'a str,
    ) -> BoxFuture<'a, Result<String>>;
}
