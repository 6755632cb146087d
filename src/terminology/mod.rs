//! External diagnosis terminology (WHO ICD-11 API).
//!
//! [`Icd11Client`] exchanges client credentials for a bearer token, caches it
//! until shortly before expiry, and runs entity searches with a bounded
//! timeout. No request is retried.

pub mod client;
pub mod config;
pub mod error;
pub mod markup;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(test)]
mod tests;

pub use client::{Icd11Client, TerminologyClient, TerminologyEntity};
pub use config::TerminologyConfig;
pub use error::TerminologyError;
pub use markup::strip_markup;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTerminologyClient;

impl<T: TerminologyClient + ?Sized> TerminologyClient for std::sync::Arc<T> {
    fn search(
        &self,
        text: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<TerminologyEntity>, TerminologyError>> + Send
    {
        (**self).search(text, limit)
    }

    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }
}
