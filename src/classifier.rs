//! NLU classifier capability and the HTTP-backed implementation.

pub mod http;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::DispatchResult;
use crate::interpretation::Interpretation;

pub use http::{HttpNluClassifier, NluSettings};

/// A natural-language-understanding backend.
///
/// Returns its interpretations in the backend's own preference order; the
/// dispatcher treats earlier entries as winning confidence ties. Retry and
/// backoff policy belongs to implementations, not to the dispatcher.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Stable label used in logs and fault messages.
    fn name(&self) -> &str;

    /// Classify one input text. Cancelling `cancel` should abort the call.
    async fn query(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> DispatchResult<Vec<Interpretation>>;
}
