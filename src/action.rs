//! Per-intent actions: the fulfillment capability, its static bindings, and
//! the name-indexed registry that resolves interpretations to instances.

pub mod binding;
pub mod registry;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::DispatchResult;

pub use binding::{bind_slots, ActionBinding};
pub use registry::{ActionRegistry, Resolution};

/// A per-turn, per-intent unit of work.
///
/// Constructed by the registry from a winning interpretation's slots,
/// fulfilled exactly once, then discarded. Fulfillment may perform I/O and
/// should abort when `cancel` fires.
#[async_trait]
pub trait Action: Send {
    async fn fulfill(&mut self, cancel: &CancellationToken) -> DispatchResult<Value>;
}
