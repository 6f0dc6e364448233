use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::error::DispatchResult;

/// A renderable response payload. The dispatcher core never inspects its
/// structure; it is produced by handlers and consumed by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentable(Value);

impl Presentable {
    /// Plain-text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self(json!({ "type": "text", "text": text.into() }))
    }

    /// Named card attachment, e.g. an adaptive card.
    pub fn card(name: impl Into<String>, content: Value) -> Self {
        Self(json!({ "type": "card", "name": name.into(), "content": content }))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// The ongoing conversation as seen by the dispatcher and its handlers.
///
/// Implemented by the transport layer. One context instance is scoped to one
/// conversation; its cancellation token is threaded through classifier
/// queries and action fulfillment for the turns it hosts.
#[async_trait]
pub trait ConversationContext: Send + Sync {
    /// Emit an outbound message to the user.
    async fn post(&self, payload: Presentable) -> DispatchResult<()>;

    /// Cancellation signal scoped to this conversation. Callers supply
    /// deadlines by cancelling it; the core imposes no timeout of its own.
    fn cancellation(&self) -> CancellationToken;

    /// Re-arm the conversation to await the next inbound turn. Handlers call
    /// this after posting their response.
    fn wait_for_input(&self);
}

/// Shared handle to the turn's inbound message. The dispatcher passes it
/// through to the selected handler unexamined.
#[derive(Debug, Clone)]
pub struct PendingInput {
    message: Arc<str>,
}

impl PendingInput {
    pub fn new(message: impl Into<Arc<str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The raw text of the message that started this turn.
    pub fn text(&self) -> &str {
        &self.message
    }
}
