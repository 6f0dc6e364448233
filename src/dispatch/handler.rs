use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::context::{ConversationContext, PendingInput};
use crate::error::{DispatchError, DispatchResult};

/// Name reserved for the default/fallback handler.
pub const DEFAULT_INTENT: &str = "";

/// Result of action fulfillment as handed to a handler. `None` when the turn
/// resolved no action.
pub type FulfillmentResult = Option<Value>;

/// The canonical handler shape: conversation context, the turn's pending
/// input, and the fulfillment result. Handlers produce any user-visible
/// output through the context and re-arm the next-turn wait.
pub type HandlerFn = Arc<
    dyn Fn(Arc<dyn ConversationContext>, PendingInput, FulfillmentResult) -> BoxFuture<'static, DispatchResult<()>>
        + Send
        + Sync,
>;

/// Wrap an async fn with the canonical signature into a [`HandlerFn`].
pub fn handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Arc<dyn ConversationContext>, PendingInput, FulfillmentResult) -> Fut
        + Send
        + Sync
        + 'static,
    Fut: Future<Output = DispatchResult<()>> + Send + 'static,
{
    Arc::new(move |context, input, result| Box::pin(f(context, input, result)))
}

/// Adapt a handler authored against the simpler `(context, result)` shape.
/// The adaptation happens here, at registration time, not per call.
pub fn simple_handler<F, Fut>(f: F) -> HandlerFn
where
    F: Fn(Arc<dyn ConversationContext>, FulfillmentResult) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DispatchResult<()>> + Send + 'static,
{
    Arc::new(move |context, _input, result| Box::pin(f(context, result)))
}

/// Static declaration pairing a handler function with the intent names it
/// serves. Declaring no intents binds the handler under its own name.
#[derive(Clone)]
pub struct HandlerBinding {
    name: &'static str,
    intents: Vec<String>,
    handler: HandlerFn,
}

impl HandlerBinding {
    pub fn new(name: &'static str, handler: HandlerFn) -> Self {
        Self {
            name,
            intents: Vec::new(),
            handler,
        }
    }

    /// Declare the intent names this handler serves. The empty string is the
    /// reserved default name; several aliases may point at one handler.
    pub fn with_intents<I, S>(mut self, intents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.intents = intents.into_iter().map(Into::into).collect();
        self
    }

    fn intent_names(&self) -> Vec<String> {
        if self.intents.is_empty() {
            vec![self.name.to_string()]
        } else {
            self.intents.clone()
        }
    }
}

/// Intent-name-indexed handler functions with a guaranteed default entry.
///
/// Built exactly once per dispatcher instance from static bindings (the
/// reflection scan of the original is replaced by this explicit table) and
/// read-only afterward, so concurrent turns can look up handlers without
/// locking.
pub struct HandlerRegistry {
    handlers: HashMap<String, HandlerFn>,
}

impl HandlerRegistry {
    /// Index the bindings by declared intent name.
    ///
    /// Two different bindings claiming the same name, or a set of bindings
    /// with no default entry, is a construction-time error.
    pub fn new(bindings: Vec<HandlerBinding>) -> DispatchResult<Self> {
        let mut handlers: HashMap<String, HandlerFn> = HashMap::new();
        for binding in &bindings {
            let names = binding.intent_names();
            for name in &names {
                if handlers.insert(name.clone(), binding.handler.clone()).is_some() {
                    return Err(DispatchError::Binding(format!(
                        "handler '{}' declares already-bound intent/s: {}",
                        binding.name,
                        names.join(";")
                    )));
                }
            }
        }
        if !handlers.contains_key(DEFAULT_INTENT) {
            return Err(DispatchError::Binding(
                "no default intent handler found".to_string(),
            ));
        }
        Ok(Self { handlers })
    }

    /// Exact match on name, falling back to the default entry. `None` only
    /// if the default-handler invariant has been broken.
    pub fn lookup(&self, name: &str) -> Option<HandlerFn> {
        self.handlers
            .get(name)
            .or_else(|| self.handlers.get(DEFAULT_INTENT))
            .cloned()
    }
}
