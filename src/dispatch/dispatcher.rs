use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::action::ActionRegistry;
use crate::classifier::IntentClassifier;
use crate::context::{ConversationContext, PendingInput};
use crate::dispatch::handler::{FulfillmentResult, HandlerRegistry};
use crate::error::{DispatchError, DispatchResult};
use crate::interpretation::Interpretation;
use crate::selection::select_winner;

/// Orchestrates one conversational turn: classify, select, resolve, fulfill,
/// dispatch.
///
/// Both registries are built once at construction and immutable afterward;
/// concurrent turns share the dispatcher without locking, and a failed turn
/// never affects subsequent ones.
pub struct Dispatcher {
    classifiers: Vec<Arc<dyn IntentClassifier>>,
    actions: ActionRegistry,
    handlers: HandlerRegistry,
}

impl Dispatcher {
    /// Classifier registration order is the priority rank used to break
    /// winner-selection ties. At least one classifier is required.
    pub fn new(
        classifiers: Vec<Arc<dyn IntentClassifier>>,
        actions: ActionRegistry,
        handlers: HandlerRegistry,
    ) -> DispatchResult<Self> {
        if classifiers.is_empty() {
            return Err(DispatchError::Binding(
                "at least one classifier is required".to_string(),
            ));
        }
        Ok(Self {
            classifiers,
            actions,
            handlers,
        })
    }

    /// Run one turn for the given input text.
    ///
    /// Classifier queries fan out concurrently and are joined before winner
    /// selection. A single classifier fault drops that classifier's result
    /// and the turn proceeds; every classifier faulting surfaces as
    /// [`DispatchError::UnresolvedIntent`] without invoking any handler.
    /// When classification succeeds but yields only none/empty
    /// interpretations, the turn routes to the default handler with an
    /// absent fulfillment result — a recoverable "not understood", not a
    /// fault.
    pub async fn dispatch(
        &self,
        text: &str,
        context: Arc<dyn ConversationContext>,
        input: PendingInput,
    ) -> DispatchResult<()> {
        let turn_id = Uuid::new_v4();
        let cancel = context.cancellation();
        debug!(turn = %turn_id, classifiers = self.classifiers.len(), "classifying");

        let queries = self
            .classifiers
            .iter()
            .map(|classifier| classifier.query(text, &cancel));
        let outcomes = join_all(queries).await;
        if cancel.is_cancelled() {
            return Err(DispatchError::Cancelled);
        }

        let mut results = Vec::with_capacity(outcomes.len());
        let mut successes = 0usize;
        for (classifier, outcome) in self.classifiers.iter().zip(outcomes) {
            match outcome {
                Ok(interpretations) => {
                    successes += 1;
                    results.push(interpretations);
                }
                Err(fault) => {
                    warn!(
                        turn = %turn_id,
                        classifier = classifier.name(),
                        %fault,
                        "classifier fault, dropping its result"
                    );
                    // Empty set keeps the registration rank of the survivors.
                    results.push(Vec::new());
                }
            }
        }
        if successes == 0 {
            return Err(DispatchError::UnresolvedIntent);
        }

        let resolution = match select_winner(&results) {
            Some(winner) => {
                debug!(
                    turn = %turn_id,
                    intent = %winner.interpretation.name,
                    confidence = winner.interpretation.confidence,
                    classifier = self.classifiers[winner.classifier].name(),
                    "winner selected"
                );
                self.actions.resolve(&winner.interpretation)
            }
            None => {
                debug!(turn = %turn_id, "no usable interpretation, routing to default handler");
                self.actions.resolve(&Interpretation::none())
            }
        };

        let fulfillment: FulfillmentResult = match resolution.action {
            Some(mut action) => {
                if cancel.is_cancelled() {
                    return Err(DispatchError::Cancelled);
                }
                debug!(turn = %turn_id, intent = %resolution.intent, "fulfilling action");
                Some(action.fulfill(&cancel).await?)
            }
            None => None,
        };

        let handler = self.handlers.lookup(&resolution.intent).ok_or_else(|| {
            // Construction guarantees a default entry, so this branch means
            // the registry itself is broken.
            error!(
                turn = %turn_id,
                intent = %resolution.intent,
                "no handler found and no default handler exists"
            );
            DispatchError::Dispatch(format!(
                "no handler for intent '{}' and no default handler exists",
                resolution.intent
            ))
        })?;

        debug!(turn = %turn_id, intent = %resolution.intent, "invoking handler");
        handler(context, input, fulfillment).await
    }
}
