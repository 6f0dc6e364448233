use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::action::Action;
use crate::interpretation::Slots;

/// Factory producing a fresh action instance from a winning interpretation's
/// slots. Slot binding is best-effort and never fails.
pub type ActionFactory = Arc<dyn Fn(&Slots) -> Box<dyn Action> + Send + Sync>;

/// Static declaration associating an intent name with an action factory and
/// a human-readable description. Created once at startup and immutable
/// thereafter.
#[derive(Clone)]
pub struct ActionBinding {
    pub intent: &'static str,
    pub description: &'static str,
    factory: ActionFactory,
}

impl ActionBinding {
    /// Binding with an explicit factory, for action types that need injected
    /// collaborators (clients, credentials) alongside their slot values.
    pub fn new<F>(intent: &'static str, description: &'static str, factory: F) -> Self
    where
        F: Fn(&Slots) -> Box<dyn Action> + Send + Sync + 'static,
    {
        Self {
            intent,
            description,
            factory: Arc::new(factory),
        }
    }

    /// Binding for a self-contained action type populated entirely from
    /// slots.
    pub fn of<T>(intent: &'static str, description: &'static str) -> Self
    where
        T: Action + DeserializeOwned + Default + 'static,
    {
        Self::new(intent, description, |slots| Box::new(bind_slots::<T>(slots)))
    }

    pub fn instantiate(&self, slots: &Slots) -> Box<dyn Action> {
        (self.factory)(slots)
    }
}

impl std::fmt::Debug for ActionBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBinding")
            .field("intent", &self.intent)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Best-effort slot binding: copy slot values into `T`'s fields by name.
/// Unmatched slots are ignored, missing fields keep their defaults, and a
/// type mismatch falls back to `T::default()` rather than failing the turn.
pub fn bind_slots<T>(slots: &Slots) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(Value::Object(slots.clone())).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    use crate::error::DispatchResult;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct EchoArgs {
        #[serde(rename = "Place", default)]
        place: String,
        #[serde(default)]
        days: u8,
    }

    #[derive(Debug, Default, Deserialize)]
    struct EchoAction {
        #[serde(flatten)]
        args: EchoArgs,
    }

    #[async_trait]
    impl Action for EchoAction {
        async fn fulfill(&mut self, _cancel: &CancellationToken) -> DispatchResult<Value> {
            Ok(json!({ "place": self.args.place }))
        }
    }

    fn slots(value: Value) -> Slots {
        match value {
            Value::Object(map) => map,
            _ => panic!("slots must be an object"),
        }
    }

    #[test]
    fn binds_matching_slots_by_name() {
        let args: EchoArgs = bind_slots(&slots(json!({ "Place": "Seattle", "days": 3 })));
        assert_eq!(args.place, "Seattle");
        assert_eq!(args.days, 3);
    }

    #[test]
    fn ignores_unknown_slots() {
        let args: EchoArgs = bind_slots(&slots(json!({ "Place": "Seattle", "Mood": "sunny" })));
        assert_eq!(args.place, "Seattle");
    }

    #[test]
    fn missing_slots_keep_defaults() {
        let args: EchoArgs = bind_slots(&slots(json!({})));
        assert_eq!(args, EchoArgs::default());
    }

    #[test]
    fn type_mismatch_falls_back_to_defaults() {
        let args: EchoArgs = bind_slots(&slots(json!({ "days": "not a number" })));
        assert_eq!(args, EchoArgs::default());
    }

    #[tokio::test]
    async fn of_binding_instantiates_populated_action() {
        let binding = ActionBinding::of::<EchoAction>("Echo", "Echo the place back");
        let mut action = binding.instantiate(&slots(json!({ "Place": "Seattle" })));
        let result = action.fulfill(&CancellationToken::new()).await.unwrap();
        assert_eq!(result, json!({ "place": "Seattle" }));
    }
}
