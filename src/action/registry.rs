use std::collections::HashMap;

use crate::action::binding::ActionBinding;
use crate::action::Action;
use crate::error::{DispatchError, DispatchResult};
use crate::interpretation::Interpretation;

/// Outcome of resolving an interpretation: the instantiated action, if any
/// binding matched, and the intent name used for handler lookup.
pub struct Resolution {
    pub action: Option<Box<dyn Action>>,
    pub intent: String,
}

/// Intent-name-indexed action bindings.
///
/// Built exactly once per dispatcher and read-only afterward, so concurrent
/// turns can resolve against it without locking.
pub struct ActionRegistry {
    bindings: HashMap<&'static str, ActionBinding>,
}

impl ActionRegistry {
    /// Index the given bindings by intent name. Two bindings declaring the
    /// same intent is a construction-time error.
    pub fn new(bindings: Vec<ActionBinding>) -> DispatchResult<Self> {
        let mut indexed = HashMap::with_capacity(bindings.len());
        for binding in bindings {
            if indexed.insert(binding.intent, binding.clone()).is_some() {
                return Err(DispatchError::Binding(format!(
                    "intent '{}' is bound to more than one action",
                    binding.intent
                )));
            }
        }
        Ok(Self { bindings: indexed })
    }

    pub fn describe(&self, intent: &str) -> Option<&'static str> {
        self.bindings.get(intent).map(|binding| binding.description)
    }

    /// Instantiate the action bound to the interpretation's intent and
    /// populate it from the interpretation's slots. No binding for the name
    /// is the normal "no specific action, use the default handler" path,
    /// not an error.
    pub fn resolve(&self, interpretation: &Interpretation) -> Resolution {
        let action = self
            .bindings
            .get(interpretation.name.as_str())
            .map(|binding| binding.instantiate(&interpretation.slots));
        Resolution {
            action,
            intent: interpretation.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;

    #[derive(Debug, Default, Deserialize)]
    struct ForecastProbe {
        #[serde(rename = "Place", default)]
        place: String,
    }

    #[async_trait]
    impl Action for ForecastProbe {
        async fn fulfill(&mut self, _cancel: &CancellationToken) -> DispatchResult<Value> {
            Ok(json!({ "kind": "forecast", "place": self.place }))
        }
    }

    #[derive(Debug, Default, Deserialize)]
    struct AlarmProbe;

    #[async_trait]
    impl Action for AlarmProbe {
        async fn fulfill(&mut self, _cancel: &CancellationToken) -> DispatchResult<Value> {
            Ok(json!({ "kind": "alarm" }))
        }
    }

    fn registry() -> ActionRegistry {
        ActionRegistry::new(vec![
            ActionBinding::of::<ForecastProbe>("Weather.GetForecast", "Get the weather"),
            ActionBinding::of::<AlarmProbe>("Alarm.Set", "Set an alarm"),
        ])
        .expect("unique bindings")
    }

    #[test]
    fn duplicate_intent_names_fail_construction() {
        let result = ActionRegistry::new(vec![
            ActionBinding::of::<ForecastProbe>("Weather.GetForecast", "Get the weather"),
            ActionBinding::of::<AlarmProbe>("Weather.GetForecast", "Also the weather"),
        ]);
        assert!(matches!(result, Err(DispatchError::Binding(_))));
    }

    #[tokio::test]
    async fn resolve_returns_the_bound_type_per_name() {
        let registry = registry();

        let forecast = registry.resolve(&Interpretation::new("Weather.GetForecast", 0.9));
        let result = forecast
            .action
            .expect("bound action")
            .fulfill(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result["kind"], "forecast");

        let alarm = registry.resolve(&Interpretation::new("Alarm.Set", 0.8));
        let result = alarm
            .action
            .expect("bound action")
            .fulfill(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result["kind"], "alarm");
    }

    #[tokio::test]
    async fn resolve_populates_fields_from_slots() {
        let registry = registry();
        let interpretation = Interpretation::new("Weather.GetForecast", 0.9)
            .with_slot("Place", json!("Seattle"));

        let resolution = registry.resolve(&interpretation);
        let result = resolution
            .action
            .expect("bound action")
            .fulfill(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result["place"], "Seattle");
    }

    #[test]
    fn unknown_intent_resolves_to_no_action() {
        let registry = registry();
        let resolution = registry.resolve(&Interpretation::new("Chitchat.Greet", 0.9));
        assert!(resolution.action.is_none());
        assert_eq!(resolution.intent, "Chitchat.Greet");
    }

    #[test]
    fn describe_returns_binding_description() {
        let registry = registry();
        assert_eq!(registry.describe("Alarm.Set"), Some("Set an alarm"));
        assert_eq!(registry.describe("Chitchat.Greet"), None);
    }
}
