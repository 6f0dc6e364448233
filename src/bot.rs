//! Weather-bot wiring: registries, handlers, and the inbound entry point.

use std::sync::Arc;

use crate::action::ActionRegistry;
use crate::classifier::{HttpNluClassifier, IntentClassifier};
use crate::config::BotSettings;
use crate::context::{ConversationContext, PendingInput, Presentable};
use crate::dispatch::{handler, Dispatcher, FulfillmentResult, HandlerBinding, HandlerRegistry};
use crate::error::DispatchResult;
use crate::weather::{forecast_binding, HttpWeatherClient, WeatherProvider, GET_FORECAST_INTENT};

/// A conversational weather bot assembled around [`Dispatcher`].
///
/// Collaborators are injected at construction; nothing here reads
/// process-global state.
pub struct WeatherBot {
    dispatcher: Dispatcher,
}

impl WeatherBot {
    pub fn new(
        classifiers: Vec<Arc<dyn IntentClassifier>>,
        weather: Arc<dyn WeatherProvider>,
    ) -> DispatchResult<Self> {
        let actions = ActionRegistry::new(vec![forecast_binding(weather)])?;
        let handlers = HandlerRegistry::new(vec![
            HandlerBinding::new("none", handler(not_understood)).with_intents(["", "None"]),
            HandlerBinding::new("forecast", handler(forecast_received))
                .with_intents([GET_FORECAST_INTENT]),
        ])?;
        Ok(Self {
            dispatcher: Dispatcher::new(classifiers, actions, handlers)?,
        })
    }

    /// Assemble the bot from configuration with HTTP-backed collaborators.
    pub fn from_settings(settings: &BotSettings) -> DispatchResult<Self> {
        let classifier: Arc<dyn IntentClassifier> =
            Arc::new(HttpNluClassifier::new("nlu", settings.nlu.clone()));
        let weather: Arc<dyn WeatherProvider> =
            Arc::new(HttpWeatherClient::new(settings.weather.clone()));
        Self::new(vec![classifier], weather)
    }

    /// Inbound turn entry point. Emits zero or more outbound messages via
    /// the context; handlers re-arm the conversation for the next turn.
    pub async fn on_message(
        &self,
        text: &str,
        context: Arc<dyn ConversationContext>,
    ) -> DispatchResult<()> {
        self.dispatcher
            .dispatch(text, context, PendingInput::new(text))
            .await
    }
}

async fn not_understood(
    context: Arc<dyn ConversationContext>,
    input: PendingInput,
    _result: FulfillmentResult,
) -> DispatchResult<()> {
    context
        .post(Presentable::text(format!(
            "Sorry, I did not understand '{}'. Type 'help' if you need assistance.",
            input.text()
        )))
        .await?;
    context.wait_for_input();
    Ok(())
}

async fn forecast_received(
    context: Arc<dyn ConversationContext>,
    input: PendingInput,
    result: FulfillmentResult,
) -> DispatchResult<()> {
    let payload = match result {
        Some(card) if !card.is_null() => Presentable::card("Weather Forecast", card),
        _ => Presentable::text(format!(
            "I couldn't find the weather for '{}'. Are you sure that's a real city?",
            input.text()
        )),
    };
    context.post(payload).await?;
    context.wait_for_input();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;

    use crate::error::DispatchError;
    use crate::interpretation::Interpretation;
    use crate::weather::{CurrentConditions, ForecastDay, WeatherReport};

    struct ScriptedClassifier(Vec<Interpretation>);

    #[async_trait]
    impl IntentClassifier for ScriptedClassifier {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn query(
            &self,
            _text: &str,
            _cancel: &CancellationToken,
        ) -> DispatchResult<Vec<Interpretation>> {
            Ok(self.0.clone())
        }
    }

    struct FixedProvider(Option<WeatherReport>);

    #[async_trait]
    impl WeatherProvider for FixedProvider {
        async fn forecast(
            &self,
            _place: &str,
            _days: u8,
            _cancel: &CancellationToken,
        ) -> DispatchResult<Option<WeatherReport>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingContext {
        posted: Mutex<Vec<Value>>,
        rearmed: AtomicUsize,
    }

    #[async_trait]
    impl ConversationContext for RecordingContext {
        async fn post(&self, payload: Presentable) -> DispatchResult<()> {
            self.posted.lock().unwrap().push(payload.into_value());
            Ok(())
        }

        fn cancellation(&self) -> CancellationToken {
            CancellationToken::new()
        }

        fn wait_for_input(&self) {
            self.rearmed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn report() -> WeatherReport {
        WeatherReport {
            location: "Seattle".to_string(),
            current: CurrentConditions {
                last_updated: "2016-07-20 14:30".to_string(),
                temp_f: 71.6,
                wind_mph: 9.4,
                wind_dir: "WSW".to_string(),
                condition: "Partly cloudy".to_string(),
                icon: "//cdn.example/day/116.png".to_string(),
            },
            days: vec![ForecastDay {
                date: "2016-07-21".to_string(),
                min_temp_f: 55.9,
                max_temp_f: 75.2,
                icon: "//cdn.example/day/113.png".to_string(),
            }],
        }
    }

    fn bot(interpretations: Vec<Interpretation>, provider_report: Option<WeatherReport>) -> WeatherBot {
        WeatherBot::new(
            vec![Arc::new(ScriptedClassifier(interpretations)) as Arc<dyn IntentClassifier>],
            Arc::new(FixedProvider(provider_report)),
        )
        .expect("valid bot")
    }

    #[tokio::test]
    async fn forecast_turn_posts_the_card_and_rearms() {
        let bot = bot(
            vec![Interpretation::new(GET_FORECAST_INTENT, 0.9)
                .with_slot("Place", json!("Seattle"))],
            Some(report()),
        );
        let context = Arc::new(RecordingContext::default());

        bot.on_message("weather in seattle", context.clone())
            .await
            .unwrap();

        let posts = context.posted.lock().unwrap().clone();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["name"], "Weather Forecast");
        assert_eq!(posts[0]["content"]["type"], "AdaptiveCard");
        assert_eq!(context.rearmed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_city_posts_the_fallback_reply() {
        let bot = bot(
            vec![Interpretation::new(GET_FORECAST_INTENT, 0.9)
                .with_slot("Place", json!("Atlantis"))],
            None,
        );
        let context = Arc::new(RecordingContext::default());

        bot.on_message("weather in atlantis", context.clone())
            .await
            .unwrap();

        let posts = context.posted.lock().unwrap().clone();
        assert_eq!(
            posts[0]["text"],
            "I couldn't find the weather for 'weather in atlantis'. Are you sure that's a real city?"
        );
        assert_eq!(context.rearmed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn none_intent_posts_the_not_understood_reply() {
        let bot = bot(vec![Interpretation::new("None", 0.8)], Some(report()));
        let context = Arc::new(RecordingContext::default());

        bot.on_message("blah blah", context.clone()).await.unwrap();

        let posts = context.posted.lock().unwrap().clone();
        assert_eq!(
            posts[0]["text"],
            "Sorry, I did not understand 'blah blah'. Type 'help' if you need assistance."
        );
        assert_eq!(context.rearmed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn classifier_fault_surfaces_without_posting() {
        struct FaultingClassifier;

        #[async_trait]
        impl IntentClassifier for FaultingClassifier {
            fn name(&self) -> &str {
                "faulting"
            }

            async fn query(
                &self,
                _text: &str,
                _cancel: &CancellationToken,
            ) -> DispatchResult<Vec<Interpretation>> {
                Err(DispatchError::Classification("backend unreachable".into()))
            }
        }

        let bot = WeatherBot::new(
            vec![Arc::new(FaultingClassifier) as Arc<dyn IntentClassifier>],
            Arc::new(FixedProvider(None)),
        )
        .expect("valid bot");
        let context = Arc::new(RecordingContext::default());

        let result = bot.on_message("weather", context.clone()).await;
        assert!(matches!(result, Err(DispatchError::UnresolvedIntent)));
        assert!(context.posted.lock().unwrap().is_empty());
    }
}
