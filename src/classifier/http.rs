use std::env;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::classifier::IntentClassifier;
use crate::error::{DispatchError, DispatchResult};
use crate::interpretation::{Interpretation, Slots};

const DEFAULT_ENDPOINT: &str = "https://westus.api.cognitive.microsoft.com/luis/v2.0";

/// Connection settings for one hosted NLU model. Read once at startup and
/// passed into [`HttpNluClassifier::new`]; the classifier never consults
/// process-global configuration.
#[derive(Debug, Clone)]
pub struct NluSettings {
    pub endpoint: String,
    pub app_id: String,
    pub subscription_key: String,
}

impl NluSettings {
    pub fn new(
        endpoint: impl Into<String>,
        app_id: impl Into<String>,
        subscription_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            app_id: app_id.into(),
            subscription_key: subscription_key.into(),
        }
    }

    pub fn from_env() -> DispatchResult<Self> {
        let endpoint = env::var("PALAVER_NLU_ENDPOINT")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let app_id = env::var("PALAVER_NLU_APP_ID")
            .map_err(|_| DispatchError::Binding("missing PALAVER_NLU_APP_ID".to_string()))?;
        let subscription_key = env::var("PALAVER_NLU_KEY")
            .map_err(|_| DispatchError::Binding("missing PALAVER_NLU_KEY".to_string()))?;
        Ok(Self {
            endpoint,
            app_id,
            subscription_key,
        })
    }
}

/// [`IntentClassifier`] backed by a hosted NLU model speaking the
/// LUIS-style query protocol: one GET per utterance, scored intents plus
/// extracted entities in the response body.
pub struct HttpNluClassifier {
    label: String,
    settings: NluSettings,
    http: reqwest::Client,
}

impl HttpNluClassifier {
    pub fn new(label: impl Into<String>, settings: NluSettings) -> Self {
        Self {
            label: label.into(),
            settings,
            http: reqwest::Client::new(),
        }
    }

    fn query_url(&self, text: &str) -> String {
        format!(
            "{}/apps/{}?subscription-key={}&verbose=true&q={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.app_id,
            self.settings.subscription_key,
            urlencoding::encode(text),
        )
    }
}

#[async_trait]
impl IntentClassifier for HttpNluClassifier {
    fn name(&self) -> &str {
        &self.label
    }

    async fn query(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> DispatchResult<Vec<Interpretation>> {
        let request = self.http.get(self.query_url(text)).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
            response = request => response
                .map_err(|error| DispatchError::Classification(error.to_string()))?,
        };
        let response = response
            .error_for_status()
            .map_err(|error| DispatchError::Classification(error.to_string()))?;
        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(DispatchError::Cancelled),
            body = response.json::<QueryResponse>() => body
                .map_err(|error| DispatchError::Classification(error.to_string()))?,
        };
        Ok(parse_response(body))
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "topScoringIntent")]
    top_scoring_intent: Option<ScoredIntent>,
    #[serde(default)]
    intents: Vec<ScoredIntent>,
    #[serde(default)]
    entities: Vec<Entity>,
}

#[derive(Debug, Deserialize)]
struct ScoredIntent {
    intent: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct Entity {
    #[serde(rename = "type")]
    kind: String,
    entity: Value,
}

/// Map a query response to interpretations, preserving the backend's intent
/// ordering. Entities become slots keyed by entity type, shared by every
/// interpretation from this response.
fn parse_response(body: QueryResponse) -> Vec<Interpretation> {
    let mut slots = Slots::new();
    for entity in body.entities {
        slots.insert(entity.kind, entity.entity);
    }

    let intents = if body.intents.is_empty() {
        body.top_scoring_intent.into_iter().collect()
    } else {
        body.intents
    };

    intents
        .into_iter()
        .map(|scored| Interpretation {
            name: scored.intent,
            confidence: scored.score,
            slots: slots.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> QueryResponse {
        serde_json::from_value(value).expect("valid response body")
    }

    #[test]
    fn parses_intents_and_entities() {
        let body = response(json!({
            "query": "weather in seattle",
            "topScoringIntent": { "intent": "Weather.GetForecast", "score": 0.92 },
            "intents": [
                { "intent": "Weather.GetForecast", "score": 0.92 },
                { "intent": "None", "score": 0.05 }
            ],
            "entities": [
                { "type": "Place", "entity": "seattle", "startIndex": 11, "endIndex": 17 }
            ]
        }));

        let interpretations = parse_response(body);
        assert_eq!(interpretations.len(), 2);
        assert_eq!(interpretations[0].name, "Weather.GetForecast");
        assert_eq!(interpretations[0].confidence, 0.92);
        assert_eq!(interpretations[0].slots.get("Place"), Some(&json!("seattle")));
        assert_eq!(interpretations[1].name, "None");
    }

    #[test]
    fn falls_back_to_top_scoring_intent() {
        let body = response(json!({
            "query": "hello",
            "topScoringIntent": { "intent": "None", "score": 0.7 }
        }));

        let interpretations = parse_response(body);
        assert_eq!(interpretations.len(), 1);
        assert_eq!(interpretations[0].name, "None");
        assert!(interpretations[0].slots.is_empty());
    }

    #[test]
    fn empty_response_yields_no_interpretations() {
        let body = response(json!({ "query": "hello" }));
        assert!(parse_response(body).is_empty());
    }

    #[test]
    fn query_url_encodes_text() {
        let classifier = HttpNluClassifier::new(
            "primary",
            NluSettings::new("https://nlu.example/v2.0/", "app-1", "key-1"),
        );
        let url = classifier.query_url("weather in new york?");
        assert!(url.starts_with("https://nlu.example/v2.0/apps/app-1?"));
        assert!(url.ends_with("&q=weather%20in%20new%20york%3F"));
    }
}
