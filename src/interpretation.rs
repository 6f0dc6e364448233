use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved intent name meaning "the classifier understood nothing".
pub const NONE_INTENT: &str = "None";

/// Slot values extracted by a classifier, keyed by slot name.
pub type Slots = serde_json::Map<String, Value>;

/// One classifier's scored guess at the caller's intent, plus any slot
/// values it extracted from the input text.
///
/// Confidence semantics are classifier-defined; scores are only compared
/// within one classifier's result set and between per-classifier winners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interpretation {
    /// Intent name. The empty string and [`NONE_INTENT`] both mean "not
    /// understood".
    pub name: String,
    pub confidence: f64,
    #[serde(default)]
    pub slots: Slots,
}

impl Interpretation {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence,
            slots: Slots::new(),
        }
    }

    /// The "not understood" interpretation.
    pub fn none() -> Self {
        Self::new("", 1.0)
    }

    pub fn with_slot(mut self, key: impl Into<String>, value: Value) -> Self {
        self.slots.insert(key.into(), value);
        self
    }

    /// True when this interpretation carries the "not understood" sentinel.
    pub fn is_none_intent(&self) -> bool {
        self.name.is_empty() || self.name == NONE_INTENT
    }
}
