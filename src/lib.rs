//! palaver — a conversational-turn dispatcher.
//!
//! Given free-text user input, the dispatcher queries every configured NLU
//! classifier in parallel, selects a single winning interpretation across
//! the results, resolves it to a registered action, fulfills the action, and
//! routes the fulfillment result to the handler bound to the interpretation
//! name, falling back to the default handler when nothing matches.

pub mod error;

pub mod action;
pub mod bot;
pub mod classifier;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod interpretation;
pub mod selection;
pub mod weather;

pub use crate::action::{Action, ActionBinding, ActionRegistry};
pub use crate::bot::WeatherBot;
pub use crate::classifier::IntentClassifier;
pub use crate::config::BotSettings;
pub use crate::context::{ConversationContext, PendingInput, Presentable};
pub use crate::dispatch::{Dispatcher, HandlerBinding, HandlerRegistry};
pub use crate::error::{DispatchError, DispatchResult};
pub use crate::interpretation::{Interpretation, NONE_INTENT};
pub use crate::selection::{select_winner, Winner};
