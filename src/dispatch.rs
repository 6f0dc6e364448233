//! Turn dispatch: the declarative handler registry and the per-turn
//! orchestration protocol.

pub mod dispatcher;
pub mod handler;

pub use dispatcher::Dispatcher;
pub use handler::{
    handler, simple_handler, FulfillmentResult, HandlerBinding, HandlerFn, HandlerRegistry,
    DEFAULT_INTENT,
};
