//! gantt-rs: interactive Gantt timeline engine.
//!
//! The crate keeps a strict split between pure geometry (`core`), gesture
//! state machines (`interaction`), orchestration (`api`) and backend-agnostic
//! drawing (`render`). Row storage and row virtualization are consumed through
//! traits so hosts can plug their own tree/data models in.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{TimelineEngine, TimelineEngineConfig};
pub use error::{TimelineError, TimelineResult};
