//! Value Objects - Immutable, identity-less domain primitives

mod event_id;
mod event_time;

pub use event_id::EventId;
pub use event_time::{EventTime, TIMESTAMP_FORMAT};
