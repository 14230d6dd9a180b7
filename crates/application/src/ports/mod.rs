//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod calendar_port;
mod completion_port;

#[cfg(test)]
pub use calendar_port::MockCalendarPort;
pub use calendar_port::{CalendarError, CalendarPort};
#[cfg(test)]
pub use completion_port::MockCompletionPort;
pub use completion_port::{CompletionPort, CompletionResult};
