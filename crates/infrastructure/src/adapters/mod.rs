//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod google_calendar_adapter;
mod openai_completion_adapter;

pub use google_calendar_adapter::GoogleCalendarAdapter;
pub use openai_completion_adapter::OpenAiCompletionAdapter;
