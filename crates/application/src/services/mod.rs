//! Application services - Use case implementations

mod calendar_service;
mod extraction_service;

pub use calendar_service::{CalendarService, PRIMARY_CALENDAR_ID};
pub use extraction_service::ExtractionService;
