//! Domain entities

mod calendar_event;
mod task_record;

pub use calendar_event::{CalendarEvent, EventPatch, EventRecord};
pub use task_record::TaskRecord;
