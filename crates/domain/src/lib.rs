//! Domain layer for the todo calendar service
//!
//! Contains the task and calendar event records, the value objects used to
//! carry event times and identifiers, and domain errors.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
