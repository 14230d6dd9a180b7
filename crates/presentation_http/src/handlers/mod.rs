//! HTTP request handlers

pub mod analyze;
pub mod calendar;
pub mod health;
pub mod setup;
