//! Service wiring
//!
//! Services are built per request from the current configuration so that a
//! completed setup takes effect without a restart.

use std::sync::Arc;

use application::{ApplicationError, CalendarService, ExtractionService};
use async_trait::async_trait;

use crate::{
    adapters::{GoogleCalendarAdapter, OpenAiCompletionAdapter},
    config::AppConfig,
};

/// Builds application services from configuration
#[async_trait]
pub trait ServiceFactory: Send + Sync {
    /// Service turning free text into a task
    async fn extraction_service(&self, config: &AppConfig) -> Result<ExtractionService, ApplicationError>;

    /// Service managing calendar events
    async fn calendar_service(&self, config: &AppConfig) -> Result<CalendarService, ApplicationError>;
}

/// Factory backed by the OpenAI and Google Calendar adapters
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultServiceFactory;

#[async_trait]
impl ServiceFactory for DefaultServiceFactory {
    async fn extraction_service(&self, config: &AppConfig) -> Result<ExtractionService, ApplicationError> {
        let adapter = OpenAiCompletionAdapter::new(config.inference.clone())?;
        Ok(ExtractionService::new(Arc::new(adapter)))
    }

    async fn calendar_service(&self, config: &AppConfig) -> Result<CalendarService, ApplicationError> {
        let adapter = GoogleCalendarAdapter::connect(config.calendar.clone()).await?;
        Ok(CalendarService::new(Arc::new(adapter)))
    }
}
