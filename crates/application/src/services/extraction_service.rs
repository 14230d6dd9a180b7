//! Extraction service
//!
//! Turns free text into a [`TaskRecord`] through a completion call and the
//! task parsing pipeline.

use std::{fmt, sync::Arc};

use chrono::{Local, NaiveDateTime, Timelike};
use domain::TaskRecord;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::CompletionPort,
    prompt::{SYSTEM_PROMPT, extraction_prompt},
    task_parser::{ParseOutcome, build_task, parse_model_output},
};

/// Service extracting tasks from natural-language text
pub struct ExtractionService {
    completion: Arc<dyn CompletionPort>,
}

impl fmt::Debug for ExtractionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionService")
            .field("model", &self.completion.model_name())
            .finish_non_exhaustive()
    }
}

impl ExtractionService {
    /// Create a new extraction service
    pub fn new(completion: Arc<dyn CompletionPort>) -> Self {
        Self { completion }
    }

    /// Extract a task, using the local clock for a missing start time
    pub async fn extract_task(&self, text: &str) -> Result<TaskRecord, ApplicationError> {
        let now = Local::now().naive_local();
        self.extract_task_at(text, now.with_nanosecond(0).unwrap_or(now))
            .await
    }

    /// Extract a task relative to the given local time
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn extract_task_at(
        &self,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<TaskRecord, ApplicationError> {
        let prompt = extraction_prompt(text, now.date());
        let completion = self.completion.complete(SYSTEM_PROMPT, &prompt).await?;

        debug!(model = %completion.model, output = %completion.content, "Model output received");

        let outcome = parse_model_output(&completion.content);
        if let ParseOutcome::Failed(failure) = &outcome {
            warn!(error = %failure, "Model output is not a JSON object");
        }
        let fields = outcome.into_result()?;

        let task = build_task(&fields, now)?;
        info!(title = %task.title, start = %task.start, "Extracted task");
        Ok(task)
    }
}
