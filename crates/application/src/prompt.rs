//! Prompt for task extraction

use chrono::NaiveDate;

use crate::task_parser::DEFAULT_YEAR;

/// System message sent with every extraction request
pub const SYSTEM_PROMPT: &str =
    "You are an assistant that extracts task information from text.";

/// Build the user prompt asking the model for a task as JSON
///
/// `today` anchors relative expressions such as "tomorrow".
pub fn extraction_prompt(text: &str, today: NaiveDate) -> String {
    format!(
        r#"Extract the task information from the text below and return it as JSON.
Information to extract:
- the task title
- the start date and time (ISO 8601: YYYY-MM-DDTHH:MM:SS)
- the end date and time (ISO 8601: YYYY-MM-DDTHH:MM:SS)
- the location, if mentioned
- a short description, if useful

If no time is stated, make a reasonable guess.
If no date is stated, use today or a future date. Today is {today}.
If the year is omitted, always use {DEFAULT_YEAR}.

Text:
{text}

JSON template:
{{
    "title": "task name",
    "start": "YYYY-MM-DDTHH:MM:SS",
    "end": "YYYY-MM-DDTHH:MM:SS",
    "location": "",
    "description": ""
}}

Respond with JSON only."#
    )
}
