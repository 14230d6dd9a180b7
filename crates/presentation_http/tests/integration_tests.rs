//! Integration tests for HTTP handlers
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use application::{
    ApplicationError, CalendarService, ExtractionService,
    ports::{CalendarError, CalendarPort, CompletionPort, CompletionResult},
};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::{
    TestServer,
    multipart::{MultipartForm, Part},
};
use domain::{CalendarEvent, EventId, EventPatch, EventRecord};
use infrastructure::{AppConfig, ServiceFactory};
use presentation_http::{ReloadableConfig, routes::create_router, state::AppState};
use serde_json::{Value, json};
use tempfile::TempDir;

const MODEL_OUTPUT: &str = r#"{"title":"Dentist","start":"2025-03-01T10:00:00","location":"Clinic"}"#;
const CREDENTIALS: &[u8] = br#"{"installed":{"client_id":"cid","client_secret":"secret"}}"#;

// ============================================================================
// Fakes
// ============================================================================

/// Completion returning canned model output
struct FakeCompletion {
    output: String,
}

#[async_trait]
impl CompletionPort for FakeCompletion {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<CompletionResult, ApplicationError> {
        Ok(CompletionResult::new(self.output.clone(), "fake-model"))
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

/// Calendar recording created events
#[derive(Default)]
struct FakeCalendar {
    created: Mutex<Vec<(String, CalendarEvent)>>,
    fail: bool,
}

#[async_trait]
impl CalendarPort for FakeCalendar {
    async fn create_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> Result<EventId, CalendarError> {
        if self.fail {
            return Err(CalendarError::OperationFailed("quota exceeded".to_string()));
        }
        self.created
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), event.clone()));
        Ok(EventId::new("evt-123"))
    }

    async fn get_event(&self, _calendar_id: &str, event_id: &EventId) -> Result<EventRecord, CalendarError> {
        Err(CalendarError::EventNotFound(event_id.to_string()))
    }

    async fn update_event(
        &self,
        _calendar_id: &str,
        event_id: &EventId,
        _patch: &EventPatch,
    ) -> Result<EventRecord, CalendarError> {
        Err(CalendarError::EventNotFound(event_id.to_string()))
    }

    async fn delete_event(&self, _calendar_id: &str, _event_id: &EventId) -> Result<bool, CalendarError> {
        Ok(true)
    }

    fn is_mock(&self) -> bool {
        false
    }
}

/// Factory that behaves like the real one regarding the API key
struct FakeFactory {
    output: String,
    calendar: Arc<FakeCalendar>,
}

#[async_trait]
impl ServiceFactory for FakeFactory {
    async fn extraction_service(&self, config: &AppConfig) -> Result<ExtractionService, ApplicationError> {
        if config.inference.api_key.is_none() {
            return Err(ApplicationError::Configuration("API key is not set".to_string()));
        }
        Ok(ExtractionService::new(Arc::new(FakeCompletion {
            output: self.output.clone(),
        })))
    }

    async fn calendar_service(&self, _config: &AppConfig) -> Result<CalendarService, ApplicationError> {
        Ok(CalendarService::new(self.calendar.clone()))
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    server: TestServer,
    calendar: Arc<FakeCalendar>,
    dir: TempDir,
}

impl Harness {
    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn scratch_env(dir: &Path, extra: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = [
        ("TODOCAL_STORAGE__SETTINGS_PATH", ".env"),
        ("TODOCAL_CALENDAR__CREDENTIALS_PATH", "credentials.json"),
        ("TODOCAL_CALENDAR__TOKEN_PATH", "token.json"),
    ]
    .iter()
    .map(|(k, file)| ((*k).to_string(), dir.join(file).to_string_lossy().into_owned()))
    .collect();
    vars.extend(extra.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));
    vars
}

fn harness_with(output: &str, calendar: FakeCalendar, extra_env: &[(&str, &str)]) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let env = scratch_env(&root, extra_env);

    let loader_env = env.clone();
    let loader_root = root.clone();
    let initial = AppConfig::load_from(&root.join("no-config"), env).unwrap();
    let config = ReloadableConfig::with_loader(
        initial,
        Arc::new(move || AppConfig::load_from(&loader_root.join("no-config"), loader_env.clone())),
    );

    let calendar = Arc::new(calendar);
    let factory = FakeFactory {
        output: output.to_string(),
        calendar: calendar.clone(),
    };
    let server = TestServer::new(create_router(AppState::new(config, Arc::new(factory))))
        .expect("Failed to create test server");

    Harness { server, calendar, dir }
}

fn harness() -> Harness {
    harness_with(MODEL_OUTPUT, FakeCalendar::default(), &[])
}

fn configured_harness() -> Harness {
    harness_with(MODEL_OUTPUT, FakeCalendar::default(), &[("OPENAI_API_KEY", "sk-test")])
}

fn setup_form(key: &str) -> MultipartForm {
    MultipartForm::new().add_text("openai_key", key).add_part(
        "credentials_file",
        Part::bytes(CREDENTIALS.to_vec())
            .file_name("credentials.json")
            .mime_type("application/json"),
    )
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn root_reports_healthy() {
    let h = harness();

    let response = h.server.get("/").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn health_alias_matches_root() {
    let h = harness();

    let response = h.server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

// ============================================================================
// Analyze
// ============================================================================

#[tokio::test]
async fn analyze_returns_task_record() {
    let h = configured_harness();

    let response = h
        .server
        .post("/analyze")
        .json(&json!({"text": "dentist on March 1st at 10am at the clinic"}))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "title": "Dentist",
            "start": "2025-03-01T10:00:00",
            "end": "2025-03-01T10:30:00",
            "location": "Clinic",
            "description": ""
        })
    );
}

#[tokio::test]
async fn analyze_without_api_key_is_server_error() {
    let h = harness();

    let response = h.server.post("/analyze").json(&json!({"text": "anything"})).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let detail = response.json::<Value>()["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("API key is not set"), "{detail}");
}

#[tokio::test]
async fn analyze_unparseable_output_is_server_error() {
    let h = harness_with("I could not find a task.", FakeCalendar::default(), &[("OPENAI_API_KEY", "sk-test")]);

    let response = h.server.post("/analyze").json(&json!({"text": "hello"})).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json::<Value>()["detail"].as_str().unwrap().starts_with("Parse error"));
}

#[tokio::test]
async fn analyze_rejects_body_without_text() {
    let h = configured_harness();

    let response = h.server.post("/analyze").json(&json!({"body": "x"})).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Calendar
// ============================================================================

#[tokio::test]
async fn calendar_add_creates_event_in_primary() {
    let h = harness();

    let response = h
        .server
        .post("/calendar/add")
        .json(&json!({
            "title": "Dentist",
            "start": "2025-03-01T10:00:00",
            "end": "2025-03-01T10:30:00",
            "location": "Clinic"
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"status": "success", "event_id": "evt-123"})
    );

    let created = h.calendar.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].0, "primary");
    assert_eq!(created[0].1.title, "Dentist");
    assert_eq!(created[0].1.location, "Clinic");
    assert_eq!(created[0].1.description, "");
}

#[tokio::test]
async fn calendar_add_accepts_missing_end() {
    let h = harness();

    let response = h
        .server
        .post("/calendar/add")
        .json(&json!({"title": "Call", "start": "2025-03-01T09:00:00"}))
        .await;

    response.assert_status_ok();
    assert!(h.calendar.created.lock().unwrap()[0].1.end.is_none());
}

#[tokio::test]
async fn calendar_provider_failure_is_server_error() {
    let h = harness_with(
        MODEL_OUTPUT,
        FakeCalendar {
            fail: true,
            ..FakeCalendar::default()
        },
        &[],
    );

    let response = h
        .server
        .post("/calendar/add")
        .json(&json!({"title": "Call", "start": "2025-03-01T09:00:00"}))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        response.json::<Value>()["detail"]
            .as_str()
            .unwrap()
            .contains("quota exceeded")
    );
}

// ============================================================================
// Setup
// ============================================================================

#[tokio::test]
async fn setup_page_is_served() {
    let h = harness();

    let response = h.server.get("/setup").await;

    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains("<form"));
    assert!(page.contains("credentials_file"));
}

#[tokio::test]
async fn setup_persists_state_and_enables_analysis() {
    let h = harness();
    h.server
        .post("/analyze")
        .json(&json!({"text": "x"}))
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let response = h.server.post("/setup").multipart(setup_form("sk-fresh")).await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Setup completed successfully");
    assert_eq!(std::fs::read(h.path("credentials.json")).unwrap(), CREDENTIALS);
    let settings = std::fs::read_to_string(h.path(".env")).unwrap();
    assert!(settings.contains("OPENAI_API_KEY=sk-fresh"));

    h.server
        .post("/analyze")
        .json(&json!({"text": "dentist"}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn api_setup_alias_is_accepted() {
    let h = harness();

    let response = h.server.post("/api/setup").multipart(setup_form("sk-alias")).await;

    response.assert_status_ok();
    assert!(h.path(".env").exists());
}

#[tokio::test]
async fn setup_without_credentials_is_unprocessable() {
    let h = harness();

    let response = h
        .server
        .post("/setup")
        .multipart(MultipartForm::new().add_text("openai_key", "sk-x"))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        response.json::<Value>()["detail"]
            .as_str()
            .unwrap()
            .contains("credentials_file")
    );
    assert!(!h.path(".env").exists());
}

#[tokio::test]
async fn setup_with_blank_key_is_unprocessable() {
    let h = harness();

    let response = h.server.post("/setup").multipart(setup_form("   ")).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
