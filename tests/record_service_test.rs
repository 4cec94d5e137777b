//! Integration tests for patient intake against a file-backed store and a
//! mocked recognizer endpoint

use medmask::config::{FailurePolicy, MedmaskConfig, RecognizerKind};
use medmask::core::RecordService;
use medmask::domain::{MedmaskError, NewPatient, RecordView};
use tempfile::TempDir;

const SUMMARY: &str = "Anna was treated by Dr Carl at St Mary. Call 5551234567.";

fn config_for(dir: &TempDir, endpoint: String) -> MedmaskConfig {
    let mut config = MedmaskConfig::default();
    config.database.path = dir.path().join("patients.db").to_string_lossy().to_string();
    config.recognizer.kind = RecognizerKind::Http;
    config.recognizer.endpoint = Some(endpoint);
    config.recognizer.timeout_seconds = 5;
    config
}

fn ner_body() -> &'static str {
    r#"[
        {"entity_group": "PATIENT", "score": 0.99, "word": "anna", "start": 0, "end": 4},
        {"entity_group": "DOCTOR", "score": 0.95, "word": "carl", "start": 23, "end": 27},
        {"entity_group": "HOSPITAL", "score": 0.90, "word": "st mary", "start": 31, "end": 38},
        {"entity_group": "SIGN_SYMPTOM", "score": 0.80, "word": "treated", "start": 9, "end": 16}
    ]"#
}

#[tokio::test]
async fn test_add_patient_masks_and_stores_both_views() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(ner_body())
        .expect(1)
        .create_async()
        .await;

    let service = RecordService::from_config(&config_for(&dir, server.url()))
        .await
        .unwrap();

    let patient = NewPatient::new("Anna", SUMMARY)
        .unwrap()
        .with_symptoms("chest pain");
    let added = service.add_patient(patient).await.unwrap();
    mock.assert_async().await;

    let expected = "[MASKED] was treated by Dr [MASKED] at [MASKED]. Call [MASKED].";
    assert_eq!(added.masked_summary, expected);
    assert!(!added.degraded);
    assert_eq!(added.skipped, 0);

    let masked = service.list(RecordView::Masked).await.unwrap();
    assert_eq!(masked.len(), 1);
    assert_eq!(masked[0].discharge_summary, expected);
    assert_eq!(masked[0].symptoms, "chest pain");

    let raw = service.list(RecordView::Raw).await.unwrap();
    assert_eq!(raw[0].discharge_summary, SUMMARY);
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let config = config_for(&dir, server.url());

    let id = {
        let service = RecordService::from_config(&config).await.unwrap();
        service
            .add_patient(NewPatient::new("Bert", "Stable at discharge").unwrap())
            .await
            .unwrap()
            .id
    };

    let service = RecordService::from_config(&config).await.unwrap();
    let listed = service.list(RecordView::Raw).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);

    service.delete(id).await.unwrap();
    assert!(service.list(RecordView::Raw).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recognizer_outage_degrades_by_default() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(503)
        .with_body(r#"{"error": "Model is currently loading"}"#)
        .create_async()
        .await;

    let service = RecordService::from_config(&config_for(&dir, server.url()))
        .await
        .unwrap();

    let added = service
        .add_patient(NewPatient::new("Anna", SUMMARY).unwrap())
        .await
        .unwrap();

    assert!(added.degraded);
    assert_eq!(
        added.masked_summary,
        "Anna was treated by Dr Carl at St Mary. Call [MASKED]."
    );
}

#[tokio::test]
async fn test_recognizer_outage_rejects_when_configured() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(500)
        .create_async()
        .await;

    let mut config = config_for(&dir, server.url());
    config.recognizer.on_failure = FailurePolicy::Fail;
    let service = RecordService::from_config(&config).await.unwrap();

    let err = service
        .add_patient(NewPatient::new("Anna", SUMMARY).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, MedmaskError::RecognitionUnavailable(_)));
    assert!(service.list(RecordView::Raw).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_misaligned_entity_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_body(
            r#"[
                {"entity_group": "PATIENT", "score": 0.99, "word": "anna", "start": 0, "end": 4},
                {"entity_group": "DOCTOR", "score": 0.95, "word": "carl", "start": 200, "end": 204}
            ]"#,
        )
        .create_async()
        .await;

    let service = RecordService::from_config(&config_for(&dir, server.url()))
        .await
        .unwrap();

    let added = service
        .add_patient(NewPatient::new("Anna", SUMMARY).unwrap())
        .await
        .unwrap();

    assert_eq!(added.skipped, 1);
    assert!(added.masked_summary.starts_with("[MASKED] was treated by Dr Carl"));
}

#[test]
fn test_blank_fields_rejected() {
    assert!(matches!(
        NewPatient::new("", "summary"),
        Err(MedmaskError::Validation(_))
    ));
    assert!(matches!(
        NewPatient::new("Anna", "   "),
        Err(MedmaskError::Validation(_))
    ));
}
