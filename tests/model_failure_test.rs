use httpmock::prelude::*;
use tempfile::TempDir;
use tidy_agent::{CleaningEngine, CliConfig, Dataset, GeminiClient, ScriptOrigin, SessionState};

const SAMPLE_CSV: &[u8] = b"id,amount\n1,10\n2,-3\n";

fn test_config(endpoint: String, output_path: String) -> CliConfig {
    CliConfig {
        input: "unused.csv".to_string(),
        endpoint,
        audit_model: "audit-model".to_string(),
        codegen_model: "codegen-model".to_string(),
        output_path,
        sample_rows: 50,
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_audit_degrades_to_empty_when_provider_fails() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    let audit_mock = server.mock(|when, then| {
        when.method(POST).path("/audit-model:generateContent");
        then.status(500).body("internal error");
    });

    let config = test_config(
        server.base_url(),
        temp_dir.path().to_str().unwrap().to_string(),
    );
    let client = GeminiClient::new(server.base_url(), "test-key");
    let mut engine = CleaningEngine::new(client, config);
    engine.load_dataset(Dataset::from_csv_bytes(SAMPLE_CSV).unwrap());

    // Best-effort audit: no issues, no error, exactly one attempt
    let count = engine.run_audit().await.unwrap();
    audit_mock.assert_hits(1);
    assert_eq!(count, 0);
    assert_eq!(engine.session().state(), SessionState::Audited);
}

#[tokio::test]
async fn test_codegen_failure_yields_visible_noop_placeholder() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/audit-model:generateContent");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "candidates": [{
                    "content": {"parts": [{"text":
                        "{\"issues\":[{\"column\":\"amount\",\"issue_type\":\"Semantic\",\"description\":\"negative amounts\",\"suggested_action\":\"drop negative rows\"}]}"
                    }]}
                }]
            }));
    });

    let codegen_mock = server.mock(|when, then| {
        when.method(POST).path("/codegen-model:generateContent");
        then.status(503).body("overloaded");
    });

    let config = test_config(
        server.base_url(),
        temp_dir.path().to_str().unwrap().to_string(),
    );
    let client = GeminiClient::new(server.base_url(), "test-key");
    let mut engine = CleaningEngine::new(client, config);
    engine.load_dataset(Dataset::from_csv_bytes(SAMPLE_CSV).unwrap());

    engine.run_audit().await.unwrap();
    let script = engine.run_generate().await.unwrap();
    codegen_mock.assert_hits(1);

    // The failure is visible in the script text and the script is inert
    assert_eq!(script.origin, ScriptOrigin::FailurePlaceholder);
    assert!(script.source.starts_with("--"));

    engine.run_execute().unwrap();
    assert_eq!(
        engine.session().cleaned().unwrap(),
        &Dataset::from_csv_bytes(SAMPLE_CSV).unwrap()
    );
}
