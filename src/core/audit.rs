use crate::core::{Dataset, Issue, ModelClient};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct AuditReport {
    #[serde(default)]
    issues: Vec<Issue>,
}

/// 稽核回應的結構化輸出 schema：四個欄位全部必填
pub fn issue_list_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "issues": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "column": { "type": "STRING" },
                        "issue_type": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "suggested_action": { "type": "STRING" }
                    },
                    "required": ["column", "issue_type", "description", "suggested_action"]
                }
            }
        },
        "required": ["issues"]
    })
}

fn build_audit_prompt(dataset: &Dataset, sample_rows: usize) -> String {
    let (row_count, column_count) = dataset.shape();

    let mut body = String::new();
    body.push_str("You are a senior data engineer auditing a tabular dataset for quality problems.\n\n");
    body.push_str(&format!(
        "The dataset has {} rows and {} columns.\n\nCOLUMNS (name, inferred type, null count):\n",
        row_count, column_count
    ));
    body.push_str(&dataset.schema_summary());
    body.push_str(&format!("\nFIRST {} ROWS:\n", sample_rows.min(row_count)));
    body.push_str(&dataset.head_text(sample_rows));
    body.push_str(
        "\nYour mission:\n\
         1. Detect TYPE anomalies (numbers or dates stored as text).\n\
         2. Detect FORMAT anomalies (mixed date formats, prices with currency symbols).\n\
         3. Detect SEMANTIC anomalies (duplicate ids, negative quantities, category typos).\n\
         4. Suggest robust fixes (coerce with fallbacks, regex cleanup).\n\n\
         Fill in ALL fields for every issue, including description.\n\
         Return strictly the defined JSON format.\n",
    );
    body
}

/// 單次嘗試、盡力而為：模型失敗時回傳空清單，由呼叫端提示用戶
pub async fn analyze<M: ModelClient>(
    dataset: &Dataset,
    sample_rows: usize,
    client: &M,
    model: &str,
) -> Vec<Issue> {
    let prompt = build_audit_prompt(dataset, sample_rows);

    let value = match client.invoke(model, &prompt, &issue_list_schema()).await {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("❌ Audit model call failed: {}", e);
            return Vec::new();
        }
    };

    // 診斷用：記錄第一筆 issue 的欄位鍵
    if let Some(first) = value
        .get("issues")
        .and_then(|issues| issues.get(0))
        .and_then(|issue| issue.as_object())
    {
        tracing::debug!("🔍 First issue keys: {:?}", first.keys().collect::<Vec<_>>());
    }

    match serde_json::from_value::<AuditReport>(value) {
        Ok(report) => report.issues,
        Err(e) => {
            tracing::error!("❌ Audit response did not match the issue schema: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{CleanerError, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockModelClient {
        response: Result<serde_json::Value>,
        calls: AtomicUsize,
    }

    impl MockModelClient {
        fn returning(value: serde_json::Value) -> Self {
            Self {
                response: Ok(value),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(CleanerError::ModelError {
                    message: "connection refused".to_string(),
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for MockModelClient {
        async fn invoke(
            &self,
            _model: &str,
            _prompt: &str,
            _schema: &serde_json::Value,
        ) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.response {
                Ok(value) => Ok(value.clone()),
                Err(CleanerError::ModelError { message }) => Err(CleanerError::ModelError {
                    message: message.clone(),
                }),
                Err(_) => unreachable!(),
            }
        }
    }

    fn sample_dataset() -> Dataset {
        Dataset::from_csv_bytes(b"id,price,quantity\n1,$12.50,3\n2,$8.00,-1\n").unwrap()
    }

    #[test]
    fn test_audit_prompt_contains_schema_and_sample() {
        let prompt = build_audit_prompt(&sample_dataset(), 50);
        assert!(prompt.contains("2 rows and 3 columns"));
        assert!(prompt.contains("- price (text, 0 nulls)"));
        assert!(prompt.contains("id | price | quantity"));
        assert!(prompt.contains("1 | $12.50 | 3"));
    }

    #[test]
    fn test_audit_prompt_caps_sample_rows() {
        let prompt = build_audit_prompt(&sample_dataset(), 1);
        assert!(prompt.contains("FIRST 1 ROWS"));
        assert!(!prompt.contains("2 | $8.00 | -1"));
    }

    #[tokio::test]
    async fn test_analyze_parses_issue_list() {
        let client = MockModelClient::returning(json!({
            "issues": [{
                "column": "price",
                "issue_type": "Format",
                "description": "currency symbol in numeric column",
                "suggested_action": "strip symbols and coerce to number"
            }]
        }));

        let issues = analyze(&sample_dataset(), 50, &client, "test-model").await;

        assert_eq!(client.call_count(), 1);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column, "price");
    }

    #[tokio::test]
    async fn test_analyze_masks_missing_fields_for_display_only() {
        let client = MockModelClient::returning(json!({
            "issues": [{ "column": "price", "issue_type": "Format" }]
        }));

        let issues = analyze(&sample_dataset(), 50, &client, "test-model").await;

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].description, "");
        assert!(issues[0].display_line().contains("no description provided"));
    }

    #[tokio::test]
    async fn test_analyze_degrades_to_empty_on_model_failure() {
        let client = MockModelClient::failing();
        let issues = analyze(&sample_dataset(), 50, &client, "test-model").await;
        assert!(issues.is_empty());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_degrades_to_empty_on_shape_mismatch() {
        let client = MockModelClient::returning(json!({ "issues": "not-a-list" }));
        let issues = analyze(&sample_dataset(), 50, &client, "test-model").await;
        assert!(issues.is_empty());
    }
}
