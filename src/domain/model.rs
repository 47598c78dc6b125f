use serde::{Deserialize, Serialize};

/// 模型稽核回報的單一資料品質問題，建立後不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suggested_action: String,
}

impl Issue {
    /// Display-only masking of absent fields. The stored values are never
    /// rewritten; an empty description stays empty in the data.
    pub fn display_line(&self) -> String {
        let column = if self.column.is_empty() {
            "unknown column"
        } else {
            &self.column
        };
        let description = if self.description.is_empty() {
            "no description provided"
        } else {
            &self.description
        };
        let action = if self.suggested_action.is_empty() {
            "no suggested action"
        } else {
            &self.suggested_action
        };
        format!("{}: {} ({})", column, description, action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOrigin {
    /// 模型生成的腳本
    Generated,
    /// 空選擇的固定 no-op 腳本
    NoOp,
    /// 模型呼叫失敗時的註解佔位腳本
    FailurePlaceholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningScript {
    pub source: String,
    pub origin: ScriptOrigin,
}

impl CleaningScript {
    pub fn generated(source: String) -> Self {
        Self {
            source,
            origin: ScriptOrigin::Generated,
        }
    }

    pub fn noop() -> Self {
        Self {
            source: "-- no cleaning actions selected\n".to_string(),
            origin: ScriptOrigin::NoOp,
        }
    }

    pub fn failure_placeholder(message: &str) -> Self {
        // 單行註解，執行時等同 no-op，失敗原因直接顯示在腳本裡
        let sanitized = message.replace('\n', " ");
        Self {
            source: format!("-- code generation failed: {}\n", sanitized),
            origin: ScriptOrigin::FailurePlaceholder,
        }
    }
}

/// Per-session pipeline progress. Forward transitions are user-triggered;
/// re-running the audit resets everything downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Audited,
    Selected,
    Generated,
    Executed,
    ExecutionFailed,
}
