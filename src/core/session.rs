use crate::core::{CleaningScript, Dataset, Issue, SessionState};

/// 單一用戶會話的管線狀態，由 orchestrator 擁有。
/// 各階段只讀取快照，輸出經由 record_* 寫回。
#[derive(Debug, Default)]
pub struct SessionContext {
    dataset: Option<Dataset>,
    issues: Vec<Issue>,
    selected: Vec<Issue>,
    script: Option<CleaningScript>,
    cleaned: Option<Dataset>,
    state: SessionState,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn selected(&self) -> &[Issue] {
        &self.selected
    }

    pub fn script(&self) -> Option<&CleaningScript> {
        self.script.as_ref()
    }

    pub fn cleaned(&self) -> Option<&Dataset> {
        self.cleaned.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 載入新資料集會重置整個會話
    pub fn load_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.issues.clear();
        self.selected.clear();
        self.script = None;
        self.cleaned = None;
        self.state = SessionState::Empty;
    }

    /// 重跑稽核會使下游輸出（選擇、腳本、清理結果）全部失效。
    /// 預設全部 issue 都是選取狀態。
    pub fn record_audit(&mut self, issues: Vec<Issue>) {
        self.selected = issues.clone();
        self.issues = issues;
        self.script = None;
        self.cleaned = None;
        self.state = SessionState::Audited;
    }

    pub fn record_selection(&mut self, selected: Vec<Issue>) {
        self.selected = selected;
        self.script = None;
        self.cleaned = None;
        self.state = SessionState::Selected;
    }

    pub fn record_script(&mut self, script: CleaningScript) {
        self.script = Some(script);
        self.cleaned = None;
        self.state = SessionState::Generated;
    }

    pub fn record_execution_success(&mut self, cleaned: Dataset) {
        self.cleaned = Some(cleaned);
        self.state = SessionState::Executed;
    }

    /// 失敗時清理結果保持未設定，其餘狀態原封不動
    pub fn record_execution_failure(&mut self) {
        self.cleaned = None;
        self.state = SessionState::ExecutionFailed;
    }
}
