use crate::adapters::storage::EXPORT_FILENAME;
use crate::core::session::SessionContext;
use crate::core::{audit, codegen, executor, selection};
use crate::core::{CleaningScript, ConfigProvider, Dataset, ModelClient, Storage};
use crate::utils::error::{CleanerError, Result};
use crate::utils::monitor::SystemMonitor;

/// Pipeline orchestrator. Owns the session context; every public method is
/// one user-triggered stage, run synchronously to completion. No retries.
pub struct CleaningEngine<M: ModelClient, C: ConfigProvider> {
    client: M,
    config: C,
    monitor: SystemMonitor,
    session: SessionContext,
}

impl<M: ModelClient, C: ConfigProvider> CleaningEngine<M, C> {
    pub fn new(client: M, config: C) -> Self {
        Self::new_with_monitoring(client, config, false)
    }

    pub fn new_with_monitoring(client: M, config: C, monitor_enabled: bool) -> Self {
        Self {
            client,
            config,
            monitor: SystemMonitor::new(monitor_enabled),
            session: SessionContext::new(),
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn load_dataset(&mut self, dataset: Dataset) {
        let (rows, columns) = dataset.shape();
        tracing::info!("📂 Dataset loaded: {} rows, {} columns", rows, columns);
        self.session.load_dataset(dataset);
    }

    /// 稽核階段：失敗時降級為空清單，不會讓錯誤往上傳
    pub async fn run_audit(&mut self) -> Result<usize> {
        let issues = {
            let dataset = self.session.dataset().ok_or(CleanerError::InputError {
                message: "no dataset loaded".to_string(),
            })?;
            audit::analyze(
                dataset,
                self.config.sample_rows(),
                &self.client,
                self.config.audit_model(),
            )
            .await
        };

        let count = issues.len();
        tracing::info!("🔍 Audit finished: {} issues detected", count);
        self.session.record_audit(issues);
        self.monitor.log_stats("Audit");
        Ok(count)
    }

    /// 選擇階段：純投影，included 缺項視為選取
    pub fn apply_selection(&mut self, included: &[bool]) -> Result<usize> {
        if self.session.issues().is_empty() {
            return Err(CleanerError::InputError {
                message: "no audit issues to select from".to_string(),
            });
        }

        let selected = selection::select(self.session.issues(), included);
        let count = selected.len();
        tracing::info!(
            "☑️ {} actions selected of {}",
            count,
            self.session.issues().len()
        );
        self.session.record_selection(selected);
        Ok(count)
    }

    /// 生成階段：空選擇短路為 no-op，模型失敗降級為註解腳本
    pub async fn run_generate(&mut self) -> Result<CleaningScript> {
        let script = {
            let dataset = self.session.dataset().ok_or(CleanerError::InputError {
                message: "no dataset loaded".to_string(),
            })?;
            let type_map = dataset.type_map();
            codegen::generate(
                &type_map,
                self.session.selected(),
                &self.client,
                self.config.codegen_model(),
            )
            .await
        };

        self.session.record_script(script.clone());
        self.monitor.log_stats("Generate");
        Ok(script)
    }

    /// 執行階段：失敗時回傳錯誤、清理結果保持未設定、前面的狀態不變
    pub fn run_execute(&mut self) -> Result<(usize, usize)> {
        let script = self
            .session
            .script()
            .ok_or(CleanerError::InputError {
                message: "no cleaning script generated".to_string(),
            })?
            .source
            .clone();
        let dataset = self.session.dataset().ok_or(CleanerError::InputError {
            message: "no dataset loaded".to_string(),
        })?;

        match executor::execute(&script, dataset) {
            Ok(cleaned) => {
                let shape = cleaned.shape();
                tracing::info!("✅ Cleaning done: final shape {:?}", shape);
                self.session.record_execution_success(cleaned);
                self.monitor.log_stats("Execute");
                Ok(shape)
            }
            Err(e) => {
                tracing::error!("❌ Script execution failed: {}", e);
                self.session.record_execution_failure();
                Err(e)
            }
        }
    }

    /// 匯出清理後的資料集為 UTF-8 CSV
    pub async fn export<S: Storage>(&self, storage: &S) -> Result<String> {
        let cleaned = self.session.cleaned().ok_or(CleanerError::InputError {
            message: "no cleaned dataset to export".to_string(),
        })?;

        let bytes = cleaned.to_csv_bytes()?;
        storage.write_file(EXPORT_FILENAME, &bytes).await?;

        let path = format!("{}/{}", self.config.output_path(), EXPORT_FILENAME);
        tracing::info!("📥 Cleaned CSV written to {}", path);
        Ok(path)
    }
}
