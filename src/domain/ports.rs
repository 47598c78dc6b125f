use crate::utils::error::Result;
use async_trait::async_trait;

/// Hosted generative-model endpoint. One polymorphic invocation shape:
/// prompt in, schema-constrained JSON out. Stage-specific prompt builders
/// live with their stages.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(
        &self,
        model: &str,
        prompt: &str,
        response_schema: &serde_json::Value,
    ) -> Result<serde_json::Value>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn audit_model(&self) -> &str;
    fn codegen_model(&self) -> &str;
    fn sample_rows(&self) -> usize;
}
