use async_trait::async_trait;

use crate::error::ServiceError;

/// Boundary to a remote text-generation service.
///
/// Implementations return the raw text of the first response block. Any
/// transport, auth or provider failure is a [`ServiceError`].
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, ServiceError>;

    /// Model name, for logging and reports
    fn model_name(&self) -> &str;
}
