use std::sync::Arc;

use tracing::{error, info};

use crate::config::{self, ProviderDefaults};
use crate::envelope::{EnhanceRequest, EnhanceResponse};
use crate::llm::ChatCompletion;
use crate::task;
use crate::Result;

/// Runs the enhancement flow for one request at a time; holds no per-request state.
#[derive(Clone)]
pub struct EnhanceService {
    defaults: ProviderDefaults,
    client: Arc<dyn ChatCompletion>,
}

impl EnhanceService {
    pub fn new(defaults: ProviderDefaults, client: Arc<dyn ChatCompletion>) -> Self {
        Self { defaults, client }
    }

    /// Validate, resolve, dispatch, and wrap. Every failure becomes `success = false`.
    pub async fn enhance(&self, request: EnhanceRequest) -> EnhanceResponse {
        info!(
            target: "enhance",
            task_type = %request.task_type,
            content_length = request.content.chars().count(),
            "Received enhance request"
        );

        let result = self.process(&request).await;
        match &result {
            Ok(_) => info!(target: "enhance", task_type = %request.task_type, "Enhancement succeeded"),
            Err(e) => error!(target: "enhance", task_type = %request.task_type, error = %e, "Enhancement failed"),
        }
        EnhanceResponse::from(result)
    }

    async fn process(&self, request: &EnhanceRequest) -> Result<String> {
        let task_type = request.validate()?;

        if let Some(output) = task::preset_output(task_type, request) {
            info!(target: "enhance", task_type = %task_type, "Using caller-supplied stylesheet");
            return Ok(output);
        }

        let cfg = config::resolve(request.ai_config.as_ref(), &self.defaults)?;
        task::dispatch(task_type, &request.content, &cfg, self.client.as_ref()).await
    }
}
