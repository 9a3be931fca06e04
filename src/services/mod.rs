//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own generation logic, output normalization and the
//! end-to-end studio flow so route handlers can stay focused on request
//! parsing and response shaping.

pub mod gateway;
pub mod normalize;
pub mod studio;

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde_json::Value;

    use super::gateway::GatewaySettings;
    use crate::upstream::{ImageModel, RawOutput, UpstreamError};

    /// Scripted [`ImageModel`]: answers calls from a queue and records them.
    pub(crate) struct MockModel {
        responses: Mutex<VecDeque<Result<RawOutput, UpstreamError>>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl MockModel {
        pub(crate) fn with_responses(responses: Vec<Result<RawOutput, UpstreamError>>) -> Self {
            Self { responses: Mutex::new(responses.into()), calls: Mutex::new(Vec::new()) }
        }

        pub(crate) fn with_output(output: RawOutput) -> Self {
            Self::with_responses(vec![Ok(output)])
        }

        pub(crate) fn with_error(err: UpstreamError) -> Self {
            Self::with_responses(vec![Err(err)])
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub(crate) fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn last_call(&self) -> Option<(String, Value)> {
            self.calls.lock().unwrap().last().cloned()
        }
    }

    #[async_trait::async_trait]
    impl ImageModel for MockModel {
        async fn run(&self, model: &str, input: &Value) -> Result<RawOutput, UpstreamError> {
            self.calls.lock().unwrap().push((model.to_string(), input.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(UpstreamError::Prediction("mock exhausted".into())))
        }
    }

    pub(crate) fn settings() -> GatewaySettings {
        GatewaySettings {
            text_model: "black-forest-labs/flux-dev".into(),
            reference_model: "black-forest-labs/flux-kontext-dev".into(),
            max_prompt_chars: 1000,
        }
    }
}
