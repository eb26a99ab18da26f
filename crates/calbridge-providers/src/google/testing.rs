//! In-memory transport for primitive tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use super::client::{ApiRequest, GoogleTransport};
use crate::error::{ProviderError, ProviderResult};
use crate::remote::BoxFuture;

/// Replays queued responses and records every request.
#[derive(Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<ProviderResult<Value>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_ok(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub(crate) fn push_err(&self, error: ProviderError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl GoogleTransport for MockTransport {
    fn execute(&self, request: ApiRequest) -> BoxFuture<'_, ProviderResult<Value>> {
        self.requests.lock().unwrap().push(request);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::internal("no response queued")));
        Box::pin(async move { response })
    }
}
