//! In-memory backend for API tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use calbridge_core::Options;
use calbridge_providers::{BoxFuture, ProviderError, ProviderResult, RemoteCalls, RemoteFunction};
use serde_json::Value;

/// Records every call. Replies with queued responses, or echoes the
/// options back when the queue is empty.
#[derive(Default)]
pub(crate) struct RecordingRemote {
    calls: Mutex<Vec<(RemoteFunction, Options)>>,
    responses: Mutex<VecDeque<ProviderResult<Value>>>,
}

impl RecordingRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_ok(&self, value: Value) {
        self.responses.lock().unwrap().push_back(Ok(value));
    }

    pub(crate) fn push_err(&self, error: ProviderError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn calls(&self) -> Vec<(RemoteFunction, Options)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn last_call(&self) -> (RemoteFunction, Options) {
        self.calls().pop().expect("no remote call recorded")
    }
}

impl RemoteCalls for RecordingRemote {
    fn name(&self) -> &str {
        "recording"
    }

    fn call(
        &self,
        function: RemoteFunction,
        options: Options,
    ) -> BoxFuture<'_, ProviderResult<Value>> {
        self.calls.lock().unwrap().push((function, options.clone()));
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Object(options)));
        Box::pin(async move { response })
    }
}
