//! Scriptable transport for forwarder and gateway tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use super::transport::{TransportError, TransportResponse, WebhookTransport};

/// What the fake webhook does for one call.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scripted {
    Status(u16),
    Refused,
    Broken,
    Hang,
}

/// Records every call and answers from a script.
pub(crate) struct RecordingTransport {
    calls: Mutex<Vec<(String, Value)>>,
    script: Mutex<VecDeque<Scripted>>,
    fallback: Scripted,
    called: Notify,
}

impl RecordingTransport {
    /// Answer every call with `fallback`.
    pub(crate) fn always(fallback: Scripted) -> Self {
        Self::scripted(Vec::new(), fallback)
    }

    /// Answer with `script` in order, then with `fallback`.
    pub(crate) fn scripted(script: Vec<Scripted>, fallback: Scripted) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
            fallback,
            called: Notify::new(),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Wait (bounded) until at least `n` calls were made.
    pub(crate) async fn wait_for_calls(&self, n: usize) -> bool {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let notified = self.called.notified();
                if self.call_count() >= n {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }
}

#[async_trait]
impl WebhookTransport for RecordingTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
    ) -> Result<TransportResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        self.called.notify_waiters();

        let step = self.script.lock().unwrap().pop_front().unwrap_or(self.fallback);

        match step {
            Scripted::Status(status) => Ok(TransportResponse {
                status,
                body: format!("{{\"status\":{status}}}"),
            }),
            Scripted::Refused => Err(TransportError::Connect("connection refused".into())),
            Scripted::Broken => Err(TransportError::Other("invalid response".into())),
            Scripted::Hang => std::future::pending().await,
        }
    }
}
