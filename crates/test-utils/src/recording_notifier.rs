use std::sync::{Arc, Mutex};

use terrapolice::errors::TerrapoliceError;
use terrapolice::notify::{Notifier, NotifyFuture, NotifyRequest};
use terrapolice::types::Status;
use tokio_util::sync::CancellationToken;

/// A notifier that records every request instead of sending it.
///
/// With `failing()`, every send is recorded and then reported as an error.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    requests: Arc<Mutex<Vec<NotifyRequest>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            requests: Arc::default(),
            fail: true,
        }
    }

    pub fn requests(&self) -> Vec<NotifyRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<Status> {
        self.requests().into_iter().map(|r| r.status).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn send<'a>(&'a self, _cx: &'a CancellationToken, request: &'a NotifyRequest) -> NotifyFuture<'a> {
        let requests = Arc::clone(&self.requests);
        let fail = self.fail;
        let request = request.clone();
        Box::pin(async move {
            requests.lock().unwrap().push(request);
            if fail {
                return Err(TerrapoliceError::NotifyError("recording notifier set to fail".to_string()));
            }
            Ok(())
        })
    }
}
