use std::sync::Arc;

use tokio::sync::Notify;

/// Shared by the read and write halves of one subscription. Whichever half
/// stops first tells the other one to stop too.
#[derive(Clone, Default)]
pub struct Session {
    stop: Arc<Notify>,
}

impl Session {
    pub async fn stopped(&self) {
        self.stop.notified().await
    }

    pub fn stop(&self) {
        self.stop.notify_one();
    }
}
