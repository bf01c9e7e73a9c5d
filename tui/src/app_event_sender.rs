use tokio::sync::mpsc::UnboundedSender;
use tracing::error;

use crate::app_event::AppEvent;

#[derive(Clone, Debug)]
pub(crate) struct AppEventSender {
    tx: UnboundedSender<AppEvent>,
}

impl AppEventSender {
    pub(crate) fn new(tx: UnboundedSender<AppEvent>) -> Self {
        Self { tx }
    }

    /// Sending only fails during shutdown, when the receiver is gone; the
    /// event is dropped on the floor in that case.
    pub(crate) fn send(&self, event: AppEvent) {
        if let Err(err) = self.tx.send(event) {
            error!("failed to send app event: {err}");
        }
    }
}
