//! Listener for audio output events

use tokio::sync::mpsc::UnboundedReceiver;

use crate::audio::{OutputEvent, OutputEventKind};
use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut events: UnboundedReceiver<OutputEvent>) {
        let controller = self.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if controller.model.lock().await.should_quit().await {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }

                let track_changed = matches!(event.kind, OutputEventKind::Ended);
                match &event.kind {
                    OutputEventKind::TimeUpdate(_) => tracing::trace!(?event, "Output event"),
                    _ => tracing::debug!(?event, "Output event"),
                }

                if let Some(message) = controller.player.handle_event(event).await {
                    tracing::error!(error = %message, "Playback stopped after repeated failures");
                    controller
                        .model
                        .lock()
                        .await
                        .set_error(format!("Playback failed: {}", message))
                        .await;
                }
                if track_changed {
                    controller.refresh_queue_if_visible().await;
                }
            }
        });
    }
}
