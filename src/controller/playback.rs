//! Playback control methods

use crate::error::PlaybackError;
use crate::model::{ContentView, SelectedItem};

use super::AppController;

impl AppController {
    pub async fn toggle_playback(&self) {
        let playing = self.player.toggle_play().await;
        tracing::info!(action = if playing { "resumed" } else { "paused" }, "Playback toggled");
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        self.player.next().await;
        self.refresh_queue_if_visible().await;
    }

    pub async fn previous_track(&self) {
        tracing::debug!("Skipping to previous track");
        self.player.previous().await;
        self.refresh_queue_if_visible().await;
    }

    pub async fn seek(&self, forward: bool) {
        let step = self.settings.playback.seek_step_secs as i64;
        let delta = if forward { step } else { -step };
        if let Err(e) = self.player.seek_by(delta).await {
            self.report_playback_error(e).await;
        }
    }

    pub async fn toggle_shuffle(&self) {
        let shuffle = self.player.toggle_shuffle().await;
        tracing::info!(shuffle, "Shuffle toggled");
    }

    pub async fn cycle_repeat(&self) {
        let repeat = self.player.toggle_repeat().await;
        tracing::info!(repeat = repeat.label(), "Repeat mode changed");
    }

    pub async fn volume_up(&self) {
        match self.player.volume_up(self.settings.playback.volume_step).await {
            Ok(volume) => tracing::debug!(volume, "Volume up"),
            Err(e) => self.report_playback_error(e).await,
        }
    }

    pub async fn volume_down(&self) {
        match self.player.volume_down(self.settings.playback.volume_step).await {
            Ok(volume) => tracing::debug!(volume, "Volume down"),
            Err(e) => self.report_playback_error(e).await,
        }
    }

    /// Appends the track under the cursor to the queue
    pub async fn add_selected_to_queue(&self) {
        let model = self.model.lock().await;
        if let Some(SelectedItem::Track { track, .. }) = model.get_selected_content_item().await {
            tracing::info!(track = %track.name(), "Added to queue");
            model.set_info(format!("Added \"{}\" to queue", track.name())).await;
            drop(model);
            self.player.add_to_queue(track).await;
        }
    }

    pub async fn remove_selected_from_queue(&self) {
        let selected = self.model.lock().await.get_selected_content_item().await;
        if let Some(SelectedItem::QueueEntry { index }) = selected {
            if let Err(e) = self.player.remove_from_queue(index).await {
                self.report_playback_error(e).await;
            }
            self.refresh_queue_if_visible().await;
        }
    }

    pub async fn clear_queue(&self) {
        self.player.clear_queue().await;
        tracing::info!("Queue cleared");
        self.refresh_queue_if_visible().await;
    }

    /// Keeps the queue screen cursor on a valid row after the queue changed
    pub async fn refresh_queue_if_visible(&self) {
        let model = self.model.lock().await;
        let on_queue = model
            .with_view(|view| matches!(view, ContentView::Queue { .. }))
            .await;
        if on_queue {
            let queue_len = self.player.queue_len().await;
            model.clamp_queue_selection(queue_len).await;
        }
    }

    async fn report_playback_error(&self, error: PlaybackError) {
        tracing::warn!(error = %error, "Playback command rejected");
        self.model.lock().await.set_error(error.to_string()).await;
    }
}
