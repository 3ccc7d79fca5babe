//! Playback control methods

use crate::model::{PlaybackError, Song};

use super::AppController;

impl AppController {
    pub async fn toggle_playback(&self) {
        match self.model.player.toggle_play_pause().await {
            Ok(Some(playing)) => {
                tracing::debug!(action = if playing { "resumed" } else { "paused" }, "Toggle handled");
            }
            Ok(None) => tracing::debug!("Nothing loaded to toggle"),
            Err(e) => self.report_playback_error(e).await,
        }
    }

    pub async fn next_track(&self) {
        tracing::debug!("Skipping to next track");
        match self.model.player.play_next().await {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Already at the end of the queue"),
            Err(e) => self.report_playback_error(e).await,
        }
    }

    /// Play a row of the list at its position in the queue.
    pub async fn play_selected(&self) {
        if let Some((index, song)) = self.model.get_selected_song().await {
            self.spawn_play(song, Some(index), false);
        }
    }

    /// Append the selected row to the queue and play it.
    pub async fn enqueue_selected(&self) {
        if let Some((_, song)) = self.model.get_selected_song().await {
            self.spawn_play(song, None, true);
        }
    }

    /// Downloads can take a while; keep the render loop running meanwhile.
    fn spawn_play(&self, song: Song, index: Option<usize>, append: bool) {
        let controller = self.clone();
        tokio::spawn(async move {
            tracing::debug!(song_id = %song.id, ?index, append, "Play requested");
            let result = if append {
                controller.model.player.play_from_list(song).await.map(|_| ())
            } else {
                controller.model.player.play_song(&song, index).await
            };
            if let Err(e) = result {
                controller.report_playback_error(e).await;
            }
        });
    }

    pub(crate) async fn report_playback_error(&self, error: PlaybackError) {
        tracing::error!(error = %error, "Playback operation failed");
        self.model.set_error(Self::format_playback_error(&error)).await;
    }
}
