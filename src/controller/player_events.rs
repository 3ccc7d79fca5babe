//! Watches the audio handle for tracks that end on their own

use std::time::Duration;

use super::AppController;

const END_OF_TRACK_POLL: Duration = Duration::from_millis(500);

impl AppController {
    pub fn start_track_end_watcher(&self) {
        let controller = self.clone();
        tracing::info!("Starting track end watcher");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(END_OF_TRACK_POLL);
            loop {
                interval.tick().await;
                if controller.model.should_quit().await {
                    tracing::debug!("Track end watcher shutting down");
                    break;
                }
                match controller.model.player.finish_if_ended().await {
                    Ok(true) => tracing::debug!("Handled end of track"),
                    Ok(false) => {}
                    Err(e) => controller.report_playback_error(e).await,
                }
            }
        });
    }
}
