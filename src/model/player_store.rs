//! Playback store: the queue, the current song and the one live audio handle
//!
//! Every transition runs under `op_lock`, so "release the old handle, create
//! the new one, commit" is never interleaved with another transition. The
//! state mutex is only held for short reads and writes, which keeps
//! [`PlaybackStore::snapshot`] responsive while a source is downloading.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::audio::{AudioBackend, AudioHandle};

use super::playback::{PlaybackInfo, PlaybackTiming, PlayerStatus};
use super::song::Song;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("\"{0}\" has no playable source")]
    NoPlayableSource(String),
    #[error("Could not start playback: {0:#}")]
    Handle(anyhow::Error),
    #[error("Playback control failed: {0:#}")]
    Control(anyhow::Error),
}

#[derive(Default)]
struct PlayerState {
    queue: Vec<Song>,
    current_song: Option<Song>,
    current_index: Option<usize>,
    status: PlayerStatus,
    timing: PlaybackTiming,
    handle: Option<Box<dyn AudioHandle>>,
}

impl PlayerState {
    /// Index of `song` in the queue, preferring `hint` when it points at it.
    fn resolve_index(&self, song: &Song, hint: Option<usize>) -> Option<usize> {
        match hint {
            Some(i) if self.queue.get(i).is_some_and(|queued| queued.id == song.id) => Some(i),
            _ => self.queue.iter().position(|queued| queued.id == song.id),
        }
    }

    fn release_handle(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.release();
        }
    }
}

pub struct PlaybackStore {
    backend: Arc<dyn AudioBackend>,
    op_lock: Mutex<()>,
    state: Mutex<PlayerState>,
}

impl PlaybackStore {
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self {
            backend,
            op_lock: Mutex::new(()),
            state: Mutex::new(PlayerState::default()),
        }
    }

    pub async fn set_queue(&self, songs: Vec<Song>) {
        let _op = self.op_lock.lock().await;
        let mut state = self.state.lock().await;
        state.queue = songs;
        if let Some(song) = state.current_song.clone() {
            let hint = state.current_index;
            state.current_index = state.resolve_index(&song, hint);
        } else {
            state.current_index = None;
        }
        tracing::debug!(len = state.queue.len(), current_index = ?state.current_index, "Queue replaced");
    }

    /// Play `song`, tearing down the current handle first.
    ///
    /// State is only committed once the new handle is playing. `index` is a
    /// hint: it is kept when it points at `song`, otherwise the song is
    /// looked up in the queue.
    pub async fn play_song(&self, song: &Song, index: Option<usize>) -> Result<(), PlaybackError> {
        let _op = self.op_lock.lock().await;
        self.play_locked(song, index).await
    }

    /// Append `song` to the queue and play it there.
    pub async fn play_from_list(&self, song: Song) -> Result<usize, PlaybackError> {
        let _op = self.op_lock.lock().await;
        let index = {
            let mut state = self.state.lock().await;
            state.queue.push(song.clone());
            state.queue.len() - 1
        };
        self.play_locked(&song, Some(index)).await?;
        Ok(index)
    }

    /// Pause or resume according to the store's own status.
    ///
    /// Returns the new playing flag, or `None` when there is nothing loaded.
    pub async fn toggle_play_pause(&self) -> Result<Option<bool>, PlaybackError> {
        let _op = self.op_lock.lock().await;
        let mut state = self.state.lock().await;
        let next = match (&state.handle, state.status) {
            (Some(handle), PlayerStatus::Playing) => {
                handle.pause().map_err(PlaybackError::Control)?;
                PlayerStatus::Paused
            }
            (Some(handle), PlayerStatus::Paused) => {
                handle.resume().map_err(PlaybackError::Control)?;
                PlayerStatus::Playing
            }
            _ => return Ok(None),
        };
        state.status = next;
        state.timing.set_playing(next == PlayerStatus::Playing);
        tracing::info!(status = ?next, "Playback toggled");
        Ok(Some(next == PlayerStatus::Playing))
    }

    /// Advance to the next queued song. Returns false at the end of the queue.
    pub async fn play_next(&self) -> Result<bool, PlaybackError> {
        let _op = self.op_lock.lock().await;
        self.advance_locked().await
    }

    /// Advance when the current track has played to its end.
    ///
    /// At the end of the queue the handle is released and the store goes
    /// idle, keeping the last song for display.
    pub async fn finish_if_ended(&self) -> Result<bool, PlaybackError> {
        let _op = self.op_lock.lock().await;
        {
            let state = self.state.lock().await;
            let ended = state.status == PlayerStatus::Playing
                && state.handle.as_ref().is_some_and(|handle| handle.is_finished());
            if !ended {
                return Ok(false);
            }
        }
        tracing::debug!("Track ended");
        if self.advance_locked().await? {
            return Ok(true);
        }
        let mut state = self.state.lock().await;
        state.release_handle();
        state.status = PlayerStatus::Idle;
        state.timing.set_playing(false);
        tracing::info!("Reached the end of the queue");
        Ok(true)
    }

    async fn advance_locked(&self) -> Result<bool, PlaybackError> {
        let (next_song, next_index) = {
            let state = self.state.lock().await;
            let next_index = state.current_index.map_or(0, |i| i + 1);
            match state.queue.get(next_index) {
                Some(song) => (song.clone(), next_index),
                None => {
                    tracing::debug!(next_index, len = state.queue.len(), "No next song in queue");
                    return Ok(false);
                }
            }
        };
        self.play_locked(&next_song, Some(next_index)).await?;
        Ok(true)
    }

    async fn play_locked(&self, song: &Song, index: Option<usize>) -> Result<(), PlaybackError> {
        let Some(url) = song.playable_url().map(str::to_string) else {
            tracing::warn!(song_id = %song.id, "Song has no playable source");
            return Err(PlaybackError::NoPlayableSource(song.name.clone()));
        };

        {
            let mut state = self.state.lock().await;
            state.release_handle();
            state.status = PlayerStatus::Loading;
            state.timing.set_playing(false);
        }

        tracing::debug!(song_id = %song.id, url = %url, "Creating audio handle");
        match self.backend.create_and_play(&url).await {
            Ok(handle) => {
                let mut state = self.state.lock().await;
                state.handle = Some(handle);
                state.current_index = state.resolve_index(song, index);
                state.current_song = Some(song.clone());
                state.status = PlayerStatus::Playing;
                state.timing = PlaybackTiming::started(song.duration_ms());
                tracing::info!(
                    song_id = %song.id,
                    name = %song.name,
                    index = ?state.current_index,
                    "Now playing"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(song_id = %song.id, error = %e, "Audio handle creation failed");
                let mut state = self.state.lock().await;
                state.status = PlayerStatus::Idle;
                Err(PlaybackError::Handle(e))
            }
        }
    }

    pub async fn snapshot(&self) -> PlaybackInfo {
        let state = self.state.lock().await;
        PlaybackInfo {
            current_song: state.current_song.clone(),
            current_index: state.current_index,
            status: state.status,
            queue_len: state.queue.len(),
            progress_ms: state.timing.current_position_ms(),
            duration_ms: state.timing.duration_ms,
        }
    }

    /// Release the handle on shutdown.
    pub async fn stop(&self) {
        let _op = self.op_lock.lock().await;
        let mut state = self.state.lock().await;
        state.release_handle();
        state.status = PlayerStatus::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::audio::fake::FakeBackend;
    use crate::model::song::test_song;

    impl PlaybackStore {
        async fn queue(&self) -> Vec<Song> {
            self.state.lock().await.queue.clone()
        }

        async fn current_song(&self) -> Option<Song> {
            self.state.lock().await.current_song.clone()
        }

        async fn current_index(&self) -> Option<usize> {
            self.state.lock().await.current_index
        }

        async fn is_playing(&self) -> bool {
            self.state.lock().await.status == PlayerStatus::Playing
        }
    }

    fn store() -> (Arc<PlaybackStore>, FakeBackend) {
        let backend = FakeBackend::default();
        (Arc::new(PlaybackStore::new(Arc::new(backend.clone()))), backend)
    }

    #[tokio::test]
    async fn play_next_advances_through_queue() {
        let (store, backend) = store();
        let (a, b, c) = (test_song("a"), test_song("b"), test_song("c"));
        store.set_queue(vec![a.clone(), b.clone(), c]).await;
        store.play_song(&a, Some(0)).await.unwrap();

        assert!(store.play_next().await.unwrap());
        assert_eq!(store.current_song().await, Some(b));
        assert_eq!(store.current_index().await, Some(1));
        assert!(store.is_playing().await);

        // Highest quality variant is the last one listed
        let urls = backend.meter.loaded_urls.lock().unwrap().clone();
        assert_eq!(urls, ["https://cdn.test/a-320.mp4", "https://cdn.test/b-320.mp4"]);
    }

    #[tokio::test]
    async fn play_next_at_last_index_is_a_noop() {
        let (store, backend) = store();
        let a = test_song("a");
        store.set_queue(vec![a.clone()]).await;
        store.play_song(&a, Some(0)).await.unwrap();

        assert!(!store.play_next().await.unwrap());
        assert_eq!(store.current_song().await, Some(a));
        assert_eq!(store.current_index().await, Some(0));
        assert!(store.is_playing().await);
        assert_eq!(backend.meter.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn play_next_on_empty_queue_is_a_noop() {
        let (store, backend) = store();
        store.set_queue(Vec::new()).await;

        assert!(!store.play_next().await.unwrap());
        let info = store.snapshot().await;
        assert_eq!(info.status, PlayerStatus::Idle);
        assert!(info.current_song.is_none());
        assert_eq!(backend.meter.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn play_next_from_idle_starts_at_the_head() {
        let (store, _) = store();
        let a = test_song("a");
        store.set_queue(vec![a.clone(), test_song("b")]).await;

        assert!(store.play_next().await.unwrap());
        assert_eq!(store.current_song().await, Some(a));
        assert_eq!(store.current_index().await, Some(0));
    }

    #[tokio::test]
    async fn play_from_list_appends_and_plays() {
        let (store, _) = store();
        store.set_queue(vec![test_song("a"), test_song("b")]).await;
        let extra = test_song("z");

        let index = store.play_from_list(extra.clone()).await.unwrap();
        assert_eq!(index, 2);
        assert_eq!(store.queue().await.len(), 3);
        assert_eq!(store.current_song().await, Some(extra));
        assert_eq!(store.current_index().await, Some(2));
    }

    #[tokio::test]
    async fn concurrent_play_from_list_keeps_indices_consistent() {
        let (store, _) = store();
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.play_from_list(test_song(&i.to_string())).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let queue = store.queue().await;
        assert_eq!(queue.len(), 8);
        let current = store.current_song().await.unwrap();
        let index = store.current_index().await.unwrap();
        assert_eq!(queue[index].id, current.id);
    }

    #[tokio::test]
    async fn at_most_one_handle_is_ever_live() {
        let (store, backend) = store();
        let songs: Vec<Song> = (0..6).map(|i| test_song(&i.to_string())).collect();
        store.set_queue(songs.clone()).await;

        let tasks: Vec<_> = songs
            .into_iter()
            .map(|song| {
                let store = store.clone();
                tokio::spawn(async move { store.play_song(&song, None).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        store.play_next().await.unwrap();

        assert_eq!(backend.meter.max_live.load(Ordering::SeqCst), 1);
        assert_eq!(backend.meter.live.load(Ordering::SeqCst), 1);
        store.stop().await;
        assert_eq!(backend.meter.live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn song_without_source_changes_nothing() {
        let (store, backend) = store();
        let a = test_song("a");
        store.set_queue(vec![a.clone()]).await;
        store.play_song(&a, Some(0)).await.unwrap();

        let mut silent = test_song("silent");
        silent.sources.clear();
        let err = store.play_song(&silent, None).await.unwrap_err();
        assert!(matches!(err, PlaybackError::NoPlayableSource(_)));

        assert_eq!(store.current_song().await, Some(a));
        assert_eq!(store.current_index().await, Some(0));
        assert!(store.is_playing().await);
        assert_eq!(backend.meter.created.load(Ordering::SeqCst), 1);
        assert_eq!(backend.meter.live.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn song_without_source_on_fresh_store_creates_no_handle() {
        let (store, backend) = store();
        let mut silent = test_song("silent");
        silent.sources.clear();

        assert!(store.play_song(&silent, None).await.is_err());
        let info = store.snapshot().await;
        assert!(info.current_song.is_none());
        assert_eq!(info.status, PlayerStatus::Idle);
        assert_eq!(backend.meter.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_handle_creation_ends_idle_without_handle() {
        let (store, backend) = store();
        let (a, b) = (test_song("a"), test_song("b"));
        store.set_queue(vec![a.clone(), b.clone()]).await;
        store.play_song(&a, Some(0)).await.unwrap();

        backend.meter.fail_next_create.store(true, Ordering::SeqCst);
        let err = store.play_song(&b, Some(1)).await.unwrap_err();
        assert!(matches!(err, PlaybackError::Handle(_)));

        assert!(!store.is_playing().await);
        assert_eq!(store.snapshot().await.status, PlayerStatus::Idle);
        assert_eq!(backend.meter.live.load(Ordering::SeqCst), 0);
        // Nothing to toggle once the handle is gone
        assert_eq!(store.toggle_play_pause().await.unwrap(), None);

        store.play_song(&b, Some(1)).await.unwrap();
        assert!(store.is_playing().await);
    }

    #[tokio::test]
    async fn toggle_without_handle_is_a_noop() {
        let (store, _) = store();
        store.set_queue(vec![test_song("a")]).await;

        assert_eq!(store.toggle_play_pause().await.unwrap(), None);
        let info = store.snapshot().await;
        assert_eq!(info.status, PlayerStatus::Idle);
        assert_eq!(info.queue_len, 1);
        assert!(info.current_song.is_none());
    }

    #[tokio::test]
    async fn toggle_flips_between_playing_and_paused() {
        let (store, backend) = store();
        let a = test_song("a");
        store.play_song(&a, None).await.unwrap();

        assert_eq!(store.toggle_play_pause().await.unwrap(), Some(false));
        assert!(backend.meter.paused.load(Ordering::SeqCst));
        assert_eq!(store.snapshot().await.status, PlayerStatus::Paused);

        assert_eq!(store.toggle_play_pause().await.unwrap(), Some(true));
        assert!(!backend.meter.paused.load(Ordering::SeqCst));
        assert!(store.is_playing().await);
    }

    #[tokio::test]
    async fn failed_pause_keeps_status() {
        let (store, backend) = store();
        store.play_song(&test_song("a"), None).await.unwrap();
        backend.meter.fail_control.store(true, Ordering::SeqCst);

        assert!(matches!(
            store.toggle_play_pause().await,
            Err(PlaybackError::Control(_))
        ));
        assert!(store.is_playing().await);
    }

    #[tokio::test]
    async fn play_song_outside_queue_clears_index() {
        let (store, _) = store();
        store.set_queue(vec![test_song("a")]).await;
        store.play_song(&test_song("a"), Some(0)).await.unwrap();

        store.play_song(&test_song("elsewhere"), None).await.unwrap();
        assert_eq!(store.current_index().await, None);
    }

    #[tokio::test]
    async fn wrong_index_hint_is_resolved_by_id() {
        let (store, _) = store();
        let (a, b) = (test_song("a"), test_song("b"));
        store.set_queue(vec![a, b.clone()]).await;

        store.play_song(&b, Some(0)).await.unwrap();
        assert_eq!(store.current_index().await, Some(1));
    }

    #[tokio::test]
    async fn set_queue_keeps_playback_and_reresolves_index() {
        let (store, backend) = store();
        let (a, b) = (test_song("a"), test_song("b"));
        store.set_queue(vec![a.clone(), b.clone()]).await;
        store.play_song(&b, Some(1)).await.unwrap();

        store.set_queue(vec![b.clone(), a.clone(), test_song("c")]).await;
        assert!(store.is_playing().await);
        assert_eq!(store.current_index().await, Some(0));

        store.set_queue(vec![test_song("x")]).await;
        assert_eq!(store.current_index().await, None);
        assert_eq!(store.current_song().await, Some(b));
        assert_eq!(backend.meter.live.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn natural_end_advances_then_goes_idle() {
        let (store, backend) = store();
        let (a, b) = (test_song("a"), test_song("b"));
        store.set_queue(vec![a.clone(), b.clone()]).await;
        store.play_song(&a, Some(0)).await.unwrap();

        assert!(!store.finish_if_ended().await.unwrap());

        backend.meter.finished.store(true, Ordering::SeqCst);
        assert!(store.finish_if_ended().await.unwrap());
        assert_eq!(store.current_song().await, Some(b.clone()));
        assert!(store.is_playing().await);

        backend.meter.finished.store(true, Ordering::SeqCst);
        assert!(store.finish_if_ended().await.unwrap());
        let info = store.snapshot().await;
        assert_eq!(info.status, PlayerStatus::Idle);
        assert_eq!(info.current_song, Some(b));
        assert_eq!(backend.meter.live.load(Ordering::SeqCst), 0);
    }
}
