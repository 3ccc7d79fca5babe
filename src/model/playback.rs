//! Playback-related types shared by the store and the view

use std::time::Instant;

use super::song::Song;

/// Lifecycle of the single audio handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    /// No handle
    #[default]
    Idle,
    /// A handle is being created
    Loading,
    Playing,
    Paused,
}

/// Timing state for the progress gauge
#[derive(Clone, Debug)]
pub struct PlaybackTiming {
    pub position_ms: u32,
    pub last_update: Instant,
    pub is_playing: bool,
    pub duration_ms: u32,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            position_ms: 0,
            last_update: Instant::now(),
            is_playing: false,
            duration_ms: 0,
        }
    }
}

impl PlaybackTiming {
    pub fn started(duration_ms: u32) -> Self {
        Self {
            position_ms: 0,
            last_update: Instant::now(),
            is_playing: true,
            duration_ms,
        }
    }

    pub fn current_position_ms(&self) -> u32 {
        let position = if self.is_playing {
            let elapsed = u32::try_from(self.last_update.elapsed().as_millis()).unwrap_or(u32::MAX);
            self.position_ms.saturating_add(elapsed)
        } else {
            self.position_ms
        };
        if self.duration_ms > 0 {
            position.min(self.duration_ms)
        } else {
            position
        }
    }

    /// Freeze or resume the clock at the current position.
    pub fn set_playing(&mut self, is_playing: bool) {
        self.position_ms = self.current_position_ms();
        self.last_update = Instant::now();
        self.is_playing = is_playing;
    }
}

/// Everything the view needs to draw the player bar
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub current_song: Option<Song>,
    pub current_index: Option<usize>,
    pub status: PlayerStatus,
    pub queue_len: usize,
    pub progress_ms: u32,
    pub duration_ms: u32,
}

impl PlaybackInfo {
    pub fn is_playing(&self) -> bool {
        self.status == PlayerStatus::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn paused_clock_does_not_advance() {
        let mut timing = PlaybackTiming::started(10_000);
        timing.position_ms = 1_500;
        timing.set_playing(false);
        let frozen = timing.current_position_ms();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(timing.current_position_ms(), frozen);
    }

    #[test]
    fn position_is_capped_at_duration() {
        let mut timing = PlaybackTiming::started(1_000);
        timing.position_ms = 5_000;
        assert_eq!(timing.current_position_ms(), 1_000);
    }
}
