//! Countdown player for guided meditation sessions.
//!
//! # Invariants
//! - `0 <= elapsed <= duration` at all times.
//! - A completed player is never playing.
//! - `PlayerEvent::Completed` is emitted once per transition into the
//!   completed state.

use crate::model::meditation::MeditationSession;
use crate::model::ValidationError;

/// Notification produced by player transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    Completed { duration_secs: i64 },
}

/// Playback state for one session; ticks once per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlayer {
    duration_secs: i64,
    elapsed_secs: i64,
    playing: bool,
    completed: bool,
}

impl SessionPlayer {
    pub fn new(duration_secs: i64) -> Result<Self, ValidationError> {
        if duration_secs <= 0 {
            return Err(ValidationError::NonPositiveDuration(duration_secs));
        }
        Ok(Self {
            duration_secs,
            elapsed_secs: 0,
            playing: false,
            completed: false,
        })
    }

    pub fn for_session(session: &MeditationSession) -> Result<Self, ValidationError> {
        Self::new(session.duration_secs)
    }

    pub fn duration_secs(&self) -> i64 {
        self.duration_secs
    }

    pub fn elapsed_secs(&self) -> i64 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> i64 {
        self.duration_secs - self.elapsed_secs
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn progress_percent(&self) -> f64 {
        self.elapsed_secs as f64 / self.duration_secs as f64 * 100.0
    }

    /// Play/pause button. Pressing play on a finished session starts over.
    pub fn toggle_play(&mut self) {
        if self.completed {
            self.elapsed_secs = 0;
            self.completed = false;
            self.playing = true;
        } else {
            self.playing = !self.playing;
        }
    }

    /// Advances one second while playing.
    pub fn tick(&mut self) -> Option<PlayerEvent> {
        if !self.playing || self.completed {
            return None;
        }
        self.elapsed_secs += 1;
        if self.elapsed_secs >= self.duration_secs {
            return self.finish();
        }
        None
    }

    /// Seeks to a fraction of the session (progress bar click).
    pub fn seek_fraction(&mut self, fraction: f64) -> Option<PlayerEvent> {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let target = (fraction * self.duration_secs as f64).floor() as i64;
        self.seek_to(target)
    }

    /// Seeks to an absolute second. Reaching the end completes the session;
    /// anything earlier clears a previous completion.
    pub fn seek_to(&mut self, secs: i64) -> Option<PlayerEvent> {
        let target = secs.clamp(0, self.duration_secs);
        self.elapsed_secs = target;
        if target >= self.duration_secs {
            if self.completed {
                self.playing = false;
                return None;
            }
            return self.finish();
        }
        self.completed = false;
        None
    }

    pub fn skip_to_end(&mut self) -> Option<PlayerEvent> {
        self.seek_to(self.duration_secs)
    }

    pub fn restart(&mut self) {
        self.elapsed_secs = 0;
        self.completed = false;
        self.playing = false;
    }

    fn finish(&mut self) -> Option<PlayerEvent> {
        self.elapsed_secs = self.duration_secs;
        self.completed = true;
        self.playing = false;
        Some(PlayerEvent::Completed {
            duration_secs: self.duration_secs,
        })
    }
}

/// Formats seconds as `m:ss`.
pub fn format_clock(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticking_to_duration_completes_once() {
        let mut player = SessionPlayer::new(3).unwrap();
        player.toggle_play();
        assert_eq!(player.tick(), None);
        assert_eq!(player.tick(), None);
        assert_eq!(
            player.tick(),
            Some(PlayerEvent::Completed { duration_secs: 3 })
        );
        assert!(player.is_completed());
        assert!(!player.is_playing());
        assert_eq!(player.tick(), None);
        assert_eq!(player.elapsed_secs(), 3);
    }

    #[test]
    fn paused_player_does_not_tick() {
        let mut player = SessionPlayer::new(10).unwrap();
        assert_eq!(player.tick(), None);
        assert_eq!(player.elapsed_secs(), 0);
        player.toggle_play();
        player.tick();
        player.toggle_play();
        player.tick();
        assert_eq!(player.elapsed_secs(), 1);
    }

    #[test]
    fn seeking_to_end_completes_and_seeking_back_unmarks() {
        let mut player = SessionPlayer::new(300).unwrap();
        player.toggle_play();
        assert_eq!(
            player.seek_to(300),
            Some(PlayerEvent::Completed { duration_secs: 300 })
        );
        assert!(player.is_completed());
        assert!(!player.is_playing());
        assert_eq!(player.tick(), None);
        assert_eq!(player.seek_to(300), None);

        assert_eq!(player.seek_to(0), None);
        assert!(!player.is_completed());
        assert_eq!(player.elapsed_secs(), 0);
    }

    #[test]
    fn seek_fraction_floors_and_clamps() {
        let mut player = SessionPlayer::new(301).unwrap();
        player.seek_fraction(0.5);
        assert_eq!(player.elapsed_secs(), 150);
        player.seek_fraction(-2.0);
        assert_eq!(player.elapsed_secs(), 0);
        assert!(player.seek_fraction(7.0).is_some());
        assert_eq!(player.elapsed_secs(), 301);
    }

    #[test]
    fn play_after_completion_restarts() {
        let mut player = SessionPlayer::new(60).unwrap();
        player.skip_to_end();
        player.toggle_play();
        assert!(player.is_playing());
        assert!(!player.is_completed());
        assert_eq!(player.elapsed_secs(), 0);
        assert_eq!(player.remaining_secs(), 60);
    }

    #[test]
    fn rejects_non_positive_duration() {
        assert_eq!(
            SessionPlayer::new(0),
            Err(ValidationError::NonPositiveDuration(0))
        );
    }

    #[test]
    fn clock_format_pads_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(1200), "20:00");
    }
}
