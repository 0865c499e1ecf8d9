//! Outbound player-state interface

use crate::{PlaybackState, StateSnapshot, TrackSnapshot};
use log::warn;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Consumer of the adapter's state, called on every poll tick.
pub trait PlayerSink: Send + Sync {
    fn set_track(&self, track: &TrackSnapshot);
    fn set_playback_state(&self, state: PlaybackState);
    fn set_can_go_prev(&self, can: bool);
    fn set_can_go_next(&self, can: bool);
    fn set_can_play(&self, can: bool);
    fn set_can_pause(&self, can: bool);

    /// Push a whole snapshot, one call per field, track first.
    fn push(&self, snapshot: &StateSnapshot) {
        let caps = &snapshot.capabilities;
        self.set_track(&snapshot.track);
        self.set_playback_state(snapshot.state);
        self.set_can_go_prev(caps.can_go_prev);
        self.set_can_go_next(caps.can_go_next);
        self.set_can_play(caps.can_play);
        self.set_can_pause(caps.can_pause);
    }
}

/// A single sink call, as recorded or written out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", content = "value")]
pub enum SinkEvent {
    #[serde(rename = "setTrack")]
    Track(TrackSnapshot),
    #[serde(rename = "setPlaybackState")]
    PlaybackState(PlaybackState),
    #[serde(rename = "setCanGoPrev")]
    CanGoPrev(bool),
    #[serde(rename = "setCanGoNext")]
    CanGoNext(bool),
    #[serde(rename = "setCanPlay")]
    CanPlay(bool),
    #[serde(rename = "setCanPause")]
    CanPause(bool),
}

/// Keeps every call in memory
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink { events: Mutex::new(Vec::new()) }
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn take_events(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of `setTrack` calls, i.e. completed ticks
    pub fn track_pushes(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).iter().filter(|e| matches!(e, SinkEvent::Track(_))).count()
    }

    pub fn last_track(&self) -> Option<TrackSnapshot> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).iter().rev().find_map(|e| match e {
            SinkEvent::Track(t) => Some(t.clone()),
            _ => None,
        })
    }

    pub fn last_playback_state(&self) -> Option<PlaybackState> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).iter().rev().find_map(|e| match e {
            SinkEvent::PlaybackState(s) => Some(*s),
            _ => None,
        })
    }

    fn record(&self, event: SinkEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerSink for RecordingSink {
    fn set_track(&self, track: &TrackSnapshot) {
        self.record(SinkEvent::Track(track.clone()));
    }

    fn set_playback_state(&self, state: PlaybackState) {
        self.record(SinkEvent::PlaybackState(state));
    }

    fn set_can_go_prev(&self, can: bool) {
        self.record(SinkEvent::CanGoPrev(can));
    }

    fn set_can_go_next(&self, can: bool) {
        self.record(SinkEvent::CanGoNext(can));
    }

    fn set_can_play(&self, can: bool) {
        self.record(SinkEvent::CanPlay(can));
    }

    fn set_can_pause(&self, can: bool) {
        self.record(SinkEvent::CanPause(can));
    }
}

/// Writes each call as one JSON object per line
pub struct JsonLinesSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        JsonLinesSink { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn emit(&self, event: SinkEvent) {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                warn!("failed to serialize sink event: {}", e);
                return;
            }
        };
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            warn!("failed to write sink event: {}", e);
        }
    }
}

impl<W: Write + Send> PlayerSink for JsonLinesSink<W> {
    fn set_track(&self, track: &TrackSnapshot) {
        self.emit(SinkEvent::Track(track.clone()));
    }

    fn set_playback_state(&self, state: PlaybackState) {
        self.emit(SinkEvent::PlaybackState(state));
    }

    fn set_can_go_prev(&self, can: bool) {
        self.emit(SinkEvent::CanGoPrev(can));
    }

    fn set_can_go_next(&self, can: bool) {
        self.emit(SinkEvent::CanGoNext(can));
    }

    fn set_can_play(&self, can: bool) {
        self.emit(SinkEvent::CanPlay(can));
    }

    fn set_can_pause(&self, can: bool) {
        self.emit(SinkEvent::CanPause(can));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capabilities;

    fn paused_snapshot() -> StateSnapshot {
        StateSnapshot {
            track: TrackSnapshot { title: Some("Song A".into()), ..Default::default() },
            state: PlaybackState::Paused,
            capabilities: Capabilities { can_play: true, can_go_next: true, ..Default::default() },
        }
    }

    #[test]
    fn push_calls_every_setter_in_order() {
        let sink = RecordingSink::new();
        sink.push(&paused_snapshot());
        assert_eq!(
            sink.events(),
            vec![
                SinkEvent::Track(paused_snapshot().track),
                SinkEvent::PlaybackState(PlaybackState::Paused),
                SinkEvent::CanGoPrev(false),
                SinkEvent::CanGoNext(true),
                SinkEvent::CanPlay(true),
                SinkEvent::CanPause(false),
            ]
        );
        assert_eq!(sink.track_pushes(), 1);
        assert_eq!(sink.last_playback_state(), Some(PlaybackState::Paused));
        assert_eq!(sink.take_events().len(), 6);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn json_lines_format() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.set_playback_state(PlaybackState::Playing);
        sink.set_can_pause(true);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"call\":\"setPlaybackState\",\"value\":\"PLAYING\"}\n{\"call\":\"setCanPause\",\"value\":true}\n"
        );
    }
}
