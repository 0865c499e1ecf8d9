//! Playback actions and their dispatch onto page controls

use crate::dom::PageDom;
use crate::error::Error;
use crate::resolver::{Control, ControlSet, ElementResolver};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Abstract playback command from the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerAction {
    TogglePlay,
    Play,
    Pause,
    Stop,
    PrevSong,
    NextSong,
}

impl PlayerAction {
    pub const ALL: [PlayerAction; 6] = [
        PlayerAction::TogglePlay,
        PlayerAction::Play,
        PlayerAction::Pause,
        PlayerAction::Stop,
        PlayerAction::PrevSong,
        PlayerAction::NextSong,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PlayerAction::TogglePlay => "toggle-play",
            PlayerAction::Play => "play",
            PlayerAction::Pause => "pause",
            PlayerAction::Stop => "stop",
            PlayerAction::PrevSong => "prev-song",
            PlayerAction::NextSong => "next-song",
        }
    }

    /// Slot this action would click given the current controls.
    ///
    /// The page has no stop button; stopping pauses.
    pub fn target<H>(self, controls: &ControlSet<H>) -> Control {
        match self {
            PlayerAction::TogglePlay if controls.has(Control::Play) => Control::Play,
            PlayerAction::TogglePlay => Control::Pause,
            PlayerAction::Play => Control::Play,
            PlayerAction::Pause | PlayerAction::Stop => Control::Pause,
            PlayerAction::PrevSong => Control::Prev,
            PlayerAction::NextSong => Control::Next,
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlayerAction {
    type Err = Error;

    /// Accepts `toggle-play` as well as `TOGGLE_PLAY`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        PlayerAction::ALL
            .into_iter()
            .find(|a| a.name() == normalized)
            .ok_or_else(|| Error::UnknownAction(s.to_string()))
    }
}

/// One delivery from the action source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub name: String,
    /// Carried along; none of the handled actions read it
    #[serde(default)]
    pub param: Option<serde_json::Value>,
}

impl ActionEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), param: None }
    }

    pub fn with_param(mut self, param: serde_json::Value) -> Self {
        self.param = Some(param);
        self
    }

    /// Parse one input line: a JSON event object or a bare action name.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if line.starts_with('{') {
            return serde_json::from_str(line).ok();
        }
        Some(Self::new(line))
    }
}

impl From<PlayerAction> for ActionEvent {
    fn from(action: PlayerAction) -> Self {
        Self::new(action.name())
    }
}

/// What the dispatcher did with one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DispatchOutcome {
    Clicked { action: PlayerAction, control: Control },
    /// The needed control is missing or disabled; the action was dropped
    Unavailable { action: PlayerAction },
    /// The action name is not one we handle
    Ignored { name: String },
}

/// Resolve controls fresh and click the one the action maps to.
pub fn dispatch<D: PageDom>(dom: &D, resolver: &ElementResolver, event: &ActionEvent) -> DispatchOutcome {
    let action = match event.name.parse::<PlayerAction>() {
        Ok(action) => action,
        Err(_) => {
            debug!("ignoring unhandled action {:?}", event.name);
            return DispatchOutcome::Ignored { name: event.name.clone() };
        }
    };

    let controls = resolver.resolve(dom);
    let control = action.target(&controls);
    match controls.get(control) {
        Some(node) => {
            debug!("{} -> click {:?}", action, control);
            dom.click(node);
            DispatchOutcome::Clicked { action, control }
        }
        None => {
            debug!("{} dropped: {:?} control unavailable", action, control);
            DispatchOutcome::Unavailable { action }
        }
    }
}
