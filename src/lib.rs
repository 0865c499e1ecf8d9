//! Playhook page-state adapter
//!
//! Runs next to a web page that renders a media player, reads the player's
//! state out of the rendered DOM and mirrors it into a typed [`PlayerSink`].
//! Playback actions coming from the other direction are re-enacted as clicks
//! on the page's own transport controls.
//!
//! # Features
//!
//! - **HTML backend** (default): static documents parsed with `scraper`
//! - **CDP backend**: a live headless Chrome tab via the DevTools protocol
//! - **Absence, not failure**: a control or field the page doesn't show is
//!   reported as unavailable instead of raising an error
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "html")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use playhook::backend::HtmlPage;
//! use playhook::sink::RecordingSink;
//! use playhook::{Adapter, AdapterConfig, PlaybackState};
//!
//! let page = HtmlPage::from_file("player.html")?;
//! let adapter = Adapter::new(page, RecordingSink::new(), AdapterConfig::default())?;
//! let snapshot = adapter.tick();
//! if snapshot.state == PlaybackState::Paused {
//!     println!("paused on {:?}", snapshot.track.title);
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "html"))]
//! # fn main() {}
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod action;
pub mod adapter;
pub mod backend;
pub mod dom;
pub mod extract;
pub mod icon;
pub mod resolver;
pub mod sink;

pub use action::{ActionEvent, DispatchOutcome, PlayerAction};
pub use adapter::Adapter;
pub use dom::{PageDom, ReadyState};
pub use icon::{IconClassifier, IconKind};
pub use resolver::{Control, ControlSet, ElementResolver};
pub use sink::PlayerSink;

/// Adapter configuration
///
/// Defaults target the player widget the adapter was written for. Every field
/// can be overridden from a JSON document; fields left out keep their
/// defaults.
///
/// # Examples
///
/// ```
/// let cfg = playhook::AdapterConfig::default();
/// assert_eq!(cfg.poll_interval_ms, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Delay between the end of one poll tick and the start of the next
    pub poll_interval_ms: u64,
    /// How often to re-check the page's ready state before the first tick
    pub ready_check_interval_ms: u64,
    /// Transport control selectors
    pub controls: ControlSelectors,
    /// Track metadata queries
    pub fields: FieldSelectors,
    /// Reference icon shapes for the play/pause toggle
    pub icons: IconConfig,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            ready_check_interval_ms: 100,
            controls: ControlSelectors::default(),
            fields: FieldSelectors::default(),
            icons: IconConfig::default(),
        }
    }
}

impl AdapterConfig {
    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: AdapterConfig = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Malformed config: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn ready_check_interval(&self) -> Duration {
        Duration::from_millis(self.ready_check_interval_ms)
    }

    /// Reject settings the adapter cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::ConfigError("poll_interval_ms must be positive".into()));
        }
        if self.ready_check_interval_ms == 0 {
            return Err(Error::ConfigError("ready_check_interval_ms must be positive".into()));
        }

        let selectors = [
            ("controls.play_pause", self.controls.play_pause.as_str()),
            ("controls.next", self.controls.next.as_str()),
            ("controls.prev", self.controls.prev.as_str()),
            ("fields.title", self.fields.title.selector.as_str()),
            ("fields.artist", self.fields.artist.selector.as_str()),
            ("fields.album", self.fields.album.selector.as_str()),
            ("fields.art", self.fields.art.selector.as_str()),
        ];
        for (name, selector) in selectors {
            if selector.trim().is_empty() {
                return Err(Error::ConfigError(format!("{} is empty", name)));
            }
            #[cfg(feature = "html")]
            backend::html::parse_selector(selector)
                .map_err(|e| Error::ConfigError(format!("{}: {}", name, e)))?;
        }

        if self.icons.play.trim().is_empty() || self.icons.pause.trim().is_empty() {
            return Err(Error::ConfigError("icon references must not be empty".into()));
        }
        if self.icons.play == self.icons.pause {
            return Err(Error::ConfigError(
                "play and pause icon references are identical".into(),
            ));
        }
        Ok(())
    }
}

/// Selectors for the transport controls, scoped to the player widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSelectors {
    /// The single toggle that shows either a play or a pause icon
    pub play_pause: String,
    pub next: String,
    pub prev: String,
}

impl Default for ControlSelectors {
    fn default() -> Self {
        Self {
            play_pause: ".hOOKvw button.hrAWUR > svg.jStubB".to_string(),
            next: ".hOOKvw button.ionnrC > svg.betPcV".to_string(),
            prev: ".hOOKvw button.ionnrC > svg.cIilyo".to_string(),
        }
    }
}

/// Where to read one track field from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldQuery {
    pub selector: String,
    /// Attribute to read; the element's text is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl FieldQuery {
    pub fn text(selector: &str) -> Self {
        Self { selector: selector.to_string(), attribute: None }
    }

    pub fn attribute(selector: &str, attribute: &str) -> Self {
        Self { selector: selector.to_string(), attribute: Some(attribute.to_string()) }
    }
}

/// Track metadata queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSelectors {
    pub title: FieldQuery,
    pub artist: FieldQuery,
    pub album: FieldQuery,
    pub art: FieldQuery,
}

impl Default for FieldSelectors {
    fn default() -> Self {
        Self {
            title: FieldQuery::text(".hOOKvw span.oKpSL"),
            artist: FieldQuery::attribute(".hOOKvw p.ZSqOQ", "title"),
            album: FieldQuery::attribute(".hOOKvw p.ZSqOQ:last-child", "title"),
            art: FieldQuery::attribute(".hOOKvw img.hFdXsU", "src"),
        }
    }
}

/// Vector path descriptors of the toggle's two glyphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub play: String,
    pub pause: String,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            play: icon::PLAY_ICON_PATH.to_string(),
            pause: icon::PAUSE_ICON_PATH.to_string(),
        }
    }
}

/// Metadata of the track currently shown by the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSnapshot {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Cover image URL as written in the page
    pub art_location: Option<String>,
    /// Never provided by the page
    pub rating: Option<f64>,
}

/// Playback state inferred from which transport affordance is visible
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackState {
    Playing,
    Paused,
    #[default]
    Unknown,
}

/// Which transport buttons the control surface may enable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_go_prev: bool,
    pub can_go_next: bool,
    pub can_play: bool,
    pub can_pause: bool,
}

/// Everything one poll tick pushes to the sink
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub track: TrackSnapshot,
    pub state: PlaybackState,
    pub capabilities: Capabilities,
}
