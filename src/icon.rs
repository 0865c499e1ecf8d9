//! Play/pause glyph recognition
//!
//! The player renders one toggle button and swaps its icon. The icon's path
//! geometry is the only signal of the current transport state, so it is
//! compared verbatim against the two known glyphs.

use crate::dom::PageDom;
use crate::IconConfig;

/// Circled triangle shown while playback is paused
pub const PLAY_ICON_PATH: &str = "M16.032 31.584c-8.64 0-15.616-6.976-15.616-15.616S7.392.416 16.032.416s15.552 6.976 15.552 15.616c0 8.576-6.976 15.552-15.552 15.552zm0-30.08c-8.064 0-14.528 6.464-14.528 14.528S7.968 30.56 16.032 30.56 30.56 24.096 30.56 16.032c-.064-8.064-6.528-14.528-14.528-14.528zm-3.776 8.992l9.568 5.536-9.568 5.536V10.496M11.168 8.64v14.72l12.672-7.328L11.168 8.64z";

/// Circled double bar shown while media is playing
pub const PAUSE_ICON_PATH: &str = "M16.032 31.584c-8.64 0-15.616-6.976-15.616-15.616S7.392.416 16.032.416s15.552 6.976 15.552 15.616c0 8.576-6.976 15.552-15.552 15.552zm0-30.08c-8.064 0-14.528 6.464-14.528 14.528S7.968 30.56 16.032 30.56 30.56 24.096 30.56 16.032c-.064-8.064-6.528-14.528-14.528-14.528zm-3.776 8.064h1.696v12.864h-1.696V9.568zm5.888 0h1.664v12.864h-1.664V9.568z";

/// Which affordance the toggle currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Play,
    Pause,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct IconClassifier {
    play: String,
    pause: String,
}

impl IconClassifier {
    pub fn new(config: &IconConfig) -> Self {
        Self { play: config.play.clone(), pause: config.pause.clone() }
    }

    /// Exact match against the reference descriptors
    pub fn classify(&self, descriptor: Option<&str>) -> IconKind {
        match descriptor {
            Some(d) if d == self.play => IconKind::Play,
            Some(d) if d == self.pause => IconKind::Pause,
            _ => IconKind::Unknown,
        }
    }

    /// Classify the icon drawn inside `control`.
    pub fn classify_control<D: PageDom>(&self, dom: &D, control: &D::Handle) -> IconKind {
        self.classify(icon_path(dom, control).as_deref())
    }
}

impl Default for IconClassifier {
    fn default() -> Self {
        Self::new(&IconConfig::default())
    }
}

/// Path descriptor of the control's glyph.
///
/// Normally the control is the `svg` and the path is its first child; when the
/// selector matched the button instead, the `svg` sits in between.
fn icon_path<D: PageDom>(dom: &D, control: &D::Handle) -> Option<String> {
    let mut child = dom.first_child(control)?;
    if dom.tag_name(&child).as_deref() == Some("svg") {
        child = dom.first_child(&child)?;
    }
    dom.attribute(&child, "d")
}
