//! Transport control resolution
//!
//! Finds the play/pause toggle and the previous/next buttons, works out which
//! face the toggle currently shows, lifts icon nodes to their clickable
//! button and drops anything disabled. Nothing is cached between calls because
//! the page may have re-rendered.

use crate::dom::PageDom;
use crate::icon::{IconClassifier, IconKind};
use crate::{ControlSelectors, IconConfig};
use serde::Serialize;

/// Names one slot of a [`ControlSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Play,
    Pause,
    Prev,
    Next,
}

impl Control {
    pub const ALL: [Control; 4] = [Control::Play, Control::Pause, Control::Prev, Control::Next];
}

/// Controls usable right now.
///
/// `play` and `pause` are the same physical button, so at most one of them is
/// set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSet<H> {
    pub play: Option<H>,
    pub pause: Option<H>,
    pub prev: Option<H>,
    pub next: Option<H>,
}

impl<H> Default for ControlSet<H> {
    fn default() -> Self {
        Self { play: None, pause: None, prev: None, next: None }
    }
}

impl<H> ControlSet<H> {
    pub fn get(&self, control: Control) -> Option<&H> {
        self.slot(control).as_ref()
    }

    pub fn has(&self, control: Control) -> bool {
        self.get(control).is_some()
    }

    fn slot(&self, control: Control) -> &Option<H> {
        match control {
            Control::Play => &self.play,
            Control::Pause => &self.pause,
            Control::Prev => &self.prev,
            Control::Next => &self.next,
        }
    }

    fn slot_mut(&mut self, control: Control) -> &mut Option<H> {
        match control {
            Control::Play => &mut self.play,
            Control::Pause => &mut self.pause,
            Control::Prev => &mut self.prev,
            Control::Next => &mut self.next,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElementResolver {
    selectors: ControlSelectors,
    icons: IconClassifier,
}

impl ElementResolver {
    pub fn new(selectors: ControlSelectors, icons: &IconConfig) -> Self {
        Self { selectors, icons: IconClassifier::new(icons) }
    }

    /// Resolve the currently usable controls. Absence is never an error.
    pub fn resolve<D: PageDom>(&self, dom: &D) -> ControlSet<D::Handle> {
        let mut set = ControlSet {
            play: dom.query(&self.selectors.play_pause),
            pause: None,
            prev: dom.query(&self.selectors.prev),
            next: dom.query(&self.selectors.next),
        };

        if let Some(toggle) = &set.play {
            match self.icons.classify_control(dom, toggle) {
                IconKind::Play => {}
                IconKind::Pause => set.pause = set.play.take(),
                IconKind::Unknown => set.play = None,
            }
        }

        for control in Control::ALL {
            let slot = set.slot_mut(control);
            let Some(node) = slot.take() else { continue };
            let node = clickable(dom, node);
            if !dom.is_disabled(&node) {
                *slot = Some(node);
            }
        }

        set
    }
}

impl Default for ElementResolver {
    fn default() -> Self {
        Self::new(ControlSelectors::default(), &IconConfig::default())
    }
}

/// An `svg` icon is replaced by its parent, the element that takes clicks.
fn clickable<D: PageDom>(dom: &D, node: D::Handle) -> D::Handle {
    if dom.tag_name(&node).as_deref() == Some("svg") {
        if let Some(parent) = dom.parent(&node) {
            return parent;
        }
    }
    node
}
