//! Snapshot extraction: track metadata plus transport state

use crate::dom::PageDom;
use crate::resolver::{Control, ControlSet};
use crate::{Capabilities, FieldQuery, FieldSelectors, PlaybackState, StateSnapshot, TrackSnapshot};

#[derive(Debug, Clone, Default)]
pub struct StateExtractor {
    fields: FieldSelectors,
}

impl StateExtractor {
    pub fn new(fields: FieldSelectors) -> Self {
        Self { fields }
    }

    /// Build a snapshot from direct field queries and an already resolved
    /// control set.
    pub fn extract<D: PageDom>(&self, dom: &D, controls: &ControlSet<D::Handle>) -> StateSnapshot {
        StateSnapshot {
            track: self.track(dom),
            state: playback_state(controls),
            capabilities: capabilities(controls),
        }
    }

    pub fn track<D: PageDom>(&self, dom: &D) -> TrackSnapshot {
        TrackSnapshot {
            title: read_field(dom, &self.fields.title),
            artist: read_field(dom, &self.fields.artist),
            album: read_field(dom, &self.fields.album),
            art_location: read_field(dom, &self.fields.art),
            rating: None,
        }
    }
}

fn read_field<D: PageDom>(dom: &D, query: &FieldQuery) -> Option<String> {
    match &query.attribute {
        Some(name) => dom.query_attribute(&query.selector, name),
        None => dom.query_text(&query.selector),
    }
}

/// A visible pause button means media is playing.
pub fn playback_state<H>(controls: &ControlSet<H>) -> PlaybackState {
    if controls.has(Control::Pause) {
        PlaybackState::Playing
    } else if controls.has(Control::Play) {
        PlaybackState::Paused
    } else {
        PlaybackState::Unknown
    }
}

pub fn capabilities<H>(controls: &ControlSet<H>) -> Capabilities {
    Capabilities {
        can_go_prev: controls.has(Control::Prev),
        can_go_next: controls.has(Control::Next),
        can_play: controls.has(Control::Play),
        can_pause: controls.has(Control::Pause),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::mock::MockPage;
    use crate::icon::PLAY_ICON_PATH;
    use crate::resolver::tests::widget;
    use crate::resolver::ElementResolver;

    #[test]
    fn state_follows_slot_presence() {
        let playing = ControlSet { play: None, pause: Some(1), prev: None, next: None };
        let paused = ControlSet { play: Some(1), pause: None, prev: None, next: None };
        let unknown: ControlSet<usize> = ControlSet::default();
        assert_eq!(playback_state(&playing), PlaybackState::Playing);
        assert_eq!(playback_state(&paused), PlaybackState::Paused);
        assert_eq!(playback_state(&unknown), PlaybackState::Unknown);
    }

    #[test]
    fn capabilities_mirror_slots() {
        let set = ControlSet { play: Some(1), pause: None, prev: None, next: Some(3) };
        let caps = capabilities(&set);
        assert!(caps.can_play && caps.can_go_next);
        assert!(!caps.can_pause && !caps.can_go_prev);
    }

    #[test]
    fn fields_read_text_or_attribute() {
        let fields = FieldSelectors::default();
        let mut page = MockPage::new();
        let title = page.add("span", None, &[]);
        page.set_text(title, "Song A");
        page.bind(&fields.title.selector, title);
        let artist = page.add("p", None, &[("title", "Artist B")]);
        page.set_text(artist, "ignored text");
        page.bind(&fields.artist.selector, artist);
        let art = page.add("img", None, &[("src", "https://cdn/cover.jpg")]);
        page.bind(&fields.art.selector, art);

        let track = StateExtractor::new(fields).track(&page);
        assert_eq!(track.title.as_deref(), Some("Song A"));
        assert_eq!(track.artist.as_deref(), Some("Artist B"));
        assert_eq!(track.album, None);
        assert_eq!(track.art_location.as_deref(), Some("https://cdn/cover.jpg"));
        assert_eq!(track.rating, None);
    }

    #[test]
    fn snapshot_of_paused_widget() {
        let w = widget(PLAY_ICON_PATH, true, false);
        let controls = ElementResolver::default().resolve(&w.page);
        let snap = StateExtractor::default().extract(&w.page, &controls);
        assert_eq!(snap.state, PlaybackState::Paused);
        assert_eq!(
            snap.capabilities,
            Capabilities { can_go_prev: false, can_go_next: true, can_play: true, can_pause: false }
        );
        assert_eq!(snap.track, TrackSnapshot::default());
    }
}
