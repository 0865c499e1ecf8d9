//! DOM access capability
//!
//! Everything the adapter knows about the page goes through [`PageDom`]. A
//! backend only has to answer a handful of narrow questions about elements;
//! the resolver, extractor and dispatcher are written against this trait so
//! they run the same on a static HTML document, a live browser tab or a mock.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Tags whose `disabled` attribute maps to the DOM `disabled` property.
const DISABLEABLE_TAGS: &[&str] = &[
    "button", "input", "select", "textarea", "option", "optgroup", "fieldset",
];

/// Mirror of `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// `interactive` and `complete` both mean the markup can be queried.
    pub fn is_ready(self) -> bool {
        !matches!(self, ReadyState::Loading)
    }

    /// Parse the string form reported by browsers.
    pub fn from_document_state(state: &str) -> Option<Self> {
        match state.trim() {
            "loading" => Some(ReadyState::Loading),
            "interactive" => Some(ReadyState::Interactive),
            "complete" => Some(ReadyState::Complete),
            _ => None,
        }
    }
}

/// Narrow view of a page's DOM.
///
/// Handles are only meaningful until the page re-renders, so callers must not
/// keep one across two resolution passes. Every query answers "absent" rather
/// than failing.
pub trait PageDom: Send + Sync {
    /// Opaque reference to one element
    type Handle: Clone + PartialEq + Debug + Send + Sync;

    /// Current loading state of the page
    fn ready_state(&self) -> ReadyState {
        ReadyState::Complete
    }

    /// First element matching a CSS selector
    fn query(&self, selector: &str) -> Option<Self::Handle>;

    /// Lowercase local tag name
    fn tag_name(&self, node: &Self::Handle) -> Option<String>;

    /// Parent element
    fn parent(&self, node: &Self::Handle) -> Option<Self::Handle>;

    /// First element child
    fn first_child(&self, node: &Self::Handle) -> Option<Self::Handle>;

    /// Attribute value, if the attribute is present
    fn attribute(&self, node: &Self::Handle, name: &str) -> Option<String>;

    /// Concatenated text content
    fn text(&self, node: &Self::Handle) -> Option<String>;

    /// Whether the element refuses activation.
    ///
    /// The default follows the DOM `disabled` property: only form controls
    /// carrying the `disabled` attribute count.
    fn is_disabled(&self, node: &Self::Handle) -> bool {
        match self.tag_name(node) {
            Some(tag) if DISABLEABLE_TAGS.contains(&tag.as_str()) => {
                self.attribute(node, "disabled").is_some()
            }
            _ => false,
        }
    }

    /// Re-enact a user click on the element
    fn click(&self, node: &Self::Handle);

    /// Trimmed text of the first match; blank text counts as absent.
    fn query_text(&self, selector: &str) -> Option<String> {
        let node = self.query(selector)?;
        let text = self.text(&node)?;
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// Attribute of the first match
    fn query_attribute(&self, selector: &str, name: &str) -> Option<String> {
        let node = self.query(selector)?;
        self.attribute(&node, name)
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockPage;
    use super::*;

    #[test]
    fn ready_state_parsing() {
        assert_eq!(ReadyState::from_document_state("complete"), Some(ReadyState::Complete));
        assert_eq!(ReadyState::from_document_state(" interactive "), Some(ReadyState::Interactive));
        assert_eq!(ReadyState::from_document_state("unloaded"), None);
        assert!(!ReadyState::Loading.is_ready());
        assert!(ReadyState::Interactive.is_ready());
    }

    #[test]
    fn disabled_only_applies_to_form_controls() {
        let mut page = MockPage::new();
        let button = page.add("button", None, &[("disabled", "")]);
        let div = page.add("div", None, &[("disabled", "")]);
        let enabled = page.add("button", None, &[]);
        assert!(page.is_disabled(&button));
        assert!(!page.is_disabled(&div));
        assert!(!page.is_disabled(&enabled));
    }

    #[test]
    fn query_text_trims_and_drops_blank() {
        let mut page = MockPage::new();
        let title = page.add("span", None, &[]);
        page.set_text(title, "  Song A \n");
        let blank = page.add("span", None, &[]);
        page.set_text(blank, "   ");
        page.bind(".title", title);
        page.bind(".blank", blank);

        assert_eq!(page.query_text(".title").as_deref(), Some("Song A"));
        assert_eq!(page.query_text(".blank"), None);
        assert_eq!(page.query_text(".missing"), None);
    }
}
