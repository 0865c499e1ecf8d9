//! Static HTML backend.
//!
//! Holds the page markup and parses it with `scraper` on every query, so a
//! replaced document (an SPA re-render) is picked up by the next call. Clicks
//! can't run page scripts here; they are recorded for inspection.

use crate::dom::{PageDom, ReadyState};
use crate::{Error, Result};
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::sync::{Mutex, PoisonError, RwLock};

/// Document-order position of an element in the current markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

pub struct HtmlPage {
    markup: RwLock<String>,
    ready: RwLock<ReadyState>,
    clicks: Mutex<Vec<NodeIndex>>,
}

pub(crate) fn parse_selector(selector: &str) -> std::result::Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("invalid selector {:?}: {:?}", selector, e))
}

// All elements in document order, starting with <html>
fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.root_element().descendants().filter_map(ElementRef::wrap)
}

fn index_of(document: &Html, element: ElementRef<'_>) -> Option<NodeIndex> {
    elements(document).position(|e| *e == *element).map(NodeIndex)
}

impl HtmlPage {
    pub fn new(markup: impl Into<String>) -> Self {
        HtmlPage {
            markup: RwLock::new(markup.into()),
            ready: RwLock::new(ReadyState::Complete),
            clicks: Mutex::new(Vec::new()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let markup = std::fs::read_to_string(path)
            .map_err(|e| Error::LoadError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(markup))
    }

    /// Swap in new markup, as if the page re-rendered
    pub fn replace_markup(&self, markup: impl Into<String>) {
        *self.markup.write().unwrap_or_else(PoisonError::into_inner) = markup.into();
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        *self.ready.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Elements clicked so far, oldest first
    pub fn clicks(&self) -> Vec<NodeIndex> {
        self.clicks.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn take_clicks(&self) -> Vec<NodeIndex> {
        std::mem::take(&mut *self.clicks.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Short `tag#id.class` label, handy for logs and CLI output
    pub fn describe(&self, node: &NodeIndex) -> Option<String> {
        self.with_element(node, |el| {
            let v = el.value();
            let mut label = v.name().to_string();
            if let Some(id) = v.attr("id") {
                label.push('#');
                label.push_str(id);
            }
            // Source order; `classes()` iterates a hash set
            for class in v.attr("class").unwrap_or("").split_whitespace() {
                label.push('.');
                label.push_str(class);
            }
            label
        })
    }

    fn document(&self) -> Html {
        Html::parse_document(&self.markup.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn with_element<T>(&self, node: &NodeIndex, f: impl FnOnce(ElementRef<'_>) -> T) -> Option<T> {
        let document = self.document();
        let element = elements(&document).nth(node.0)?;
        Some(f(element))
    }

    // Step from `node` to a related element and return the related index.
    fn relative(
        &self,
        node: &NodeIndex,
        step: impl for<'a> FnOnce(ElementRef<'a>) -> Option<ElementRef<'a>>,
    ) -> Option<NodeIndex> {
        let document = self.document();
        let element = elements(&document).nth(node.0)?;
        let related = step(element)?;
        index_of(&document, related)
    }
}

impl PageDom for HtmlPage {
    type Handle = NodeIndex;

    fn ready_state(&self) -> ReadyState {
        *self.ready.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn query(&self, selector: &str) -> Option<NodeIndex> {
        let selector = match parse_selector(selector) {
            Ok(s) => s,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };
        let document = self.document();
        let found = document.select(&selector).next()?;
        index_of(&document, found)
    }

    fn tag_name(&self, node: &NodeIndex) -> Option<String> {
        self.with_element(node, |el| el.value().name().to_ascii_lowercase())
    }

    fn parent(&self, node: &NodeIndex) -> Option<NodeIndex> {
        self.relative(node, |el| el.parent().and_then(ElementRef::wrap))
    }

    fn first_child(&self, node: &NodeIndex) -> Option<NodeIndex> {
        self.relative(node, |el| el.children().find_map(ElementRef::wrap))
    }

    fn attribute(&self, node: &NodeIndex, name: &str) -> Option<String> {
        self.with_element(node, |el| el.value().attr(name).map(str::to_string)).flatten()
    }

    fn text(&self, node: &NodeIndex) -> Option<String> {
        self.with_element(node, |el| el.text().collect::<String>())
    }

    fn click(&self, node: &NodeIndex) {
        debug!("click on element {}", node.0);
        self.clicks.lock().unwrap_or_else(PoisonError::into_inner).push(*node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>T</title></head>
<body>
  <div id="player" class="bar">
    <button class="toggle"><svg class="icon"><path d="M1 1z"></path></svg></button>
    <button class="skip" disabled><svg class="icon"></svg></button>
    <span class="title">  Song A  </span>
  </div>
</body></html>"#;

    #[test]
    fn query_and_navigate() {
        let page = HtmlPage::new(PAGE);
        let svg = page.query("#player button.toggle > svg.icon").expect("svg found");
        assert_eq!(page.tag_name(&svg).as_deref(), Some("svg"));

        let path = page.first_child(&svg).expect("path child");
        assert_eq!(page.tag_name(&path).as_deref(), Some("path"));
        assert_eq!(page.attribute(&path, "d").as_deref(), Some("M1 1z"));

        let button = page.parent(&svg).expect("parent button");
        assert_eq!(page.tag_name(&button).as_deref(), Some("button"));
        assert_eq!(page.describe(&button).as_deref(), Some("button.toggle"));
        assert!(!page.is_disabled(&button));
    }

    #[test]
    fn describe_keeps_class_order() {
        let page = HtmlPage::new(
            r#"<html><body><button id="go" class="zeta sc-skip  alpha ionnrC">x</button></body></html>"#,
        );
        let button = page.query("button").unwrap();
        for _ in 0..8 {
            assert_eq!(page.describe(&button).as_deref(), Some("button#go.zeta.sc-skip.alpha.ionnrC"));
        }
        let body = page.query("body").unwrap();
        assert_eq!(page.describe(&body).as_deref(), Some("body"));
    }

    #[test]
    fn disabled_attribute_is_seen() {
        let page = HtmlPage::new(PAGE);
        let skip = page.query("button.skip").unwrap();
        assert!(page.is_disabled(&skip));
        let div = page.query("#player").unwrap();
        assert!(!page.is_disabled(&div));
    }

    #[test]
    fn text_queries() {
        let page = HtmlPage::new(PAGE);
        assert_eq!(page.query_text("span.title").as_deref(), Some("Song A"));
        assert_eq!(page.query_attribute("#player", "class").as_deref(), Some("bar"));
        assert_eq!(page.query_attribute("#player", "title"), None);
        assert_eq!(page.query_text("span.missing"), None);
    }

    #[test]
    fn bad_selector_is_absence() {
        let page = HtmlPage::new(PAGE);
        assert_eq!(page.query("button[[["), None);
        assert!(parse_selector("button[[[").is_err());
    }

    #[test]
    fn replaced_markup_is_seen_by_next_query() {
        let page = HtmlPage::new(PAGE);
        assert!(page.query("span.title").is_some());
        page.replace_markup("<html><body><p>gone</p></body></html>");
        assert_eq!(page.query("span.title"), None);
    }

    #[test]
    fn clicks_are_recorded() {
        let page = HtmlPage::new(PAGE);
        let button = page.query("button.toggle").unwrap();
        page.click(&button);
        page.click(&button);
        assert_eq!(page.clicks(), vec![button, button]);
        assert_eq!(page.take_clicks().len(), 2);
        assert!(page.clicks().is_empty());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = HtmlPage::from_file("/nonexistent/player.html").err().expect("load error");
        assert!(matches!(err, Error::LoadError(_)));
    }
}
