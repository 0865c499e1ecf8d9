//! Page backends implementing [`PageDom`](crate::dom::PageDom)
//!
//! - [`HtmlPage`]: a static document parsed with `scraper` (feature `html`)
//! - [`CdpPage`]: a live headless Chrome tab (feature `cdp`)

#[cfg(feature = "html")]
pub mod html;

#[cfg(feature = "cdp")]
pub mod cdp;

#[cfg(feature = "html")]
pub use html::{HtmlPage, NodeIndex};

#[cfg(feature = "cdp")]
pub use cdp::{CdpPage, ScriptNode};
