//! Live page backend over the Chrome DevTools Protocol
//!
//! Each DOM question is answered by evaluating a small script in the page
//! through `headless_chrome`. A handle records how an element was reached
//! (selector plus parent/child steps) rather than a remote object, so it is
//! re-located on every use and simply comes back absent after a re-render.

use crate::dom::{PageDom, ReadyState};
use crate::{Error, Result};
use headless_chrome::browser::tab::Tab;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Step {
    Parent,
    Child,
}

/// Path to an element: the first match of `selector`, then `steps`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptNode {
    selector: String,
    steps: Vec<Step>,
}

impl ScriptNode {
    fn then(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { selector: self.selector.clone(), steps }
    }
}

/// Same event sequence a user's click produces
const CLICK_SCRIPT: &str = r#"['mouseover', 'mousedown', 'mouseup', 'click'].forEach(function (type) {
    el.dispatchEvent(new MouseEvent(type, {bubbles: true, cancelable: true, view: window}));
  });
  return true;"#;

/// A page open in a headless Chrome tab
pub struct CdpPage {
    // Keeps the browser process alive when we launched it
    _browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl CdpPage {
    /// Launch headless Chrome and open `url`
    pub fn launch(url: &str, width: u32, height: u32) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((width, height)))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;

        tab.navigate_to(url)
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        Ok(Self { _browser: Some(browser), tab })
    }

    /// Attach to a tab owned by someone else
    pub fn from_tab(tab: Arc<Tab>) -> Self {
        Self { _browser: None, tab }
    }

    /// Evaluate `body` with `el` bound to the node; `None` if the node is gone.
    fn eval_on(&self, node: &ScriptNode, body: &str) -> Option<serde_json::Value> {
        let script = match node_script(node, body) {
            Ok(s) => s,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };
        self.evaluate(&script)
    }

    fn evaluate(&self, script: &str) -> Option<serde_json::Value> {
        match self.tab.evaluate(script, false) {
            Ok(result) => result.value.filter(|v| !v.is_null()),
            Err(e) => {
                warn!("page evaluation failed: {}", e);
                None
            }
        }
    }

    fn exists(&self, node: ScriptNode) -> Option<ScriptNode> {
        match self.eval_on(&node, "return true;") {
            Some(serde_json::Value::Bool(true)) => Some(node),
            _ => None,
        }
    }

    fn eval_string(&self, node: &ScriptNode, body: &str) -> Option<String> {
        match self.eval_on(node, body)? {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        }
    }
}

fn node_script(node: &ScriptNode, body: &str) -> Result<String> {
    let selector = serde_json::to_string(&node.selector).map_err(|e| Error::ScriptError(e.to_string()))?;
    let steps = serde_json::to_string(&node.steps).map_err(|e| Error::ScriptError(e.to_string()))?;
    Ok(format!(
        r#"(function () {{
  var el = document.querySelector({selector});
  var steps = {steps};
  for (var i = 0; el && i < steps.length; i++) {{
    el = steps[i] === 'parent' ? el.parentElement : el.firstElementChild;
  }}
  if (!el) return null;
  {body}
}})()"#,
        selector = selector,
        steps = steps,
        body = body
    ))
}

impl PageDom for CdpPage {
    type Handle = ScriptNode;

    fn ready_state(&self) -> ReadyState {
        match self.evaluate("document.readyState") {
            Some(serde_json::Value::String(s)) => {
                ReadyState::from_document_state(&s).unwrap_or(ReadyState::Loading)
            }
            _ => ReadyState::Loading,
        }
    }

    fn query(&self, selector: &str) -> Option<ScriptNode> {
        self.exists(ScriptNode { selector: selector.to_string(), steps: Vec::new() })
    }

    fn tag_name(&self, node: &ScriptNode) -> Option<String> {
        self.eval_string(node, "return el.tagName.toLowerCase();")
    }

    fn parent(&self, node: &ScriptNode) -> Option<ScriptNode> {
        self.exists(node.then(Step::Parent))
    }

    fn first_child(&self, node: &ScriptNode) -> Option<ScriptNode> {
        self.exists(node.then(Step::Child))
    }

    fn attribute(&self, node: &ScriptNode, name: &str) -> Option<String> {
        let name = serde_json::to_string(name).ok()?;
        self.eval_string(node, &format!("return el.getAttribute({});", name))
    }

    fn text(&self, node: &ScriptNode) -> Option<String> {
        self.eval_string(node, "return el.textContent;")
    }

    fn is_disabled(&self, node: &ScriptNode) -> bool {
        matches!(self.eval_on(node, "return el.disabled === true;"), Some(serde_json::Value::Bool(true)))
    }

    fn click(&self, node: &ScriptNode) {
        debug!("click on {:?}", node);
        if self.eval_on(node, CLICK_SCRIPT).is_none() {
            debug!("click target vanished: {:?}", node);
        }
    }
}
