#![forbid(unsafe_code)]

//! `Dom` and `Scheduler` over the real browser document.
//!
//! Class-list and style writes are best-effort: a failure is logged and the
//! widget carries on, since there is nothing useful to do about it.

use std::time::Duration;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use mklb_core::{ClickHandler, Dom, DomError, Key, KeyHandler, Scheduler, Task};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, Window};

/// Set on `<html>` once a lightbox is mounted.
pub const MOUNTED_ATTRIBUTE: &str = "data-mklb-mounted";

fn js_error(op: &'static str) -> impl Fn(JsValue) -> DomError {
    move |value| {
        let message = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<js_sys::Error>()
                    .map(|err| String::from(err.message()))
            })
            .unwrap_or_else(|| format!("{value:?}"));
        DomError::new(op, message)
    }
}

/// Handle to the page document.
#[derive(Debug, Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The document of the global window.
    pub fn from_window() -> Result<Self, DomError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| DomError::new("document", "no global document"))?;
        Ok(Self::new(document))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Dom for WebDom {
    type Node = Element;

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, DomError> {
        let list = self
            .document
            .query_selector_all(selector)
            .map_err(js_error("query_all"))?;
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn create_element(&self, tag: &str) -> Result<Element, DomError> {
        self.document
            .create_element(tag)
            .map_err(js_error("create_element"))
    }

    fn clone_shallow(&self, node: &Element) -> Result<Element, DomError> {
        node.clone_node()
            .map_err(js_error("clone_shallow"))?
            .dyn_into::<Element>()
            .map_err(|_| DomError::new("clone_shallow", "copy is not an element"))
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent
            .append_child(child)
            .map(drop)
            .map_err(js_error("append_child"))
    }

    fn append_to_body(&self, node: &Element) -> Result<(), DomError> {
        let body = self
            .document
            .body()
            .ok_or_else(|| DomError::new("append_to_body", "document has no body"))?;
        self.append_child(&body, node)
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn add_class(&self, node: &Element, class: &str) {
        if let Err(err) = node.class_list().add_1(class) {
            tracing::warn!(class, error = ?err, "classList.add failed");
        }
    }

    fn remove_class(&self, node: &Element, class: &str) {
        if let Err(err) = node.class_list().remove_1(class) {
            tracing::warn!(class, error = ?err, "classList.remove failed");
        }
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn clear_classes(&self, node: &Element) {
        node.set_class_name("");
    }

    fn set_scroll_locked(&self, locked: bool) {
        let Some(root) = self
            .document
            .scrolling_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            tracing::warn!("no scrolling element to lock");
            return;
        };
        let style = root.style();
        let result = if locked {
            style.set_property("overflow-y", "hidden")
        } else {
            style.remove_property("overflow-y").map(drop)
        };
        if let Err(err) = result {
            tracing::warn!(locked, error = ?err, "scroll lock write failed");
        }
    }

    fn on_click(&self, node: &Element, handler: ClickHandler<Element>) {
        EventListener::new(node, "click", move |event| {
            if let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) {
                handler(&target);
            }
        })
        .forget();
    }

    fn on_key_up(&self, handler: KeyHandler) {
        let listener = move |event: &web_sys::Event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                handler(Key::from_code(&event.code()));
            }
        };
        match self.document.body() {
            Some(body) => EventListener::new(&body, "keyup", listener).forget(),
            None => EventListener::new(&self.document, "keyup", listener).forget(),
        }
    }

    fn claim_document(&self) -> Result<bool, DomError> {
        let root = self
            .document
            .document_element()
            .ok_or_else(|| DomError::new("claim_document", "document has no root element"))?;
        if root.has_attribute(MOUNTED_ATTRIBUTE) {
            return Ok(false);
        }
        root.set_attribute(MOUNTED_ATTRIBUTE, "")
            .map_err(js_error("claim_document"))?;
        Ok(true)
    }
}

/// Browser timeouts and animation frames.
#[derive(Debug, Clone)]
pub struct WebScheduler {
    window: Window,
}

impl WebScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

/// `setTimeout` takes a 32-bit millisecond count.
pub(crate) fn timeout_millis(delay: Duration) -> u32 {
    u32::try_from(delay.as_millis()).unwrap_or(u32::MAX)
}

impl Scheduler for WebScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) {
        Timeout::new(timeout_millis(delay), task).forget();
    }

    fn request_animation_frame(&self, task: Task) {
        let callback = Closure::once_into_js(move |_timestamp: f64| task());
        if let Err(err) = self
            .window
            .request_animation_frame(callback.unchecked_ref())
        {
            tracing::warn!(error = ?err, "requestAnimationFrame failed");
        }
    }
}
