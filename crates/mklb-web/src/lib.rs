#![forbid(unsafe_code)]

//! Browser host for the mklb image lightbox.
//!
//! Load the module after the page's images (end of `<body>` or `defer`).
//! With the default `autostart` feature it scans for `img.mklbItem`, groups
//! images by their `data-gallery` attribute, and mounts one overlay per image
//! or gallery. Without it, call `mount()` or `mountWithConfig(json)` from
//! JavaScript.
//!
//! A page mounts once. The document is marked with `data-mklb-mounted` and
//! later calls are rejected, including from a second copy of the module.

pub mod dom;

use std::cell::RefCell;
use std::rc::Rc;

use mklb_core::{Lightbox, LightboxConfig};
use wasm_bindgen::prelude::*;

pub use dom::{WebDom, WebScheduler};

/// The mounted page lightbox. Listeners hold weak references, so this keeps
/// the viewers alive for the page's lifetime.
pub type PageLightbox = Lightbox<WebDom, WebScheduler>;

thread_local! {
    static MOUNTED: RefCell<Option<Rc<PageLightbox>>> = const { RefCell::new(None) };
}

#[cfg(feature = "autostart")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    mount()
}

/// Mount with the default configuration.
#[wasm_bindgen]
pub fn mount() -> Result<(), JsValue> {
    mount_config(LightboxConfig::default())
}

/// Mount with a JSON configuration; missing fields keep their defaults.
#[wasm_bindgen(js_name = mountWithConfig)]
pub fn mount_with_config(json: &str) -> Result<(), JsValue> {
    let config =
        LightboxConfig::from_json(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
    mount_config(config)
}

/// Whether a lightbox is mounted on this page.
#[wasm_bindgen(js_name = isMounted)]
pub fn is_mounted() -> bool {
    MOUNTED.with(|slot| slot.borrow().is_some())
}

/// Close whichever viewers are open.
#[wasm_bindgen(js_name = closeAll)]
pub fn close_all() {
    MOUNTED.with(|slot| {
        if let Some(lightbox) = slot.borrow().as_ref() {
            lightbox.close_all();
        }
    });
}

/// Scan the page and mount with `config`.
pub fn mount_config(config: LightboxConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let dom = WebDom::from_window().map_err(|err| JsValue::from_str(&err.to_string()))?;
    let scheduler = WebScheduler::new(window);

    let lightbox = Lightbox::scan(dom, scheduler, config)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    tracing::info!(
        viewers = lightbox.viewers().len(),
        failures = lightbox.failures().len(),
        "mklb mounted"
    );

    MOUNTED.with(|slot| *slot.borrow_mut() = Some(lightbox));
    Ok(())
}
