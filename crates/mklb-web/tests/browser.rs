#![cfg(target_arch = "wasm32")]

//! Browser smoke tests. Run with `wasm-pack test --headless --firefox crates/mklb-web`.

use mklb_core::{Dom, Lightbox, LightboxConfig, LightboxError};
use mklb_web::dom::MOUNTED_ATTRIBUTE;
use mklb_web::{WebDom, WebScheduler};
use pretty_assertions::assert_eq;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn add_image(dom: &WebDom, src: &str, gallery: Option<&str>) -> web_sys::Element {
    let img = dom.create_element("img").unwrap();
    img.set_attribute("src", src).unwrap();
    img.set_class_name("mklbItem");
    if let Some(gallery) = gallery {
        img.set_attribute("data-gallery", gallery).unwrap();
    }
    dom.append_to_body(&img).unwrap();
    img
}

fn web_host() -> (WebDom, WebScheduler) {
    let window = web_sys::window().unwrap();
    (WebDom::from_window().unwrap(), WebScheduler::new(window))
}

#[wasm_bindgen_test]
fn clone_is_independent_of_source() {
    let (dom, _) = web_host();
    let img = add_image(&dom, "a.png", None);
    let copy = dom.clone_shallow(&img).unwrap();
    assert_eq!(copy.get_attribute("src").as_deref(), Some("a.png"));
    dom.add_class(&copy, "shown");
    assert!(!dom.has_class(&img, "shown"));
    dom.clear_classes(&copy);
    assert!(!dom.has_class(&copy, "shown"));
}

#[wasm_bindgen_test]
fn scroll_lock_toggles_overflow() {
    let (dom, _) = web_host();
    let root = dom
        .document()
        .scrolling_element()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    dom.set_scroll_locked(true);
    assert_eq!(root.style().get_property_value("overflow-y").unwrap(), "hidden");
    dom.set_scroll_locked(false);
    assert_eq!(root.style().get_property_value("overflow-y").unwrap(), "");
}

#[wasm_bindgen_test]
fn trigger_click_opens_overlay() {
    let (dom, sched) = web_host();
    let config = LightboxConfig::default().item_selector("img.smoke");
    let img = add_image(&dom, "b.png", Some("smoke"));
    img.set_class_name("smoke");
    let lightbox = Lightbox::scan(dom.clone(), sched.clone(), config.clone()).unwrap();
    assert_eq!(lightbox.viewers().len(), 1);

    // One lightbox per document.
    let root = dom.document().document_element().unwrap();
    assert!(root.has_attribute(MOUNTED_ATTRIBUTE));
    let again = Lightbox::scan(dom.clone(), sched, config);
    assert!(matches!(again, Err(LightboxError::AlreadyMounted)));

    img.dyn_ref::<HtmlElement>().unwrap().click();
    let viewer = &lightbox.viewers()[0];
    assert!(viewer.is_open());
    assert!(dom.has_class(&viewer.slides()[0], "from-left"));

    viewer.close();
    assert!(!viewer.is_open());
    assert!(viewer.slides().iter().all(|s| s.class_name().is_empty()));
}
