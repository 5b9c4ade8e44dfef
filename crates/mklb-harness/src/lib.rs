#![forbid(unsafe_code)]

//! Test harness for mklb: in-memory pages, a virtual clock, textual marker
//! snapshots, and a checker for the invariants every viewer must hold.
//!
//! ```ignore
//! let mut page = Page::new();
//! let a = page.gallery_image("a.jpg", "trip");
//! page.gallery_image("b.jpg", "trip");
//! let lightbox = page.mount();
//!
//! page.click(a);
//! page.settle();
//! assert_markers!(page, lightbox.viewers()[0], "wrapper[shown] 0[shown] 1[]");
//! ```

use std::rc::Rc;
use std::time::Duration;

use mklb_core::testing::{ManualScheduler, MemoryDom, NodeId};
use mklb_core::{Dom, Lightbox, LightboxConfig, LightboxError, Marker, Viewer};

#[doc(hidden)]
pub use pretty_assertions;

/// Lightbox over the in-memory host.
pub type TestLightbox = Lightbox<MemoryDom, ManualScheduler>;
/// Viewer over the in-memory host.
pub type TestViewer = Viewer<MemoryDom, ManualScheduler>;

/// Class marking trigger images in the default configuration.
pub const ITEM_CLASS: &str = "mklbItem";

/// A page under test.
#[derive(Debug, Default)]
pub struct Page {
    pub dom: MemoryDom,
    pub clock: ManualScheduler,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// A trigger image outside any gallery.
    pub fn image(&self, src: &str) -> NodeId {
        self.dom.add_image(src, &[ITEM_CLASS])
    }

    /// A trigger image in `gallery`.
    pub fn gallery_image(&self, src: &str, gallery: &str) -> NodeId {
        let node = self.image(src);
        self.dom.set_attribute(node, "data-gallery", gallery);
        node
    }

    /// An image the lightbox must ignore.
    pub fn plain_image(&self, src: &str) -> NodeId {
        self.dom.add_image(src, &[])
    }

    /// Scan and mount with the default configuration.
    pub fn mount(&self) -> Rc<TestLightbox> {
        self.mount_with(LightboxConfig::default())
    }

    pub fn mount_with(&self, config: LightboxConfig) -> Rc<TestLightbox> {
        match self.try_mount_with(config) {
            Ok(lightbox) => lightbox,
            Err(err) => panic!("scan failed: {err}"),
        }
    }

    pub fn try_mount_with(
        &self,
        config: LightboxConfig,
    ) -> Result<Rc<TestLightbox>, LightboxError> {
        Lightbox::scan(self.dom.clone(), self.clock.clone(), config)
    }

    pub fn click(&self, node: NodeId) {
        self.dom.click(node);
    }

    /// Release a key by its `KeyboardEvent.code`.
    pub fn key(&self, code: &str) {
        self.dom.key_up(code);
    }

    /// Run one animation frame.
    pub fn frame(&self) {
        self.clock.run_frame();
    }

    pub fn wait(&self, millis: u64) {
        self.clock.advance(Duration::from_millis(millis));
    }

    /// Drain every pending frame and timeout.
    pub fn settle(&self) {
        self.clock.settle();
    }

    pub fn is_idle(&self) -> bool {
        self.clock.pending_frames() == 0 && self.clock.pending_timers() == 0
    }

    /// Marker classes on `node`, in application order.
    pub fn markers(&self, node: NodeId) -> Vec<String> {
        self.dom.classes(node)
    }

    /// Render a viewer's marker state as `wrapper[..] 0[..] 1[..]`, using
    /// the marker names the viewer was built with.
    pub fn snapshot(&self, viewer: &TestViewer) -> String {
        let overlay = viewer.overlay();
        let shown = viewer.config().markers.name(Marker::Shown);
        let mut out = if self.dom.has_class(&overlay.wrapper, shown) {
            format!("wrapper[{shown}]")
        } else {
            "wrapper[]".to_owned()
        };
        for (i, slide) in overlay.slides.iter().enumerate() {
            out.push_str(&format!(" {i}[{}]", self.dom.classes(*slide).join(",")));
        }
        out
    }
}

/// Assert a viewer's marker snapshot.
#[macro_export]
macro_rules! assert_markers {
    ($page:expr, $viewer:expr, $expected:expr) => {
        $crate::pretty_assertions::assert_eq!($page.snapshot(&$viewer), $expected)
    };
}

/// Check the invariants that hold at every instant.
///
/// When `idle` is set (no pending frames or timeouts), also check the
/// settled-state invariants: an open viewer shows exactly its current slide
/// and no slide carries a transient marker. Marker names come from each
/// viewer's own configuration.
pub fn check_invariants(page: &Page, lightbox: &TestLightbox, idle: bool) -> Result<(), String> {
    let mut open = 0;

    for (v, viewer) in lightbox.viewers().iter().enumerate() {
        let names = &viewer.config().markers;
        let n = viewer.slide_count();
        if n == 0 {
            return Err(format!("viewer {v} has no slides"));
        }
        let index = viewer.current_index();
        if index >= n {
            return Err(format!("viewer {v}: index {index} out of range {n}"));
        }
        if page.dom.has_class(viewer.trigger(), &names.shown) {
            return Err(format!("viewer {v}: trigger image was marked"));
        }

        let shown: Vec<usize> = viewer
            .slides()
            .iter()
            .enumerate()
            .filter(|(_, s)| page.dom.has_class(s, &names.shown))
            .map(|(i, _)| i)
            .collect();

        if !viewer.is_open() {
            if index != 0 {
                return Err(format!("viewer {v}: closed at index {index}"));
            }
            if let Some(slide) = viewer
                .slides()
                .iter()
                .position(|s| !page.dom.classes(*s).is_empty())
            {
                return Err(format!("viewer {v}: closed with markers on slide {slide}"));
            }
            continue;
        }

        open += 1;
        if shown.len() > 1 {
            return Err(format!("viewer {v}: several shown slides {shown:?}"));
        }
        if idle {
            if shown != [index] {
                return Err(format!(
                    "viewer {v}: settled with shown {shown:?}, current {index}"
                ));
            }
            for (i, slide) in viewer.slides().iter().enumerate() {
                let transient = Marker::ALL
                    .iter()
                    .filter(|m| m.is_transient())
                    .find(|m| page.dom.has_class(slide, names.name(**m)));
                if let Some(marker) = transient {
                    return Err(format!("viewer {v}: slide {i} kept {marker:?}"));
                }
            }
        }
    }

    if page.dom.is_scroll_locked() != (open > 0) {
        return Err(format!(
            "scroll lock {} with {open} open viewers",
            page.dom.is_scroll_locked()
        ));
    }
    if lightbox.coordinator().depth() != open {
        return Err(format!(
            "coordinator tracks {} viewers, {open} are open",
            lightbox.coordinator().depth()
        ));
    }
    Ok(())
}
