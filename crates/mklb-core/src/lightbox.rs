#![forbid(unsafe_code)]

//! Page-level mounting: find trigger images, group them, build one viewer
//! per group, and route keyboard input.
//!
//! A mounted [`Lightbox`] registers a single document key listener. Keys go
//! to the most recently opened viewer that is still open, so N viewers cost
//! one listener and two open viewers never both react to the same key.
//!
//! A document holds at most one lightbox. The coordinator owns the page
//! scroll lock, so a second mount would bind a second set of viewers to the
//! same triggers with a lock count of its own.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Selector rejected by the host | `scan` returns the error, nothing is built |
//! | Document already mounted | `AlreadyMounted`, nothing is built |
//! | Configuration fails validation | `Config`, nothing is built |
//! | One viewer fails to build | Logged and counted; the others still mount |
//! | No trigger images | Empty lightbox; the key listener is still bound |

use std::rc::{Rc, Weak};

use crate::config::LightboxConfig;
use crate::coordinator::{Coordinator, ViewerId};
use crate::error::LightboxError;
use crate::group::{Partition, Trigger};
use crate::host::{Dom, Scheduler};
use crate::input::{Key, ViewerAction};
use crate::viewer::Viewer;

/// All viewers of one page.
pub struct Lightbox<D: Dom, S: Scheduler> {
    coordinator: Rc<Coordinator>,
    viewers: Vec<Rc<Viewer<D, S>>>,
    failures: Vec<LightboxError>,
}

impl<D: Dom, S: Scheduler> std::fmt::Debug for Lightbox<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lightbox")
            .field("viewers", &self.viewers.len())
            .field("failures", &self.failures)
            .field("open", &self.coordinator.depth())
            .finish()
    }
}

impl<D: Dom, S: Scheduler> Lightbox<D, S> {
    /// Scan the page for `config.item_selector` and mount viewers.
    pub fn scan(dom: D, scheduler: S, config: LightboxConfig) -> Result<Rc<Self>, LightboxError> {
        let nodes = dom.query_all(&config.item_selector)?;
        let triggers: Vec<_> = nodes
            .into_iter()
            .map(|node| {
                let group = dom.attribute(&node, &config.group_attribute);
                Trigger { node, group }
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            selector = %config.item_selector,
            triggers = triggers.len(),
            "scanned page"
        );

        Self::mount(dom, scheduler, config, triggers)
    }

    /// Group `triggers` (document order) and build one viewer per group.
    ///
    /// Fails with [`LightboxError::Config`] if `config` does not validate and
    /// with [`LightboxError::AlreadyMounted`] if the document was claimed
    /// before. Either way nothing is built.
    pub fn mount(
        dom: D,
        scheduler: S,
        config: LightboxConfig,
        triggers: impl IntoIterator<Item = Trigger<D::Node>>,
    ) -> Result<Rc<Self>, LightboxError> {
        config.validate()?;
        if !dom.claim_document()? {
            return Err(LightboxError::AlreadyMounted);
        }
        let config = Rc::new(config);
        let coordinator = Rc::new(Coordinator::new());
        let partition = Partition::from_triggers(triggers);

        let mut viewers = Vec::with_capacity(partition.viewer_count());
        let mut failures = Vec::new();
        for images in partition.into_lists() {
            match Viewer::new(
                dom.clone(),
                scheduler.clone(),
                Rc::clone(&coordinator),
                Rc::clone(&config),
                &images,
            ) {
                Ok(viewer) => viewers.push(viewer),
                Err(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %err, images = images.len(), "viewer failed to mount");
                    failures.push(err);
                }
            }
        }

        let lightbox = Rc::new(Self {
            coordinator,
            viewers,
            failures,
        });

        let weak: Weak<Self> = Rc::downgrade(&lightbox);
        dom.on_key_up(Box::new(move |key| {
            if let Some(lightbox) = weak.upgrade() {
                lightbox.dispatch_key(key);
            }
        }));

        Ok(lightbox)
    }

    /// Route a key release to the top open viewer.
    pub fn dispatch_key(&self, key: Key) -> Option<ViewerAction> {
        let viewer = self.viewer(self.coordinator.top()?)?;
        viewer.handle_key(key)
    }

    /// Viewers in mount order: standalone images first, then galleries.
    pub fn viewers(&self) -> &[Rc<Viewer<D, S>>] {
        &self.viewers
    }

    pub fn viewer(&self, id: ViewerId) -> Option<&Rc<Viewer<D, S>>> {
        self.viewers.iter().find(|v| v.id() == id)
    }

    /// The viewer currently receiving keys.
    pub fn active(&self) -> Option<&Rc<Viewer<D, S>>> {
        self.viewer(self.coordinator.top()?)
    }

    /// Viewers that could not be built.
    pub fn failures(&self) -> &[LightboxError] {
        &self.failures
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Close every open viewer, most recent first.
    pub fn close_all(&self) {
        while let Some(viewer) = self.active() {
            viewer.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverlayClasses;
    use crate::testing::{ManualScheduler, MemoryDom, NodeId};

    fn page(spec: &[Option<&str>]) -> (MemoryDom, Vec<NodeId>) {
        let dom = MemoryDom::new();
        let nodes = spec
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let node = dom.add_image(&format!("{i}.jpg"), &["mklbItem"]);
                if let Some(group) = group {
                    dom.set_attribute(node, "data-gallery", group);
                }
                node
            })
            .collect();
        (dom, nodes)
    }

    fn scan(dom: &MemoryDom, sched: &ManualScheduler) -> Rc<Lightbox<MemoryDom, ManualScheduler>> {
        Lightbox::scan(dom.clone(), sched.clone(), LightboxConfig::default()).unwrap()
    }

    #[test]
    fn scan_builds_standalone_then_galleries() {
        let (dom, imgs) = page(&[Some("A"), None, Some("A")]);
        let lightbox = scan(&dom, &ManualScheduler::new());
        let viewers = lightbox.viewers();
        assert_eq!(viewers.len(), 2);
        assert_eq!(viewers[0].trigger(), &imgs[1]);
        assert_eq!(viewers[0].slide_count(), 1);
        assert_eq!(viewers[1].trigger(), &imgs[0]);
        assert_eq!(viewers[1].slide_count(), 2);
        assert_eq!(
            dom.attribute(&viewers[1].slides()[1], "src").as_deref(),
            Some("2.jpg")
        );
        assert!(lightbox.failures().is_empty());
        assert_eq!(dom.key_listener_count(), 1);
    }

    #[test]
    fn scan_ignores_unmarked_images() {
        let dom = MemoryDom::new();
        dom.add_image("plain.jpg", &["photo"]);
        let lightbox = scan(&dom, &ManualScheduler::new());
        assert!(lightbox.viewers().is_empty());
    }

    #[test]
    fn keys_reach_only_the_top_viewer() {
        let (dom, imgs) = page(&[None, Some("g"), Some("g")]);
        let sched = ManualScheduler::new();
        let lightbox = scan(&dom, &sched);
        let solo = Rc::clone(&lightbox.viewers()[0]);
        let gallery = Rc::clone(&lightbox.viewers()[1]);

        dom.key_up("ArrowRight");
        assert_eq!(gallery.current_index(), 0);

        dom.click(imgs[1]);
        sched.settle();
        dom.key_up("ArrowRight");
        assert_eq!(gallery.current_index(), 1);

        solo.open();
        assert_eq!(lightbox.active().map(|v| v.id()), Some(solo.id()));
        dom.key_up("ArrowLeft");
        assert_eq!(gallery.current_index(), 1);

        dom.key_up("Escape");
        assert!(!solo.is_open());
        assert!(gallery.is_open());
        assert!(dom.is_scroll_locked());

        dom.key_up("Escape");
        assert!(!gallery.is_open());
        assert!(!dom.is_scroll_locked());
    }

    #[test]
    fn close_all_unlocks_page() {
        let (dom, _) = page(&[None, None]);
        let lightbox = scan(&dom, &ManualScheduler::new());
        for viewer in lightbox.viewers() {
            viewer.open();
        }
        assert_eq!(lightbox.coordinator().depth(), 2);
        lightbox.close_all();
        assert!(lightbox.active().is_none());
        assert!(!dom.is_scroll_locked());
    }

    #[test]
    fn failed_viewer_does_not_block_others() {
        let (dom, imgs) = page(&[None, None, None]);
        dom.refuse_clone(imgs[1]);
        let lightbox = scan(&dom, &ManualScheduler::new());
        assert_eq!(lightbox.viewers().len(), 2);
        assert_eq!(lightbox.failures().len(), 1);
        dom.click(imgs[2]);
        assert!(lightbox.viewers()[1].is_open());
    }

    #[test]
    fn second_mount_is_rejected() {
        let (dom, imgs) = page(&[None, Some("g"), Some("g")]);
        let sched = ManualScheduler::new();
        let lightbox = scan(&dom, &sched);
        let listeners = dom.click_listener_count();

        let again = Lightbox::scan(dom.clone(), sched.clone(), LightboxConfig::default());
        assert!(matches!(again, Err(LightboxError::AlreadyMounted)));
        assert_eq!(dom.click_listener_count(), listeners);
        assert_eq!(dom.key_listener_count(), 1);
        assert_eq!(dom.select("div", Some("lightbox-wrapper")).len(), 2);

        dom.click(imgs[1]);
        assert_eq!(lightbox.coordinator().depth(), 1);
        dom.key_up("Escape");
        assert!(!dom.is_scroll_locked());
    }

    #[test]
    fn invalid_config_is_rejected_before_claiming() {
        let (dom, _) = page(&[None]);
        let config = LightboxConfig::default().classes(OverlayClasses {
            wrapper: "shown".into(),
            ..OverlayClasses::default()
        });
        let result = Lightbox::scan(dom.clone(), ManualScheduler::new(), config);
        assert!(matches!(result, Err(LightboxError::Config(_))));
        assert!(!dom.is_claimed());
        assert_eq!(dom.click_listener_count(), 0);
        assert!(dom.select("div", None).is_empty());
    }

    #[test]
    fn bad_selector_is_an_error() {
        let dom = MemoryDom::new();
        let config = LightboxConfig::default().item_selector("img.");
        let result = Lightbox::scan(dom.clone(), ManualScheduler::new(), config);
        assert!(matches!(result, Err(LightboxError::Dom(_))));
        assert!(!dom.is_claimed());
    }
}
