#![forbid(unsafe_code)]

//! Lightbox viewer: overlay structure, open/close state, and slide transitions.
//!
//! A viewer is built once per standalone image or gallery and lives as long
//! as the page. It owns a wrapper element holding one display copy per image,
//! a close button, and previous/next arrows.
//!
//! # State machine
//!
//! ```text
//!            open()                 transition elapsed
//!  Closed ───────────▶ Opening ───────────────────────▶ Open
//!    ▲                    │  previous()/next()            │
//!    │                    └───────────────────────────────┤
//!    └──────────────────── close() ◀──────────────────────┘
//! ```
//!
//! # Marker lifecycle
//!
//! - `open()`: wrapper gets `shown`; slide 0 gets `from-left`. After the
//!   transition delay slide 0 trades `from-left` for `shown`.
//! - `next()` / `previous()`: the outgoing slide trades `shown` for its exit
//!   marker and the incoming slide gets its entry marker, in the same tick.
//!   On the next animation frame the incoming slide trades its entry marker
//!   for `shown`. After the transition delay the outgoing slide drops its
//!   exit marker.
//! - `close()`: wrapper loses `shown`; every slide loses every class.
//!
//! # Invariants
//!
//! 1. `current_index() < slide_count()` at all times.
//! 2. While closed, no slide carries a marker.
//! 3. Once deferred work has drained, an open viewer has exactly one `shown`
//!    slide (the current one) and no transient markers.
//! 4. Display copies are separate elements; marking them never touches the
//!    trigger images on the page.
//!
//! # Deferred work and stale callbacks
//!
//! Deferred tasks are never cancelled. Each slide carries a generation
//! number, bumped whenever a transition re-targets the slide or the viewer
//! closes. A task records the generation it was scheduled under and does
//! nothing if the slide has moved on, so rapid input cannot leave two slides
//! shown or strip a marker a newer transition just placed.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::LightboxConfig;
use crate::coordinator::{Coordinator, ViewerId};
use crate::error::LightboxError;
use crate::host::{Dom, Scheduler};
use crate::input::{Control, Key, ViewerAction};
use crate::marker::{Direction, Marker};

/// Viewer lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Closed,
    /// Wrapper visible, first slide still sliding in.
    Opening,
    Open,
}

/// Elements owned by one viewer.
#[derive(Debug, Clone)]
pub struct Overlay<N> {
    /// Page image that opens the viewer. Not owned; only listened to.
    pub trigger: N,
    pub wrapper: N,
    pub slides: Vec<N>,
    pub close: N,
    pub previous: N,
    pub next: N,
}

#[derive(Debug)]
struct ViewerState {
    phase: Phase,
    current: usize,
    generations: Vec<u64>,
}

impl ViewerState {
    fn new(slides: usize) -> Self {
        Self {
            phase: Phase::Closed,
            current: 0,
            generations: vec![0; slides],
        }
    }

    fn bump(&mut self, slide: usize) -> u64 {
        self.generations[slide] += 1;
        self.generations[slide]
    }

    fn is_current(&self, slide: usize, generation: u64) -> bool {
        self.generations[slide] == generation
    }
}

/// One lightbox overlay for one image or one gallery.
pub struct Viewer<D: Dom, S: Scheduler> {
    id: ViewerId,
    dom: D,
    scheduler: S,
    coordinator: Rc<Coordinator>,
    config: Rc<LightboxConfig>,
    overlay: Overlay<D::Node>,
    state: RefCell<ViewerState>,
    this: Weak<Self>,
}

impl<D: Dom, S: Scheduler> std::fmt::Debug for Viewer<D, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Viewer")
            .field("id", &self.id)
            .field("slides", &self.overlay.slides.len())
            .field("phase", &state.phase)
            .field("current", &state.current)
            .finish()
    }
}

impl<D: Dom, S: Scheduler> Viewer<D, S> {
    /// Build the overlay for `images` (document order) and bind its input.
    ///
    /// The first image becomes the trigger. The wrapper is attached to the
    /// body only after every element was created, so a failure leaves the
    /// page untouched.
    pub fn new(
        dom: D,
        scheduler: S,
        coordinator: Rc<Coordinator>,
        config: Rc<LightboxConfig>,
        images: &[D::Node],
    ) -> Result<Rc<Self>, LightboxError> {
        let trigger = images.first().ok_or(LightboxError::EmptyGroup)?.clone();

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("viewer_new", slides = images.len()).entered();

        let overlay = build_overlay(&dom, &config, trigger, images)?;
        let slides = overlay.slides.len();

        let viewer = Rc::new_cyclic(|this| Self {
            id: ViewerId::next(),
            dom,
            scheduler,
            coordinator,
            config,
            overlay,
            state: RefCell::new(ViewerState::new(slides)),
            this: this.clone(),
        });
        viewer.bind();
        Ok(viewer)
    }

    fn bind(&self) {
        let o = &self.overlay;
        self.listen(&o.trigger, Control::Trigger);
        self.listen(&o.close, Control::Close);
        self.listen(&o.wrapper, Control::Backdrop);
        self.listen(&o.previous, Control::Previous);
        self.listen(&o.next, Control::Next);
    }

    fn listen(&self, node: &D::Node, control: Control) {
        let this = self.this.clone();
        self.dom.on_click(
            node,
            Box::new(move |target: &D::Node| {
                if let Some(viewer) = this.upgrade() {
                    viewer.handle_click(control, target);
                }
            }),
        );
    }

    // --- Queries ---

    #[inline]
    pub fn id(&self) -> ViewerId {
        self.id
    }

    pub fn overlay(&self) -> &Overlay<D::Node> {
        &self.overlay
    }

    pub fn trigger(&self) -> &D::Node {
        &self.overlay.trigger
    }

    pub fn slides(&self) -> &[D::Node] {
        &self.overlay.slides
    }

    #[inline]
    pub fn slide_count(&self) -> usize {
        self.overlay.slides.len()
    }

    /// Index of the current slide. Zero whenever closed.
    pub fn current_index(&self) -> usize {
        self.state.borrow().current
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    /// Configuration this viewer was built with.
    pub fn config(&self) -> &LightboxConfig {
        &self.config
    }

    /// Whether the wrapper is visible.
    pub fn is_open(&self) -> bool {
        self.dom
            .has_class(&self.overlay.wrapper, &self.config.markers.shown)
    }

    // --- Input ---

    /// React to a click that reached `control`'s listener with `target` as
    /// the event target.
    pub fn handle_click(&self, control: Control, target: &D::Node) -> Option<ViewerAction> {
        let on_wrapper = *target == self.overlay.wrapper;
        let action = ViewerAction::for_click(control, on_wrapper)?;
        self.apply(action);
        Some(action)
    }

    /// React to a key release. Ignored while closed.
    pub fn handle_key(&self, key: Key) -> Option<ViewerAction> {
        if !self.is_open() {
            return None;
        }
        let action = ViewerAction::for_key(key)?;
        self.apply(action);
        Some(action)
    }

    pub fn apply(&self, action: ViewerAction) {
        match action {
            ViewerAction::Open => self.open(),
            ViewerAction::Close => self.close(),
            ViewerAction::Previous => self.previous(),
            ViewerAction::Next => self.next(),
        }
    }

    // --- Transitions ---

    /// Show the overlay, sliding the first image in from the left.
    ///
    /// Opening an open viewer restarts from the first slide.
    pub fn open(&self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(viewer = self.id.id(), "open");

        let generation = {
            let mut state = self.state.borrow_mut();
            for (i, slide) in self.overlay.slides.iter().enumerate() {
                self.strip_markers(slide);
                state.bump(i);
            }
            state.current = 0;
            state.phase = Phase::Opening;
            state.generations[0]
        };

        self.mark(&self.overlay.wrapper, Marker::Shown);
        self.mark(&self.overlay.slides[0], Marker::FromLeft);
        if self.coordinator.acquire(self.id) {
            self.dom.set_scroll_locked(true);
        }

        let this = self.this.clone();
        self.scheduler.set_timeout(
            self.config.transition_delay(),
            Box::new(move || {
                if let Some(viewer) = this.upgrade() {
                    viewer.finish_open(generation);
                }
            }),
        );
    }

    fn finish_open(&self, generation: u64) {
        let mut state = self.state.borrow_mut();
        if !state.is_current(0, generation) {
            #[cfg(feature = "tracing")]
            tracing::trace!(viewer = self.id.id(), "stale open completion");
            return;
        }
        let first = &self.overlay.slides[0];
        self.unmark(first, Marker::FromLeft);
        self.mark(first, Marker::Shown);
        state.phase = Phase::Open;
    }

    /// Hide the overlay and reset every slide.
    pub fn close(&self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(viewer = self.id.id(), "close");

        self.unmark(&self.overlay.wrapper, Marker::Shown);
        if self.coordinator.release(self.id) {
            self.dom.set_scroll_locked(false);
        }

        let mut state = self.state.borrow_mut();
        state.current = 0;
        state.phase = Phase::Closed;
        for (i, slide) in self.overlay.slides.iter().enumerate() {
            self.dom.clear_classes(slide);
            state.bump(i);
        }
    }

    /// Move to the previous slide, wrapping to the last.
    pub fn previous(&self) {
        self.step(Direction::Previous);
    }

    /// Move to the next slide, wrapping to the first.
    pub fn next(&self) {
        self.step(Direction::Next);
    }

    fn step(&self, direction: Direction) {
        if !self.is_open() {
            return;
        }

        let (from, from_gen, to, to_gen) = {
            let mut state = self.state.borrow_mut();
            let from = state.current;
            let to = direction.step(from, self.slide_count());
            state.current = to;
            state.phase = Phase::Open;

            let outgoing = &self.overlay.slides[from];
            self.strip_markers(outgoing);
            self.mark(outgoing, direction.exit_marker());
            state.bump(from);

            let incoming = &self.overlay.slides[to];
            if to != from {
                self.strip_markers(incoming);
                state.bump(to);
            }
            self.mark(incoming, direction.entry_marker());

            (from, state.generations[from], to, state.generations[to])
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(viewer = self.id.id(), ?direction, from, to, "step");

        let this = self.this.clone();
        self.scheduler.request_animation_frame(Box::new(move || {
            if let Some(viewer) = this.upgrade() {
                viewer.commit_entry(to, to_gen, direction);
            }
        }));

        let this = self.this.clone();
        self.scheduler.set_timeout(
            self.config.transition_delay(),
            Box::new(move || {
                if let Some(viewer) = this.upgrade() {
                    viewer.finish_exit(from, from_gen, direction);
                }
            }),
        );
    }

    fn commit_entry(&self, slide: usize, generation: u64, direction: Direction) {
        if !self.state.borrow().is_current(slide, generation) {
            #[cfg(feature = "tracing")]
            tracing::trace!(viewer = self.id.id(), slide, "stale entry commit");
            return;
        }
        let node = &self.overlay.slides[slide];
        self.unmark(node, direction.entry_marker());
        self.mark(node, Marker::Shown);
    }

    fn finish_exit(&self, slide: usize, generation: u64, direction: Direction) {
        if !self.state.borrow().is_current(slide, generation) {
            #[cfg(feature = "tracing")]
            tracing::trace!(viewer = self.id.id(), slide, "stale exit cleanup");
            return;
        }
        self.unmark(&self.overlay.slides[slide], direction.exit_marker());
    }

    // --- Marker helpers ---

    fn mark(&self, node: &D::Node, marker: Marker) {
        self.dom.add_class(node, self.config.markers.name(marker));
    }

    fn unmark(&self, node: &D::Node, marker: Marker) {
        self.dom.remove_class(node, self.config.markers.name(marker));
    }

    fn strip_markers(&self, node: &D::Node) {
        for marker in Marker::ALL {
            self.unmark(node, marker);
        }
    }
}

fn build_overlay<D: Dom>(
    dom: &D,
    config: &LightboxConfig,
    trigger: D::Node,
    images: &[D::Node],
) -> Result<Overlay<D::Node>, LightboxError> {
    let classes = &config.classes;

    let wrapper = dom.create_element("div")?;
    dom.add_class(&wrapper, &classes.wrapper);

    let mut slides = Vec::with_capacity(images.len());
    for image in images {
        let slide = dom.clone_shallow(image)?;
        dom.clear_classes(&slide);
        dom.append_child(&wrapper, &slide)?;
        slides.push(slide);
    }

    let close = dom.create_element("button")?;
    dom.add_class(&close, &classes.close);
    dom.append_child(&wrapper, &close)?;

    let previous = arrow(dom, &classes.arrow, &classes.previous)?;
    let next = arrow(dom, &classes.arrow, &classes.next)?;
    dom.append_child(&wrapper, &previous)?;
    dom.append_child(&wrapper, &next)?;

    dom.append_to_body(&wrapper)?;

    Ok(Overlay {
        trigger,
        wrapper,
        slides,
        close,
        previous,
        next,
    })
}

/// A navigation button with an inner span for the arrow glyph.
fn arrow<D: Dom>(dom: &D, base: &str, modifier: &str) -> Result<D::Node, LightboxError> {
    let button = dom.create_element("button")?;
    let glyph = dom.create_element("span")?;
    dom.append_child(&button, &glyph)?;
    dom.add_class(&button, base);
    dom.add_class(&button, modifier);
    Ok(button)
}
