#![forbid(unsafe_code)]

//! Host seams: the document the overlay lives in and the clock it animates on.
//!
//! The state machine never touches a browser API directly. `mklb-web`
//! implements both traits over `web-sys`; the `test-helpers` feature provides
//! in-memory versions in [`crate::testing`].
//!
//! # Invariants
//!
//! - `Dom` handles are cheap clones of one shared document.
//! - `Node` equality is identity: two handles are equal iff they name the same
//!   element.
//! - Listeners registered through `Dom` live as long as the document.
//! - A document is claimed by at most one lightbox.
//! - Tasks handed to a `Scheduler` always eventually run exactly once; there
//!   is no cancellation.

use std::time::Duration;

use crate::error::DomError;
use crate::input::Key;

/// Click handler. Receives the event target, which may be a descendant of the
/// node the handler was registered on.
pub type ClickHandler<N> = Box<dyn Fn(&N)>;

/// Key-release handler.
pub type KeyHandler = Box<dyn Fn(Key)>;

/// A deferred task.
pub type Task = Box<dyn FnOnce()>;

/// The document that hosts trigger images and overlays.
pub trait Dom: Clone + 'static {
    /// Element handle.
    type Node: Clone + PartialEq + std::fmt::Debug + 'static;

    /// Elements matching a CSS selector, in document order.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, DomError>;

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

    /// Copy an element without its children. Attributes (including `src`)
    /// are kept; the copy is a separate element.
    fn clone_shallow(&self, node: &Self::Node) -> Result<Self::Node, DomError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    /// Append `node` as the last child of the document body.
    fn append_to_body(&self, node: &Self::Node) -> Result<(), DomError>;

    /// Read an attribute.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn add_class(&self, node: &Self::Node, class: &str);

    fn remove_class(&self, node: &Self::Node, class: &str);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Drop every class from `node`.
    fn clear_classes(&self, node: &Self::Node);

    /// Lock or unlock vertical scrolling of the page.
    fn set_scroll_locked(&self, locked: bool);

    /// Listen for clicks on `node` and its descendants.
    fn on_click(&self, node: &Self::Node, handler: ClickHandler<Self::Node>);

    /// Listen for key releases anywhere in the document.
    fn on_key_up(&self, handler: KeyHandler);

    /// Mark the document as owned by a mounted lightbox.
    ///
    /// Returns `Ok(false)` if it was already marked. The mark is never
    /// removed.
    fn claim_document(&self) -> Result<bool, DomError>;
}

/// Deferred execution on the host's clock.
pub trait Scheduler: Clone + 'static {
    /// Run `task` once `delay` has elapsed.
    fn set_timeout(&self, delay: Duration, task: Task);

    /// Run `task` before the next repaint.
    fn request_animation_frame(&self, task: Task);
}
