#![forbid(unsafe_code)]

//! Page-wide bookkeeping shared by every viewer of one mounted lightbox.
//!
//! The `Coordinator` keeps the open viewers in a LIFO stack and owns the
//! page scroll lock. Viewers report opening and closing; the coordinator
//! tells them when the page lock must actually change, and tells the key
//! dispatcher which viewer is on top.
//!
//! # Invariants
//!
//! - A viewer appears in the stack at most once.
//! - The lock count equals the stack depth; the page is locked iff the
//!   stack is non-empty.
//! - Keys go to the top of the stack only.
//!
//! # Failure Modes
//!
//! - `release()` for a viewer that is not open returns `false` (no-op).
//! - `acquire()` for a viewer that is already open returns `false` and does
//!   not count it twice.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique viewer IDs.
static VIEWER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewerId(u64);

impl ViewerId {
    /// Allocate a new unique viewer ID.
    pub(crate) fn next() -> Self {
        Self(VIEWER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Open-viewer stack and scroll-lock reference count.
///
/// Uses interior mutability: viewers hold a shared `Rc<Coordinator>` and
/// report state changes from event handlers.
#[derive(Debug, Default)]
pub struct Coordinator {
    open: RefCell<Vec<ViewerId>>,
}

impl Coordinator {
    /// Create a coordinator with nothing open.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` opened.
    ///
    /// Returns `true` when this is the first open viewer, i.e. the page must
    /// be locked now.
    pub fn acquire(&self, id: ViewerId) -> bool {
        let mut open = self.open.borrow_mut();
        if open.contains(&id) {
            return false;
        }
        open.push(id);
        open.len() == 1
    }

    /// Record that `id` closed.
    ///
    /// Returns `true` when no viewer is left open, i.e. the page must be
    /// unlocked now.
    pub fn release(&self, id: ViewerId) -> bool {
        let mut open = self.open.borrow_mut();
        let Some(idx) = open.iter().position(|&v| v == id) else {
            return false;
        };
        open.remove(idx);
        open.is_empty()
    }

    /// The viewer that receives keys, if any.
    pub fn top(&self) -> Option<ViewerId> {
        self.open.borrow().last().copied()
    }

    /// Check if `id` is open.
    pub fn is_open(&self, id: ViewerId) -> bool {
        self.open.borrow().contains(&id)
    }

    /// Number of open viewers, which is also the scroll-lock count.
    #[inline]
    pub fn depth(&self) -> usize {
        self.open.borrow().len()
    }

    /// Whether the page should currently be scroll-locked.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.depth() > 0
    }
}
