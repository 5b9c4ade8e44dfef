#![forbid(unsafe_code)]

//! In-memory host for tests and fuzzing.
//!
//! [`MemoryDom`] is an arena document: elements with tags, attributes, an
//! ordered class list, and parent links. Clicks bubble from the target up to
//! the body, calling every listener on the way with the original target, the
//! same way the browser does. [`ManualScheduler`] is a virtual clock: nothing
//! runs until the test advances time or flushes a frame.
//!
//! Both types are `Rc` handles; clones share state. Neither holds a borrow
//! while calling back into user code, so handlers may freely touch the
//! document or schedule more work.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use crate::error::DomError;
use crate::host::{ClickHandler, Dom, KeyHandler, Scheduler, Task};
use crate::input::Key;

/// Handle to an element in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            attrs: Vec::new(),
            classes: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

struct Arena {
    nodes: Vec<NodeData>,
    body: NodeId,
    click_listeners: Vec<(NodeId, Rc<dyn Fn(&NodeId)>)>,
    key_listeners: Vec<Rc<dyn Fn(Key)>>,
    scroll_locked: bool,
    scroll_writes: usize,
    refuse_clone: HashSet<NodeId>,
    claimed: bool,
}

/// An in-memory document.
#[derive(Clone)]
pub struct MemoryDom {
    inner: Rc<RefCell<Arena>>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let arena = self.inner.borrow();
        f.debug_struct("MemoryDom")
            .field("nodes", &arena.nodes.len())
            .field("scroll_locked", &arena.scroll_locked)
            .finish()
    }
}

impl MemoryDom {
    /// Create a document with an empty body.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Arena {
                nodes: vec![NodeData::new("body")],
                body: NodeId(0),
                click_listeners: Vec::new(),
                key_listeners: Vec::new(),
                scroll_locked: false,
                scroll_writes: 0,
                refuse_clone: HashSet::new(),
                claimed: false,
            })),
        }
    }

    /// The body element.
    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    /// Append an `<img>` with the given `src` and classes to the body.
    pub fn add_image(&self, src: &str, classes: &[&str]) -> NodeId {
        let mut arena = self.inner.borrow_mut();
        let id = NodeId(arena.nodes.len());
        let mut data = NodeData::new("img");
        data.attrs.push(("src".into(), src.into()));
        data.classes = classes.iter().map(|c| (*c).to_owned()).collect();
        let body = arena.body;
        data.parent = Some(body);
        arena.nodes.push(data);
        arena.nodes[body.0].children.push(id);
        id
    }

    /// Set or replace an attribute.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        let mut arena = self.inner.borrow_mut();
        let attrs = &mut arena.nodes[node.0].attrs;
        match attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_owned(),
            None => attrs.push((name.to_owned(), value.to_owned())),
        }
    }

    /// Make the next `clone_shallow` of `node` fail.
    pub fn refuse_clone(&self, node: NodeId) {
        self.inner.borrow_mut().refuse_clone.insert(node);
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.inner.borrow().nodes[node.0].tag.clone()
    }

    /// Classes on `node`, in insertion order.
    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.inner.borrow().nodes[node.0].classes.clone()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.borrow().nodes[node.0].children.clone()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes[node.0].parent
    }

    /// Elements with `tag` carrying `class` (any tag when `tag` is empty),
    /// in document order.
    pub fn select(&self, tag: &str, class: Option<&str>) -> Vec<NodeId> {
        let arena = self.inner.borrow();
        let mut found = Vec::new();
        let mut stack = vec![arena.body];
        while let Some(id) = stack.pop() {
            let data = &arena.nodes[id.0];
            let tag_ok = tag.is_empty() || data.tag == tag;
            let class_ok = class.is_none_or(|class| data.classes.iter().any(|c| c == class));
            if id != arena.body && tag_ok && class_ok {
                found.push(id);
            }
            stack.extend(data.children.iter().rev().copied());
        }
        found
    }

    /// Whether the page scroll lock is engaged.
    pub fn is_scroll_locked(&self) -> bool {
        self.inner.borrow().scroll_locked
    }

    /// How many times the scroll lock was written.
    pub fn scroll_writes(&self) -> usize {
        self.inner.borrow().scroll_writes
    }

    /// Whether a lightbox claimed this document.
    pub fn is_claimed(&self) -> bool {
        self.inner.borrow().claimed
    }

    pub fn click_listener_count(&self) -> usize {
        self.inner.borrow().click_listeners.len()
    }

    pub fn key_listener_count(&self) -> usize {
        self.inner.borrow().key_listeners.len()
    }

    /// Dispatch a click on `target`, bubbling up to the body.
    pub fn click(&self, target: NodeId) {
        let handlers: Vec<Rc<dyn Fn(&NodeId)>> = {
            let arena = self.inner.borrow();
            let mut path = Vec::new();
            let mut cursor = Some(target);
            while let Some(id) = cursor {
                path.push(id);
                cursor = arena.nodes[id.0].parent;
            }
            let mut handlers = Vec::new();
            for id in &path {
                for (node, handler) in &arena.click_listeners {
                    if node == id {
                        handlers.push(Rc::clone(handler));
                    }
                }
            }
            handlers
        };
        for handler in handlers {
            handler(&target);
        }
    }

    /// Dispatch a key release with the given `KeyboardEvent.code`.
    pub fn key_up(&self, code: &str) {
        let handlers: Vec<_> = self.inner.borrow().key_listeners.clone();
        let key = Key::from_code(code);
        for handler in handlers {
            handler(key);
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    /// Supports `tag`, `.class`, and `tag.class` selectors.
    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let (tag, class) = match selector.split_once('.') {
            Some((tag, class)) => (tag, Some(class)),
            None => (selector, None),
        };
        if selector.is_empty() || class.is_some_and(|c| c.is_empty() || c.contains('.')) {
            return Err(DomError::new("query_all", format!("unsupported selector `{selector}`")));
        }
        Ok(self.select(tag, class))
    }

    fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
        let mut arena = self.inner.borrow_mut();
        let id = NodeId(arena.nodes.len());
        arena.nodes.push(NodeData::new(tag));
        Ok(id)
    }

    fn clone_shallow(&self, node: &NodeId) -> Result<NodeId, DomError> {
        let mut arena = self.inner.borrow_mut();
        if arena.refuse_clone.remove(node) {
            return Err(DomError::new("clone_shallow", "refused by test"));
        }
        let source = &arena.nodes[node.0];
        let copy = NodeData {
            tag: source.tag.clone(),
            attrs: source.attrs.clone(),
            classes: source.classes.clone(),
            parent: None,
            children: Vec::new(),
        };
        let id = NodeId(arena.nodes.len());
        arena.nodes.push(copy);
        Ok(id)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        let mut arena = self.inner.borrow_mut();
        if parent == child {
            return Err(DomError::new("append_child", "node cannot contain itself"));
        }
        if let Some(old) = arena.nodes[child.0].parent {
            arena.nodes[old.0].children.retain(|c| c != child);
        }
        arena.nodes[child.0].parent = Some(*parent);
        arena.nodes[parent.0].children.push(*child);
        Ok(())
    }

    fn append_to_body(&self, node: &NodeId) -> Result<(), DomError> {
        let body = self.body();
        self.append_child(&body, node)
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.inner.borrow().nodes[node.0]
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut arena = self.inner.borrow_mut();
        let classes = &mut arena.nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_owned());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.inner.borrow_mut().nodes[node.0]
            .classes
            .retain(|c| c != class);
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.inner.borrow().nodes[node.0]
            .classes
            .iter()
            .any(|c| c == class)
    }

    fn clear_classes(&self, node: &NodeId) {
        self.inner.borrow_mut().nodes[node.0].classes.clear();
    }

    fn set_scroll_locked(&self, locked: bool) {
        let mut arena = self.inner.borrow_mut();
        arena.scroll_locked = locked;
        arena.scroll_writes += 1;
    }

    fn on_click(&self, node: &NodeId, handler: ClickHandler<NodeId>) {
        self.inner
            .borrow_mut()
            .click_listeners
            .push((*node, Rc::from(handler)));
    }

    fn on_key_up(&self, handler: KeyHandler) {
        self.inner.borrow_mut().key_listeners.push(Rc::from(handler));
    }

    fn claim_document(&self) -> Result<bool, DomError> {
        let mut arena = self.inner.borrow_mut();
        Ok(!std::mem::replace(&mut arena.claimed, true))
    }
}

struct Timer {
    deadline: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    seq: u64,
    timers: Vec<Timer>,
    frames: Vec<Task>,
}

/// A scheduler driven by the test.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<Clock>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clock = self.inner.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &clock.now)
            .field("timers", &clock.timers.len())
            .field("frames", &clock.frames.len())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed so far.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.inner.borrow().frames.len()
    }

    /// Run the animation-frame tasks queued so far. Tasks queued while
    /// running wait for the next frame. Returns how many ran.
    pub fn run_frame(&self) -> usize {
        let frames = std::mem::take(&mut self.inner.borrow_mut().frames);
        let count = frames.len();
        for task in frames {
            task();
        }
        count
    }

    /// Move the clock forward by `by`, running due timeouts in deadline
    /// order (ties in scheduling order). Returns how many ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        loop {
            let task = {
                let mut clock = self.inner.borrow_mut();
                let due = clock
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.deadline <= target)
                    .min_by_key(|(_, t)| (t.deadline, t.seq))
                    .map(|(i, _)| i);
                match due {
                    Some(i) => {
                        let timer = clock.timers.swap_remove(i);
                        clock.now = timer.deadline;
                        timer.task
                    }
                    None => break,
                }
            };
            task();
            ran += 1;
        }
        self.inner.borrow_mut().now = target;
        ran
    }

    /// Flush frames and timers until nothing is pending.
    pub fn settle(&self) {
        loop {
            let frames = self.run_frame();
            let next = self
                .inner
                .borrow()
                .timers
                .iter()
                .map(|t| t.deadline)
                .min();
            let timers = match next {
                Some(deadline) => self.advance(deadline.saturating_sub(self.now())),
                None => 0,
            };
            if frames == 0 && timers == 0 {
                break;
            }
        }
    }
}

impl Scheduler for ManualScheduler {
    fn set_timeout(&self, delay: Duration, task: Task) {
        let mut clock = self.inner.borrow_mut();
        let deadline = clock.now + delay;
        let seq = clock.seq;
        clock.seq += 1;
        clock.timers.push(Timer {
            deadline,
            seq,
            task,
        });
    }

    fn request_animation_frame(&self, task: Task) {
        self.inner.borrow_mut().frames.push(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn clone_keeps_attributes_but_is_a_new_node() {
        let dom = MemoryDom::new();
        let img = dom.add_image("a.jpg", &["mklbItem"]);
        let copy = dom.clone_shallow(&img).unwrap();
        assert_ne!(img, copy);
        assert_eq!(dom.attribute(&copy, "src").as_deref(), Some("a.jpg"));
        dom.add_class(&copy, "shown");
        assert!(!dom.has_class(&img, "shown"));
        assert_eq!(dom.parent(copy), None);
    }

    #[test]
    fn clicks_bubble_with_original_target() {
        let dom = MemoryDom::new();
        let outer = dom.create_element("div").unwrap();
        let inner = dom.create_element("span").unwrap();
        dom.append_child(&outer, &inner).unwrap();
        dom.append_to_body(&outer).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        dom.on_click(&outer, Box::new(move |t: &NodeId| log.borrow_mut().push(*t)));

        dom.click(inner);
        dom.click(outer);
        assert_eq!(*seen.borrow(), vec![inner, outer]);
    }

    #[test]
    fn select_walks_document_order() {
        let dom = MemoryDom::new();
        let a = dom.add_image("a", &["x"]);
        let _ = dom.add_image("b", &["y"]);
        let c = dom.add_image("c", &["x", "z"]);
        assert_eq!(dom.select("img", Some("x")), vec![a, c]);
        assert_eq!(dom.query_all("img.x").unwrap(), vec![a, c]);
        assert_eq!(dom.query_all(".z").unwrap(), vec![c]);
        assert_eq!(dom.query_all("img").unwrap().len(), 3);
        assert!(dom.query_all("img.").is_err());
    }

    #[test]
    fn document_is_claimed_once() {
        let dom = MemoryDom::new();
        assert!(!dom.is_claimed());
        assert_eq!(dom.claim_document(), Ok(true));
        assert_eq!(dom.clone().claim_document(), Ok(false));
        assert!(dom.is_claimed());
    }

    #[test]
    fn refused_clone_fails_once() {
        let dom = MemoryDom::new();
        let img = dom.add_image("a", &[]);
        dom.refuse_clone(img);
        assert!(dom.clone_shallow(&img).is_err());
        assert!(dom.clone_shallow(&img).is_ok());
    }

    #[test]
    fn timers_run_in_deadline_order() {
        let sched = ManualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(30, 'b'), (10, 'a'), (30, 'c')] {
            let order = Rc::clone(&order);
            sched.set_timeout(
                Duration::from_millis(delay),
                Box::new(move || order.borrow_mut().push(tag)),
            );
        }
        assert_eq!(sched.advance(Duration::from_millis(20)), 1);
        assert_eq!(sched.advance(Duration::from_millis(20)), 2);
        assert_eq!(*order.borrow(), vec!['a', 'b', 'c']);
        assert_eq!(sched.now(), Duration::from_millis(40));
    }

    #[test]
    fn frame_tasks_queued_during_a_frame_wait() {
        let sched = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let inner_sched = sched.clone();
        let inner_hits = Rc::clone(&hits);
        sched.request_animation_frame(Box::new(move || {
            inner_hits.set(inner_hits.get() + 1);
            let again = Rc::clone(&inner_hits);
            inner_sched.request_animation_frame(Box::new(move || again.set(again.get() + 1)));
        }));
        assert_eq!(sched.run_frame(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(sched.pending_frames(), 1);
        sched.settle();
        assert_eq!(hits.get(), 2);
    }
}
