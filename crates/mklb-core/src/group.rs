#![forbid(unsafe_code)]

//! Gallery grouping: splits trigger images into standalone images and named
//! galleries.
//!
//! # Invariants
//!
//! 1. Every input appears in exactly one output list.
//! 2. Standalone images keep document order among themselves.
//! 3. Galleries are ordered by the first appearance of their identifier, and
//!    each gallery lists its members in document order.
//! 4. Identifiers match exactly: no trimming, no case folding.
//! 5. An empty identifier counts as no identifier.
//!
//! Grouping is a pure function of its input, so running it twice on the same
//! page yields the same partition.

use ahash::AHashMap;

/// A trigger image as read from the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger<N> {
    pub node: N,
    pub group: Option<String>,
}

impl<N> Trigger<N> {
    /// A trigger that belongs to no gallery.
    pub fn standalone(node: N) -> Self {
        Self { node, group: None }
    }

    /// A trigger in the named gallery.
    pub fn grouped(node: N, group: impl Into<String>) -> Self {
        Self {
            node,
            group: Some(group.into()),
        }
    }
}

/// A named gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery<N> {
    pub name: String,
    pub members: Vec<N>,
}

/// Result of grouping a page's triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<N> {
    pub standalone: Vec<N>,
    pub galleries: Vec<Gallery<N>>,
}

impl<N> Default for Partition<N> {
    fn default() -> Self {
        Self {
            standalone: Vec::new(),
            galleries: Vec::new(),
        }
    }
}

impl<N> Partition<N> {
    /// Group triggers given in document order.
    pub fn from_triggers(triggers: impl IntoIterator<Item = Trigger<N>>) -> Self {
        let mut partition = Self::default();
        let mut index: AHashMap<String, usize> = AHashMap::new();

        for Trigger { node, group } in triggers {
            match group.filter(|g| !g.is_empty()) {
                None => partition.standalone.push(node),
                Some(name) => {
                    if let Some(&slot) = index.get(&name) {
                        partition.galleries[slot].members.push(node);
                    } else {
                        index.insert(name.clone(), partition.galleries.len());
                        partition.galleries.push(Gallery {
                            name,
                            members: vec![node],
                        });
                    }
                }
            }
        }

        partition
    }

    /// Number of viewers this partition yields.
    #[must_use]
    pub fn viewer_count(&self) -> usize {
        self.standalone.len() + self.galleries.len()
    }

    /// One list per viewer: each standalone image alone, then each gallery.
    pub fn into_lists(self) -> Vec<Vec<N>> {
        let mut lists = Vec::with_capacity(self.viewer_count());
        lists.extend(self.standalone.into_iter().map(|node| vec![node]));
        lists.extend(self.galleries.into_iter().map(|g| g.members));
        lists
    }
}
