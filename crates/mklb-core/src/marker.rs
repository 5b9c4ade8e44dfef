#![forbid(unsafe_code)]

//! Visual-state markers and slide directions.
//!
//! Markers are the only channel between the widget and its stylesheet. A
//! slide is in exactly one of these situations at any instant:
//!
//! | Markers | Meaning |
//! |---------|---------|
//! | none | hidden, at rest |
//! | `shown` | the visible slide |
//! | `from-left` / `from-right` | placed off-screen, about to slide in |
//! | `to-left` / `to-right` | sliding out, removed once the exit completes |
//!
//! The wrapper only ever carries `shown`.

/// A visual-state marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Shown,
    FromLeft,
    ToLeft,
    FromRight,
    ToRight,
}

impl Marker {
    /// Every marker, in a fixed order.
    pub const ALL: [Marker; 5] = [
        Marker::Shown,
        Marker::FromLeft,
        Marker::ToLeft,
        Marker::FromRight,
        Marker::ToRight,
    ];

    /// Transient markers drive an animation phase and never outlive it.
    #[inline]
    #[must_use]
    pub const fn is_transient(self) -> bool {
        !matches!(self, Marker::Shown)
    }
}

/// Direction of a slide change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    /// Marker the outgoing slide carries while it leaves.
    #[must_use]
    pub const fn exit_marker(self) -> Marker {
        match self {
            Direction::Previous => Marker::ToRight,
            Direction::Next => Marker::ToLeft,
        }
    }

    /// Marker the incoming slide starts from.
    #[must_use]
    pub const fn entry_marker(self) -> Marker {
        match self {
            Direction::Previous => Marker::FromLeft,
            Direction::Next => Marker::FromRight,
        }
    }

    /// Index reached from `index` in a deck of `len` slides, wrapping at both ends.
    ///
    /// `len` must be non-zero.
    #[must_use]
    pub const fn step(self, index: usize, len: usize) -> usize {
        match self {
            Direction::Previous => (index + len - 1) % len,
            Direction::Next => (index + 1) % len,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn previous_exits_right_and_enters_from_left() {
        assert_eq!(Direction::Previous.exit_marker(), Marker::ToRight);
        assert_eq!(Direction::Previous.entry_marker(), Marker::FromLeft);
    }

    #[test]
    fn next_exits_left_and_enters_from_right() {
        assert_eq!(Direction::Next.exit_marker(), Marker::ToLeft);
        assert_eq!(Direction::Next.entry_marker(), Marker::FromRight);
    }

    #[test]
    fn only_shown_is_persistent() {
        let persistent: Vec<_> = Marker::ALL.iter().filter(|m| !m.is_transient()).collect();
        assert_eq!(persistent, vec![&Marker::Shown]);
    }

    #[test]
    fn step_wraps_at_both_ends() {
        assert_eq!(Direction::Previous.step(0, 3), 2);
        assert_eq!(Direction::Next.step(2, 3), 0);
        assert_eq!(Direction::Next.step(0, 1), 0);
        assert_eq!(Direction::Previous.step(0, 1), 0);
    }

    proptest! {
        #[test]
        fn next_len_times_is_identity(len in 1usize..64, start in 0usize..64) {
            let start = start % len;
            let mut index = start;
            for _ in 0..len {
                index = Direction::Next.step(index, len);
                prop_assert!(index < len);
            }
            prop_assert_eq!(index, start);
        }

        #[test]
        fn previous_undoes_next(len in 1usize..64, start in 0usize..64) {
            let start = start % len;
            let there = Direction::Next.step(start, len);
            prop_assert_eq!(Direction::Previous.step(there, len), start);
        }
    }
}
