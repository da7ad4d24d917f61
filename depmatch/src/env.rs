//! Environments and variables.
//!
//! # Variables
//!
//! Bound variables inside expressions are [de Bruijn indices][Index], so that
//! alpha-equivalent expressions are structurally equal. Everything that lives
//! in the metavariable/local-context store is addressed by a [`Level`]: the
//! position of its declaration in a flat arena. Levels are never reused, so
//! they double as stable identifiers for local variables and metavariables.
//!
//! # Environments
//!
//! The store itself is built from flat, low-indirection [`UniqueEnv`]s. Local
//! contexts are copied at every case split, so they use a [`SharedEnv`] to
//! increase the amount of sharing at the expense of locality.

use std::fmt;

/// Underlying variable representation.
type RawVar = u32;

/// A [de Bruijn index], which represents a variable counting the number of
/// binders between a variable occurrence and the binder that introduced the
/// variable.
///
/// | Representation    | Example (S combinator)  |
/// | ----------------- | ----------------------- |
/// | Named             | `λx. λy. λz. x z (y z)` |
/// | de Bruijn indices | `λ_. λ_. λ_. 2 0 (1 0)` |
///
/// [de Bruijn index]: https://en.wikipedia.org/wiki/De_Bruijn_index
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index(RawVar);

impl Index {
    /// The last variable to be bound in the environment.
    pub const fn last() -> Index {
        Index(0)
    }

    /// Returns the previously bound variable, relative to this one.
    pub const fn prev(self) -> Index {
        Index(self.0 + 1)
    }

    /// Shift the index outwards past `count` binders.
    pub const fn shift(self, count: usize) -> Index {
        Index(self.0 + count as RawVar)
    }

    /// Number of binders between the occurrence and its binder.
    pub const fn depth(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Index({})", self.0)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A de Bruijn level, which counts the number of entries between the start of
/// an environment and the entry it refers to. Unlike an [`Index`] it does not
/// change as more entries are pushed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(RawVar);

impl Level {
    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level({})", self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The length of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EnvLen(RawVar);

impl EnvLen {
    /// Construct a new, empty environment.
    pub fn new() -> EnvLen {
        EnvLen(0)
    }

    /// The next level that will be bound in this environment.
    pub fn next_level(self) -> Level {
        Level(self.0)
    }

    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for EnvLen {
    fn default() -> EnvLen {
        EnvLen::new()
    }
}

/// A uniquely owned environment.
#[derive(Debug, Clone)]
pub struct UniqueEnv<Entry> {
    entries: Vec<Entry>,
}

impl<Entry> UniqueEnv<Entry> {
    /// Construct a new, empty environment.
    pub fn new() -> UniqueEnv<Entry> {
        UniqueEnv {
            entries: Vec::new(),
        }
    }

    /// Push an entry onto the environment, returning its level.
    pub fn push(&mut self, entry: Entry) -> Level {
        assert!(self.entries.len() < RawVar::MAX as usize);
        let level = self.len().next_level();
        self.entries.push(entry);
        level
    }
}

impl<Entry> Default for UniqueEnv<Entry> {
    fn default() -> UniqueEnv<Entry> {
        UniqueEnv::new()
    }
}

impl<Entry> std::ops::Deref for UniqueEnv<Entry> {
    type Target = SliceEnv<Entry>;

    fn deref(&self) -> &SliceEnv<Entry> {
        // SAFETY:
        // - `SliceEnv<Entry>` is a transparent wrapper around `[Entry]`
        unsafe { std::mem::transmute::<&[_], &SliceEnv<_>>(&self.entries[..]) }
    }
}

impl<Entry> std::ops::DerefMut for UniqueEnv<Entry> {
    fn deref_mut(&mut self) -> &mut SliceEnv<Entry> {
        // SAFETY:
        // - `SliceEnv<Entry>` is a transparent wrapper around `[Entry]`
        unsafe { std::mem::transmute::<&mut [_], &mut SliceEnv<_>>(&mut self.entries[..]) }
    }
}

/// An environment backed by a slice.
#[derive(Debug)]
#[repr(transparent)]
pub struct SliceEnv<Entry> {
    entries: [Entry],
}

impl<Entry> SliceEnv<Entry> {
    /// The length of the environment.
    pub fn len(&self) -> EnvLen {
        // The only way to construct a `SliceEnv` is via `UniqueEnv`, which
        // never grows past the maximum `RawVar`.
        EnvLen(self.entries.len() as RawVar)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup an entry in the environment by level.
    pub fn get_level(&self, level: Level) -> Option<&Entry> {
        self.entries.get(level.to_usize())
    }

    /// Lookup an entry in the environment by level, for modification.
    pub fn get_level_mut(&mut self, level: Level) -> Option<&mut Entry> {
        self.entries.get_mut(level.to_usize())
    }

    /// Iterate over the elements in the environment.
    pub fn iter<'this>(&'this self) -> impl 'this + DoubleEndedIterator<Item = &'this Entry> {
        self.entries.iter()
    }
}

/// A persistent environment with structural sharing.
#[derive(Clone)]
pub struct SharedEnv<Entry> {
    // An `rpds::Vector` is used as it's compact, and local contexts are cloned
    // at every case split.
    entries: rpds::VectorSync<Entry>,
}

impl<Entry> SharedEnv<Entry> {
    /// Construct a new, empty environment.
    pub fn new() -> SharedEnv<Entry> {
        SharedEnv {
            entries: rpds::Vector::new_sync(),
        }
    }

    /// The length of the environment.
    pub fn len(&self) -> EnvLen {
        EnvLen(self.entries.len() as RawVar)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Push an entry onto the environment.
    pub fn push(&mut self, entry: Entry) {
        assert!(self.entries.len() < RawVar::MAX as usize);
        self.entries.push_back_mut(entry);
    }

    /// Iterate over the elements in the environment.
    pub fn iter<'this>(&'this self) -> impl 'this + Iterator<Item = &'this Entry> {
        self.entries.iter()
    }
}

impl<Entry: Clone> SharedEnv<Entry> {
    /// Return a copy of the environment with an extra entry pushed onto it.
    pub fn with(&self, entry: Entry) -> SharedEnv<Entry> {
        let mut env = self.clone();
        env.push(entry);
        env
    }
}

impl<Entry> Default for SharedEnv<Entry> {
    fn default() -> SharedEnv<Entry> {
        SharedEnv::new()
    }
}

impl<Entry: fmt::Debug> fmt::Debug for SharedEnv<Entry> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEnv")
            .field("entries", &DebugEntries(&self.entries))
            .finish()
    }
}

struct DebugEntries<'a, Entry>(&'a rpds::VectorSync<Entry>);

impl<'a, Entry: fmt::Debug> fmt::Debug for DebugEntries<'a, Entry> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_env_levels_are_stable() {
        let mut env = UniqueEnv::new();
        let a = env.push("a");
        let b = env.push("b");
        assert_ne!(a, b);
        assert_eq!(env.get_level(a), Some(&"a"));
        assert_eq!(env.get_level(b), Some(&"b"));
    }

    #[test]
    fn shared_env_copies_are_independent() {
        let base = SharedEnv::new().with('x');
        let left = base.with('l');
        let right = base.with('r');
        assert_eq!(base.len().to_usize(), 1);
        assert_eq!(left.iter().collect::<Vec<_>>(), [&'x', &'l']);
        assert_eq!(right.iter().collect::<Vec<_>>(), [&'x', &'r']);
    }
}
