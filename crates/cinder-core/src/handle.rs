//! Owned handles used for dynamically-sized component fields

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::mem;

/// Owned text handle backing `string` fields.
///
/// Defaults can borrow `'static` literals so they stay usable in `static`
/// initializers; any edit turns the handle into owned text.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Text(Cow<'static, str>);

impl Text {
    pub const EMPTY: Self = Self(Cow::Borrowed(""));

    pub const fn from_static(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Free any owned text, leaving the handle empty
    pub fn release(&mut self) {
        self.0 = Cow::Borrowed("");
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self(Cow::Owned(s.to_owned()))
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Growable collection handle backing `vec` fields.
///
/// Shaped as element size, count and capacity; the layout does not depend
/// on `T`, which lets reflection treat every collection field alike.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Collection<T>(Vec<T>);

impl<T> Collection<T> {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn elem_size(&self) -> usize {
        mem::size_of::<T>()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.0.push(item);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0
    }

    /// Drop every element and free the backing storage
    pub fn release(&mut self) {
        self.0 = Vec::new();
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}
