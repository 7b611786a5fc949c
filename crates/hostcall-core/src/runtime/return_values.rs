//! Ordered sink for values produced by a host call.

use super::Dynamic;

/// Append-only collector for call results.
///
/// A call adapter pushes exactly one value for single-result callables and
/// none for void ones. Callables that produce several results receive the
/// sink through their [`CallContext`](super::CallContext) and push into it
/// themselves. The scripting runtime reads the values once the call returns
/// and may [`clear`](Self::clear) the sink before reusing it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReturnValues {
    values: Vec<Dynamic>,
}

impl ReturnValues {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Create an empty sink with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Append a value.
    pub fn push(&mut self, value: impl Into<Dynamic>) {
        self.values.push(value.into());
    }

    /// Number of values pushed so far.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the value at `index`.
    pub fn get(&self, index: usize) -> Option<&Dynamic> {
        self.values.get(index)
    }

    /// Iterate over the values in push order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dynamic> {
        self.values.iter()
    }

    /// View the values as a slice.
    pub fn as_slice(&self) -> &[Dynamic] {
        &self.values
    }

    /// Take ownership of the values.
    pub fn into_vec(self) -> Vec<Dynamic> {
        self.values
    }

    /// Drop all values so the sink can be reused for another call.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Drop everything pushed after `len`.
    ///
    /// Used by the call adapter to discard partial results of a failed call.
    pub(crate) fn rollback_to(&mut self, len: usize) {
        self.values.truncate(len);
    }
}

impl<'a> IntoIterator for &'a ReturnValues {
    type Item = &'a Dynamic;
    type IntoIter = std::slice::Iter<'a, Dynamic>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
