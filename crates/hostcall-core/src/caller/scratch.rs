//! Reusable receiver + argument buffer for instance calls.

use std::cell::{RefCell, RefMut};

use crate::runtime::Dynamic;

/// One allocation of `parameter_count + 1` slots, reused by every instance
/// call that has arguments.
///
/// Slots are only reachable through a [`ScratchGuard`], and dropping the
/// guard resets every slot to `Dynamic::Null`. Between calls the buffer holds
/// no references.
pub(crate) struct ScratchBuffer {
    slots: RefCell<Box<[Dynamic]>>,
}

impl ScratchBuffer {
    pub(crate) fn new(parameter_count: usize) -> Self {
        Self {
            slots: RefCell::new(vec![Dynamic::Null; parameter_count + 1].into_boxed_slice()),
        }
    }

    /// Fill the buffer with the receiver and arguments.
    ///
    /// Returns `None` if the buffer is already in use by a call further up
    /// the stack.
    pub(crate) fn acquire(
        &self,
        receiver: &Dynamic,
        args: &[Dynamic],
    ) -> Option<ScratchGuard<'_>> {
        let mut slots = self.slots.try_borrow_mut().ok()?;
        debug_assert_eq!(
            args.len() + 1,
            slots.len(),
            "argument count does not match the registered parameter count"
        );

        if let Some((first, rest)) = slots.split_first_mut() {
            first.clone_from(receiver);
            for (slot, arg) in rest.iter_mut().zip(args) {
                slot.clone_from(arg);
            }
        }
        Some(ScratchGuard { slots })
    }

    /// Copy of the current slot contents, or `None` while a call holds them.
    pub(crate) fn snapshot(&self) -> Option<Vec<Dynamic>> {
        self.slots.try_borrow().ok().map(|slots| slots.to_vec())
    }
}

/// Exclusive access to a filled [`ScratchBuffer`] for one call.
pub(crate) struct ScratchGuard<'a> {
    slots: RefMut<'a, Box<[Dynamic]>>,
}

impl ScratchGuard<'_> {
    pub(crate) fn slots(&self) -> &[Dynamic] {
        &self.slots
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Dynamic::Null;
        }
    }
}
