// Copyright 2024 Logan Magee
//
// SPDX-License-Identifier: LicenseRef-Proprietary

/// A fixed-capacity LIFO of pending work items.
///
/// The sorting stages replace native recursion with these stacks. Their nesting depth is bounded
/// by the block size and the resolver budget, so running out of room is a bug and panics instead
/// of growing.
pub(super) struct Stack<T, const N: usize> {
    items: [Option<T>; N],
    len: usize,
}

impl<T, const N: usize> Stack<T, N> {
    pub(super) fn new() -> Self {
        Self {
            items: [const { None }; N],
            len: 0,
        }
    }

    pub(super) fn push(&mut self, item: T) {
        assert!(self.len < N, "work stack overflowed its capacity of {N}");

        self.items[self.len] = Some(item);
        self.len += 1;
    }

    pub(super) fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        self.items[self.len].take()
    }

    pub(super) fn len(&self) -> usize {
        self.len
    }

    /// Returns the item `index` slots above the bottom of the stack.
    pub(super) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            self.items[index].as_mut()
        } else {
            None
        }
    }
}
