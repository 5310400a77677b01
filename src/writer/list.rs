use crate::{Error, Result};
use alloc::vec::Vec;
use core::slice;

const INITIAL_CAPACITY: usize = 4;

/// Growable array with fallible, doubling growth.
///
/// Capacity starts at 4 and doubles whenever it is exhausted. Growth goes
/// through `try_reserve_exact`, so an allocation failure surfaces as
/// [`Error::NoMemory`] instead of aborting. Elements are released through
/// their own `Drop` when the list is cleared or dropped.
#[derive(Debug)]
pub struct GrowList<T> {
    items: Vec<T>,
}

impl<T> Default for GrowList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> GrowList<T> {
    /// Creates an empty list. Does not allocate.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends `item` and returns its index.
    pub fn push(&mut self, item: T) -> Result<usize> {
        let len = self.items.len();
        if len == self.items.capacity() {
            let new_cap = if len == 0 {
                INITIAL_CAPACITY
            } else {
                len.checked_mul(2).ok_or(Error::NoMemory)?
            };
            self.items
                .try_reserve_exact(new_cap - len)
                .map_err(|_| Error::NoMemory)?;
        }
        self.items.push(item);
        Ok(len)
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    #[inline]
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.items.get_mut(idx)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of elements the list can hold before it grows again.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.items.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Drops every element. The allocation is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a, T> IntoIterator for &'a GrowList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
