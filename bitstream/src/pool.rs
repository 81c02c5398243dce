//! Caller-owned object pools with scoped checkout.
//!
//! A [`Pool`] is a cheap, cloneable handle around a free list. Items are
//! checked out as [`Pooled`] guards and go back to the free list when the
//! guard drops, so every exit path releases them. Guards hold only a weak
//! reference to the pool: dropping the last pool handle frees idle items
//! and makes outstanding guards deallocate normally.
//!
//! Pools are single-threaded (`!Send`); each peer owns its own.

use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::{Rc, Weak};

use crate::writer::ByteWriter;

/// Resets an item before it is reused.
pub trait Recycle {
    /// Clears any state left over from the previous checkout.
    fn recycle(&mut self);
}

impl Recycle for ByteWriter {
    fn recycle(&mut self) {
        self.reset();
    }
}

impl Recycle for Vec<u8> {
    fn recycle(&mut self) {
        self.clear();
    }
}

type FreeList<T> = Rc<RefCell<Vec<T>>>;

/// A shared pool of reusable items.
pub struct Pool<T: Recycle> {
    free: FreeList<T>,
    factory: Rc<dyn Fn() -> T>,
}

impl<T: Recycle> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            free: Rc::clone(&self.free),
            factory: Rc::clone(&self.factory),
        }
    }
}

impl<T: Recycle> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("available", &self.available())
            .finish_non_exhaustive()
    }
}

impl<T: Recycle> Pool<T> {
    /// Creates an empty pool that builds new items with `factory`.
    #[must_use]
    pub fn new(factory: impl Fn() -> T + 'static) -> Self {
        Self::with_capacity(factory, 0)
    }

    /// Creates a pool pre-filled with `initial` items.
    #[must_use]
    pub fn with_capacity(factory: impl Fn() -> T + 'static, initial: usize) -> Self {
        let items = (0..initial).map(|_| factory()).collect();
        Self {
            free: Rc::new(RefCell::new(items)),
            factory: Rc::new(factory),
        }
    }

    /// Checks out an item, creating one if the pool is empty.
    ///
    /// Recycled items are reset before they are handed out again.
    pub fn acquire(&self) -> Pooled<T> {
        let item = self.free.borrow_mut().pop().unwrap_or_else(|| (self.factory)());
        Pooled {
            item: Some(item),
            home: Rc::downgrade(&self.free),
        }
    }

    /// Returns the number of idle items.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.borrow().len()
    }
}

impl Pool<ByteWriter> {
    /// Creates a pool of writers with the default capacity.
    #[must_use]
    pub fn writers() -> Self {
        Self::new(ByteWriter::new)
    }
}

/// An item checked out from a [`Pool`].
///
/// Dereferences to the item. Dropping the guard recycles the item into the
/// pool it came from, if that pool still exists.
pub struct Pooled<T: Recycle> {
    item: Option<T>,
    home: Weak<RefCell<Vec<T>>>,
}

impl<T: Recycle> Pooled<T> {
    /// Detaches the item from the pool; it will not be recycled.
    #[must_use]
    pub fn into_inner(mut self) -> T {
        self.home = Weak::new();
        match self.item.take() {
            Some(item) => item,
            // The slot is only emptied here and in drop.
            None => unreachable!("pooled item already taken"),
        }
    }

    fn get(&self) -> &T {
        match &self.item {
            Some(item) => item,
            None => unreachable!("pooled item already taken"),
        }
    }

    fn get_mut(&mut self) -> &mut T {
        match &mut self.item {
            Some(item) => item,
            None => unreachable!("pooled item already taken"),
        }
    }
}

impl<T: Recycle> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: Recycle> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.get_mut()
    }
}

impl<T: Recycle + fmt::Debug> fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(self.get()).finish()
    }
}

impl<T: Recycle> Drop for Pooled<T> {
    fn drop(&mut self) {
        let (Some(mut item), Some(free)) = (self.item.take(), self.home.upgrade()) else {
            return;
        };
        item.recycle();
        free.borrow_mut().push(item);
    }
}
