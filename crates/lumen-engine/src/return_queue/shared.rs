use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

use super::{ReturnNode, ReturnQueue};

struct Slot<T: ReturnNode> {
    node: Option<Box<T>>,
    queue: Weak<ReturnQueue>,
}

impl<T: ReturnNode> Drop for Slot<T> {
    fn drop(&mut self) {
        // The queue must be moved out before the node becomes visible to a
        // consumer: after the push, another thread may already have deleted it.
        let queue = std::mem::take(&mut self.queue).upgrade();
        let Some(node) = self.node.take() else {
            return;
        };
        match queue {
            Some(queue) => queue.enqueue(node),
            // The queue is gone, and with it the thread allowed to release.
            None => drop(node),
        }
    }
}

/// Reference-counted GPU object handle with deferred destruction.
///
/// Cloning is cheap. When the last clone drops, the object is handed to the
/// [`ReturnQueue`] that created it.
pub struct Shared<T: ReturnNode> {
    slot: Arc<Slot<T>>,
}

impl<T: ReturnNode> Shared<T> {
    pub(super) fn new(node: Box<T>, queue: Weak<ReturnQueue>) -> Self {
        Self {
            slot: Arc::new(Slot { node: Some(node), queue }),
        }
    }

    /// Returns true when both handles refer to the same object.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.slot, &b.slot)
    }

    #[inline]
    pub fn downgrade(this: &Self) -> WeakShared<T> {
        WeakShared { slot: Arc::downgrade(&this.slot) }
    }

    #[inline]
    pub fn strong_count(this: &Self) -> usize {
        Arc::strong_count(&this.slot)
    }
}

impl<T: ReturnNode> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self { slot: Arc::clone(&self.slot) }
    }
}

impl<T: ReturnNode> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.slot
            .node
            .as_deref()
            .expect("node is only taken when the last handle drops")
    }
}

impl<T: ReturnNode + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Non-owning counterpart of [`Shared`], used by key→resource maps.
pub struct WeakShared<T: ReturnNode> {
    slot: Weak<Slot<T>>,
}

impl<T: ReturnNode> WeakShared<T> {
    #[inline]
    pub fn upgrade(&self) -> Option<Shared<T>> {
        self.slot.upgrade().map(|slot| Shared { slot })
    }

    /// True once every strong handle has been dropped.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.slot.strong_count() == 0
    }
}

impl<T: ReturnNode> Clone for WeakShared<T> {
    fn clone(&self) -> Self {
        Self { slot: Weak::clone(&self.slot) }
    }
}

impl<T: ReturnNode> fmt::Debug for WeakShared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakShared").field("expired", &self.is_expired()).finish()
    }
}
