use std::sync::{Arc, Weak};

use crossbeam_queue::SegQueue;

use super::Shared;

/// A GPU object whose destruction must be deferred to the context-owning thread.
pub trait ReturnNode: Send + Sync + 'static {
    /// Releases native handles. Only ever called by the draining thread.
    fn release_native(&mut self);
}

/// Lock-free multi-producer queue of retired [`ReturnNode`]s.
pub struct ReturnQueue {
    nodes: SegQueue<Box<dyn ReturnNode>>,
    weak_this: Weak<ReturnQueue>,
}

impl ReturnQueue {
    /// Creates a new queue.
    ///
    /// Handles created by [`make_shared`](Self::make_shared) only hold the
    /// queue weakly: a queued node may own handles from the same queue.
    pub fn make() -> Arc<Self> {
        Arc::new_cyclic(|weak_this| Self {
            nodes: SegQueue::new(),
            weak_this: weak_this.clone(),
        })
    }

    /// Wraps `node` in a reference-counted handle whose last drop enqueues the
    /// node here instead of deleting it.
    pub fn make_shared<T: ReturnNode>(&self, node: T) -> Shared<T> {
        Shared::new(Box::new(node), self.weak_this.clone())
    }

    pub(super) fn enqueue(&self, node: Box<dyn ReturnNode>) {
        self.nodes.push(node);
    }

    /// Pops one retired node, or `None` when the queue is empty.
    ///
    /// Ownership moves to the caller, which must call
    /// [`ReturnNode::release_native`] before dropping it.
    pub fn dequeue(&self) -> Option<Box<dyn ReturnNode>> {
        self.nodes.pop()
    }

    /// Releases and deletes every queued node. Returns the number processed.
    pub fn drain(&self) -> usize {
        let mut count = 0;
        while let Some(mut node) = self.dequeue() {
            node.release_native();
            count += 1;
        }
        if count > 0 {
            log::debug!("return queue: released {count} GPU objects");
        }
        count
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Drop for ReturnQueue {
    fn drop(&mut self) {
        // Native calls are not safe at this point; delete without releasing.
        let mut count = 0;
        while let Some(node) = self.nodes.pop() {
            drop(node);
            count += 1;
        }
        if count > 0 {
            log::debug!("return queue destroyed with {count} nodes; native release skipped");
        }
    }
}

impl std::fmt::Debug for ReturnQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReturnQueue").field("len", &self.nodes.len()).finish()
    }
}
