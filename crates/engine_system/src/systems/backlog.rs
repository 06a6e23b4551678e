//! Updates to a shared collaborator that may arrive while it is borrowed.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

/// Operations on a shared collaborator, applied in submission order.
///
/// View handlers submit here instead of touching the collaborator directly.
/// An operation that finds the collaborator borrowed waits in the queue and
/// runs, ahead of anything newer, at the next submit or drain.
pub(crate) struct Backlog<Op> {
    pending: Rc<RefCell<VecDeque<Op>>>,
}

impl<Op> Clone for Backlog<Op> {
    fn clone(&self) -> Self {
        Self {
            pending: Rc::clone(&self.pending),
        }
    }
}

impl<Op> Default for Backlog<Op> {
    fn default() -> Self {
        Self {
            pending: Rc::new(RefCell::new(VecDeque::new())),
        }
    }
}

impl<Op: fmt::Debug> Backlog<Op> {
    /// Number of operations waiting for the collaborator.
    pub(crate) fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Queue `op`, then apply the whole queue if `target` is free. Failures
    /// are logged: a handler has nowhere to return them.
    pub(crate) fn submit<W: ?Sized, E: fmt::Display>(
        &self,
        target: &RefCell<W>,
        op: Op,
        apply: impl FnMut(&mut W, &Op) -> Result<(), E>,
    ) {
        self.pending.borrow_mut().push_back(op);
        let Ok(mut target) = target.try_borrow_mut() else {
            debug!(pending = self.len(), "collaborator borrowed, update deferred");
            return;
        };
        for (op, error) in self.drain(&mut *target, apply) {
            warn!(?op, %error, "collaborator update failed");
        }
    }

    /// Apply every queued operation in order and return the ones that failed.
    pub(crate) fn drain<W: ?Sized, E>(
        &self,
        target: &mut W,
        mut apply: impl FnMut(&mut W, &Op) -> Result<(), E>,
    ) -> Vec<(Op, E)> {
        let queued = std::mem::take(&mut *self.pending.borrow_mut());
        queued
            .into_iter()
            .filter_map(|op| apply(target, &op).err().map(|error| (op, error)))
            .collect()
    }
}
