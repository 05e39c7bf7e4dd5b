use core::task::Waker;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use slab::Slab;
use smallvec::SmallVec;

/// Wakers taken out of a [`WaiterList`], to be woken once the lock is released.
pub(crate) type WakeBatch = SmallVec<[Waker; 4]>;

/// Identifies a registration in a [`WaiterList`].
///
/// Slab indexes are reused once vacated, so every registration also carries a
/// ticket. A stale key never touches a newer registration at the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WaiterKey {
    index: usize,
    ticket: u64,
}

/// A set of suspended tasks waiting on some shared condition.
///
/// Single notifications go to the longest-waiting task first.
#[derive(Debug, Default)]
pub(crate) struct WaiterList {
    wakers: Slab<(u64, Waker)>,
    /// Registration order. May hold keys that were since removed; those are
    /// skipped when popped.
    order: VecDeque<WaiterKey>,
    next_ticket: u64,
}

impl WaiterList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register `waker`, or refresh the registration behind `key` if it is
    /// still live.
    pub(crate) fn register(&mut self, key: &mut Option<WaiterKey>, waker: &Waker) {
        if let Some(current) = key {
            if let Some((ticket, slot)) = self.wakers.get_mut(current.index) {
                if *ticket == current.ticket {
                    if !slot.will_wake(waker) {
                        slot.clone_from(waker);
                    }
                    return;
                }
            }
        }

        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let index = self.wakers.insert((ticket, waker.clone()));
        let registered = WaiterKey { index, ticket };
        self.order.push_back(registered);
        *key = Some(registered);
    }

    /// Remove the registration behind `key`. Returns `true` if it was still
    /// registered, `false` if it had already been taken by a notification.
    pub(crate) fn remove(&mut self, key: &mut Option<WaiterKey>) -> bool {
        let Some(current) = key.take() else {
            return false;
        };
        match self.wakers.get(current.index) {
            Some((ticket, _)) if *ticket == current.ticket => {
                self.wakers.remove(current.index);
                self.compact();
                true
            }
            _ => false,
        }
    }

    /// Whether the registration behind `key` is still waiting.
    #[cfg(test)]
    pub(crate) fn contains(&self, key: &WaiterKey) -> bool {
        self.is_live(key)
    }

    /// Take the longest-waiting waiter out of the list.
    pub(crate) fn take_one(&mut self) -> Option<Waker> {
        while let Some(key) = self.order.pop_front() {
            if self.is_live(&key) {
                let (_, waker) = self.wakers.remove(key.index);
                return Some(waker);
            }
        }
        None
    }

    /// Take every waiter out of the list.
    pub(crate) fn take_all(&mut self) -> WakeBatch {
        self.order.clear();
        self.wakers.drain().map(|(_, waker)| waker).collect()
    }

    fn is_live(&self, key: &WaiterKey) -> bool {
        matches!(self.wakers.get(key.index), Some((ticket, _)) if *ticket == key.ticket)
    }

    /// Drop removed keys from `order` once they outnumber the live ones.
    fn compact(&mut self) {
        if self.order.len() > 2 * self.wakers.len() + 8 {
            let wakers = &self.wakers;
            self.order.retain(|key| {
                matches!(wakers.get(key.index), Some((ticket, _)) if *ticket == key.ticket)
            });
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.wakers.len()
    }
}

/// Lock a mutex, recovering the guard if another thread panicked while
/// holding it. None of the critical sections in this crate can leave their
/// state half-updated.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
