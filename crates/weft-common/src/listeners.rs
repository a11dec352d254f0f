//! Ordered observer registry.
//! 有序的观察者注册表。
//!
//! Listeners are held weakly: the registry never keeps a subscriber alive, and
//! a subscriber that has been dropped is skipped and pruned on the next
//! snapshot. Every notification pass iterates a snapshot, so callbacks may
//! freely subscribe or unsubscribe while a pass is running.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle returned by a subscription, used to unsubscribe.
/// 订阅返回的句柄，用于取消订阅。
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

struct Entry<L: ?Sized, K> {
    id: ListenerId,
    key: K,
    listener: Weak<L>,
}

/// A registry of weakly held listeners, each tagged with a key `K` that
/// delivery can filter on.
pub struct ListenerSet<L: ?Sized, K = ()> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<Entry<L, K>>>,
}

impl<L: ?Sized, K> ListenerSet<L, K> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a listener under the given key.
    /// 以给定的键订阅监听器。
    pub fn add_keyed(&self, key: K, listener: Weak<L>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0.wrapping_add(1));
        self.entries.borrow_mut().push(Entry { id, key, listener });
        id
    }

    /// Unsubscribe. Returns false if the id was not (or no longer) registered.
    /// 取消订阅。若该 id 未注册则返回 false。
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Live listeners in subscription order.
    pub fn snapshot(&self) -> Vec<Rc<L>> {
        self.snapshot_matching(|_| true)
    }

    /// Live listeners whose key satisfies `filter`, in subscription order.
    /// 按订阅顺序返回键满足 `filter` 的存活监听器。
    pub fn snapshot_matching(&self, filter: impl Fn(&K) -> bool) -> Vec<Rc<L>> {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|entry| entry.listener.strong_count() > 0);
        entries
            .iter()
            .filter(|entry| filter(&entry.key))
            .filter_map(|entry| entry.listener.upgrade())
            .collect()
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|entry| entry.id == id)
    }

    /// Number of registered listeners that are still alive.
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.listener.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: ?Sized> ListenerSet<L, ()> {
    /// Subscribe a listener to every event.
    /// 订阅所有事件。
    pub fn add(&self, listener: Weak<L>) -> ListenerId {
        self.add_keyed((), listener)
    }
}

impl<L: ?Sized, K> Default for ListenerSet<L, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized, K> fmt::Debug for ListenerSet<L, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.len())
            .finish()
    }
}
