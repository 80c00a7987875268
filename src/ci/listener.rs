//! Handle-based listener dispatch.
//!
//! The original wires its observers cyclically (device owns registry, which
//! owns per-profile state, which holds a reference back to the device). We
//! replace every such edge with an explicit, one-directional handle: a
//! subsystem owns a [`ListenerList`] of boxed trait objects, callers
//! subscribe and get back a [`Handle`] they later use to unsubscribe. No
//! listener ever holds an owning reference to the thing it listens to.

use std::boxed::Box;
use std::vec::Vec;

/// An opaque subscription token returned by a `subscribe` call. Valid only
/// with the [`ListenerList`] that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(u64);

/// Monotonic handle allocator embedded in each [`ListenerList`].
#[derive(Clone, Copy, Debug, Default)]
struct HandleAllocator(u64);

impl HandleAllocator {
    fn next(&mut self) -> Handle {
        let id = self.0;
        self.0 += 1;
        Handle(id)
    }
}

/// A subscriber list for trait object `T` (typically `dyn SomeListener`).
///
/// Iteration order is subscription order, matching the ordering guarantee
/// in the concurrency model (§5: "listener callbacks are invoked
/// synchronously in the order of subscription").
pub struct ListenerList<T: ?Sized> {
    alloc: HandleAllocator,
    entries: Vec<(Handle, Box<T>)>,
}

impl<T: ?Sized> Default for ListenerList<T> {
    fn default() -> Self {
        ListenerList {
            alloc: HandleAllocator::default(),
            entries: Vec::new(),
        }
    }
}

impl<T: ?Sized> ListenerList<T> {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`, returning a handle for later removal.
    pub fn subscribe(&mut self, listener: Box<T>) -> Handle {
        let handle = self.alloc.next();
        self.entries.push((handle, listener));
        handle
    }

    /// Remove a previously subscribed listener. A stale or unknown handle is
    /// silently ignored.
    pub fn unsubscribe(&mut self, handle: Handle) {
        self.entries.retain(|(h, _)| *h != handle);
    }

    /// True if no listeners are subscribed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of subscribed listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Invoke `f` with a snapshot of the current listeners, in subscription
    /// order. Taking a snapshot (rather than iterating `self.entries`
    /// directly) lets a listener add or remove subscriptions from within its
    /// own callback, per the re-entrancy tolerance required by §5.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        for (_, listener) in self.entries.iter() {
            f(listener.as_ref());
        }
    }
}

impl<T: ?Sized> Clone for ListenerList<T> {
    /// A cloned registry starts with an empty listener list: subscription is
    /// a runtime concern, not part of a registry's value identity (see §9,
    /// "Copyable registries with embedded listeners").
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<T: ?Sized> core::fmt::Debug for ListenerList<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerList")
            .field("subscriber_count", &self.entries.len())
            .finish()
    }
}

/// Per-[`crate::ci::profile_state::ProfileState`] events.
pub trait ProfileStateListener {
    /// A channel's availability changed.
    fn on_available_change(&self, _channel: u8, _available: bool) {}
    /// A channel's requested enabled state, before it is committed. Return
    /// `false` to veto the requested value; the final state is the logical
    /// AND of `requested` and every listener's answer.
    fn on_can_enable(&self, _channel: u8, requested: bool) -> bool {
        requested
    }
    /// A channel's enabled state changed (possibly veto-adjusted).
    fn on_enabled_change(&self, _channel: u8, _enabled: bool) {}
    /// The profile's specific-data bytes changed.
    fn on_specific_data_change(&self, _data: &[u8]) {}
}

/// Top-level [`crate::ci::profile_registry::ProfileRegistry`] events —
/// every [`ProfileStateListener`] event, tagged with the
/// [`crate::ci::profile_id::ProfileId`] of the state that raised it, plus
/// membership changes.
pub trait ProfileRegistryListener {
    /// A new profile state was inserted.
    fn on_added(&self, _id: crate::ci::profile_id::ProfileId) {}
    /// A profile state was removed.
    fn on_removed(&self, _id: crate::ci::profile_id::ProfileId) {}
    /// Re-fanned [`ProfileStateListener::on_available_change`].
    fn on_available_change(&self, _id: crate::ci::profile_id::ProfileId, _channel: u8, _available: bool) {}
    /// Re-fanned [`ProfileStateListener::on_can_enable`].
    fn on_can_enable(&self, _id: crate::ci::profile_id::ProfileId, _channel: u8, requested: bool) -> bool {
        requested
    }
    /// Re-fanned [`ProfileStateListener::on_enabled_change`].
    fn on_enabled_change(&self, _id: crate::ci::profile_id::ProfileId, _channel: u8, _enabled: bool) {}
    /// Re-fanned [`ProfileStateListener::on_specific_data_change`].
    fn on_specific_data_change(&self, _id: crate::ci::profile_id::ProfileId, _data: &[u8]) {}
}

/// Device-registry-level fan-out of every remote's profile events, tagged
/// additionally with the owning [`crate::muid::Muid`].
pub trait RemoteProfileListener {
    /// A remote added a profile.
    fn on_added(&self, _muid: crate::muid::Muid, _id: crate::ci::profile_id::ProfileId) {}
    /// A remote removed a profile.
    fn on_removed(&self, _muid: crate::muid::Muid, _id: crate::ci::profile_id::ProfileId) {}
    /// A remote's profile changed enabled state.
    fn on_enabled_change(
        &self,
        _muid: crate::muid::Muid,
        _id: crate::ci::profile_id::ProfileId,
        _channel: u8,
        _enabled: bool,
    ) {
    }
    /// A remote's profile specific data changed.
    fn on_specific_data_change(
        &self,
        _muid: crate::muid::Muid,
        _id: crate::ci::profile_id::ProfileId,
        _data: &[u8],
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    trait Counter {
        fn bump(&self);
    }

    struct Adder(Rc<Cell<u32>>);
    impl Counter for Adder {
        fn bump(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn subscribe_and_unsubscribe() {
        let mut list: ListenerList<dyn Counter> = ListenerList::new();
        let count = Rc::new(Cell::new(0));
        let handle = list.subscribe(Box::new(Adder(count.clone())));
        list.for_each(|l| l.bump());
        assert_eq!(count.get(), 1);
        list.unsubscribe(handle);
        list.for_each(|l| l.bump());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn clone_starts_empty() {
        let mut list: ListenerList<dyn Counter> = ListenerList::new();
        list.subscribe(Box::new(Adder(Rc::new(Cell::new(0)))));
        let cloned = list.clone();
        assert!(cloned.is_empty());
        assert!(!list.is_empty());
    }
}
