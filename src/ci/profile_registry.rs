//! The set of [`ProfileState`]s one device hosts, keyed by [`ProfileId`].

use std::boxed::Box;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec::Vec;

use super::listener::{Handle, ListenerList, ProfileRegistryListener, ProfileStateListener};
use super::profile_id::ProfileId;
use super::profile_state::ProfileState;
use crate::muid::Muid;

/// Forwards one [`ProfileState`]'s events into the owning registry's own
/// listener list, tagging each with the state's [`ProfileId`]. Holding only
/// an `Rc` to the registry's listener list (not to the registry itself)
/// keeps this a one-directional edge — see `ci::listener`'s module doc.
struct Refan {
    id: ProfileId,
    sink: Rc<RefCell<ListenerList<dyn ProfileRegistryListener>>>,
}

impl ProfileStateListener for Refan {
    fn on_available_change(&self, channel: u8, available: bool) {
        self.sink
            .borrow()
            .for_each(|l| l.on_available_change(self.id, channel, available));
    }

    fn on_can_enable(&self, channel: u8, requested: bool) -> bool {
        let mut result = requested;
        self.sink
            .borrow()
            .for_each(|l| result = l.on_can_enable(self.id, channel, result) && result);
        result
    }

    fn on_enabled_change(&self, channel: u8, enabled: bool) {
        self.sink
            .borrow()
            .for_each(|l| l.on_enabled_change(self.id, channel, enabled));
    }

    fn on_specific_data_change(&self, data: &[u8]) {
        self.sink
            .borrow()
            .for_each(|l| l.on_specific_data_change(self.id, data));
    }
}

/// A device's hosted profiles, sorted by [`ProfileId`] for deterministic
/// Inquiry Reply ordering.
///
/// Cloning yields a registry with no subscribers at all, at either level:
/// the registry's own listener list starts empty, and the cloned
/// [`ProfileState`]s (whose own `Clone` already drops their listeners) are
/// never re-subscribed to it. See [`DeviceInfo`](super::device_info::DeviceInfo)'s
/// doc comment.
pub struct ProfileRegistry {
    muid: Muid,
    states: BTreeMap<ProfileId, ProfileState>,
    listeners: Rc<RefCell<ListenerList<dyn ProfileRegistryListener>>>,
}

impl ProfileRegistry {
    /// An empty registry, not yet labeled with an owning MUID.
    pub fn new() -> Self {
        ProfileRegistry {
            muid: crate::muid::INVALID,
            states: BTreeMap::new(),
            listeners: Rc::new(RefCell::new(ListenerList::new())),
        }
    }

    /// The MUID of the device this registry belongs to.
    pub fn muid(&self) -> Muid {
        self.muid
    }

    /// Relabel the owning MUID (called when a device's MUID is assigned or
    /// rotated).
    pub fn set_muid(&mut self, muid: Muid) {
        self.muid = muid;
    }

    /// Subscribe to registry-level events.
    pub fn subscribe(&mut self, listener: Box<dyn ProfileRegistryListener>) -> Handle {
        self.listeners.borrow_mut().subscribe(listener)
    }

    /// Unsubscribe a previously subscribed listener.
    pub fn unsubscribe(&mut self, handle: Handle) {
        self.listeners.borrow_mut().unsubscribe(handle);
    }

    /// True if `id` is hosted.
    pub fn contains(&self, id: ProfileId) -> bool {
        self.states.contains_key(&id)
    }

    /// The state for `id`, if hosted.
    pub fn get(&self, id: ProfileId) -> Option<&ProfileState> {
        self.states.get(&id)
    }

    /// The state for `id`, mutably, if hosted.
    pub fn get_mut(&mut self, id: ProfileId) -> Option<&mut ProfileState> {
        self.states.get_mut(&id)
    }

    /// Add or update a profile: if `id` already exists, its existing state is
    /// mutated via [`ProfileState::set_channel_enabled`] and returned;
    /// otherwise a new state is inserted, the registry's fan-out listener is
    /// attached to it first (so the initial transition is itself observable),
    /// an `added` event fires, and the new state's channel is then set.
    pub fn add(&mut self, id: ProfileId, channel: u8, enabled: bool) -> &mut ProfileState {
        if !self.states.contains_key(&id) {
            let mut state = ProfileState::blank(id);
            state.subscribe(Box::new(Refan {
                id,
                sink: self.listeners.clone(),
            }));
            self.states.insert(id, state);
            self.listeners.borrow().for_each(|l| l.on_added(id));
        }
        let state = self
            .states
            .get_mut(&id)
            .expect("just inserted or already present");
        state.set_channel_enabled(channel, enabled);
        state
    }

    /// Remove a hosted profile, firing a `removed` event if it was present.
    pub fn remove(&mut self, id: ProfileId) -> bool {
        let removed = self.states.remove(&id).is_some();
        if removed {
            self.listeners.borrow().for_each(|l| l.on_removed(id));
        }
        removed
    }

    /// Number of hosted profiles.
    pub fn count(&self) -> usize {
        self.states.len()
    }

    /// Number of hosted profiles available on `channel`.
    pub fn count_on_channel(&self, channel: u8) -> usize {
        self.states
            .values()
            .filter(|s| s.is_channel_available(channel))
            .count()
    }

    /// Remove every hosted profile, firing a `removed` event for each.
    pub fn clear(&mut self) {
        let ids: Vec<ProfileId> = self.states.keys().copied().collect();
        self.states.clear();
        for id in ids {
            self.listeners.borrow().for_each(|l| l.on_removed(id));
        }
    }

    /// Iterate hosted profiles in sorted [`ProfileId`] order.
    pub fn iter(&self) -> impl Iterator<Item = &ProfileState> {
        self.states.values()
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ProfileRegistry {
    fn clone(&self) -> Self {
        ProfileRegistry {
            muid: self.muid,
            states: self.states.clone(),
            listeners: Rc::new(RefCell::new(ListenerList::new())),
        }
    }
}

impl core::fmt::Debug for ProfileRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProfileRegistry")
            .field("muid", &self.muid)
            .field("count", &self.states.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn id_a() -> ProfileId {
        ProfileId::standard(1, 1, 1, 0)
    }

    fn id_b() -> ProfileId {
        ProfileId::standard(2, 2, 2, 0)
    }

    #[test]
    fn add_creates_and_updates() {
        let mut reg = ProfileRegistry::new();
        reg.add(id_a(), 0, true);
        assert!(reg.contains(id_a()));
        assert!(reg.get(id_a()).unwrap().is_channel_enabled(0));

        reg.add(id_a(), 1, true);
        assert!(reg.get(id_a()).unwrap().is_channel_enabled(1));
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn remove_fires_event_add_does_not_duplicate() {
        let mut reg = ProfileRegistry::new();
        reg.add(id_a(), 0, true);
        reg.add(id_b(), 0, false);
        assert_eq!(reg.count(), 2);
        assert!(reg.remove(id_a()));
        assert!(!reg.contains(id_a()));
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn count_on_channel_counts_available_not_just_enabled() {
        let mut reg = ProfileRegistry::new();
        reg.add(id_a(), 3, false);
        reg.add(id_b(), 3, true);
        assert_eq!(reg.count_on_channel(3), 2);
        assert_eq!(reg.count_on_channel(4), 0);
    }

    #[test]
    fn iter_is_sorted_by_id() {
        let mut reg = ProfileRegistry::new();
        reg.add(id_b(), 0, false);
        reg.add(id_a(), 0, false);
        let ids: Vec<ProfileId> = reg.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![id_a(), id_b()]);
    }

    struct Counter(Rc<Cell<u32>>);
    impl ProfileRegistryListener for Counter {
        fn on_added(&self, _id: ProfileId) {
            self.0.set(self.0.get() + 1);
        }
        fn on_enabled_change(&self, _id: ProfileId, _channel: u8, _enabled: bool) {
            self.0.set(self.0.get() + 100);
        }
    }

    #[test]
    fn per_state_events_refan_through_registry() {
        let mut reg = ProfileRegistry::new();
        let seen = Rc::new(Cell::new(0));
        reg.subscribe(Box::new(Counter(seen.clone())));
        reg.add(id_a(), 0, true);
        // one `added` (1) plus one `enabled_change` from the initial
        // transition fired through the freshly-attached per-state listener (100)
        assert_eq!(seen.get(), 101);
    }

    #[test]
    fn clone_has_no_subscribers() {
        let mut reg = ProfileRegistry::new();
        reg.add(id_a(), 0, true);
        reg.subscribe(Box::new(Counter(Rc::new(Cell::new(0)))));
        let mut cloned = reg.clone();
        let seen = Rc::new(Cell::new(0));
        cloned.subscribe(Box::new(Counter(seen.clone())));
        cloned.add(id_b(), 0, true);
        // only the freshly (re-)subscribed counter on the clone sees this
        assert_eq!(seen.get(), 101);
    }
}
