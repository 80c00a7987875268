//! The local device's identity plus every remote device discovered so far.

use std::boxed::Box;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::vec::Vec;

use super::device_info::DeviceInfo;
use super::listener::{Handle, ListenerList, ProfileRegistryListener, RemoteProfileListener};
use super::profile_id::ProfileId;
use crate::muid::Muid;

/// Forwards one remote's [`super::profile_registry::ProfileRegistry`] events
/// into the device registry's own [`RemoteProfileListener`] fan-out, tagging
/// each with the remote's MUID.
struct RemoteRefan {
    muid: Muid,
    sink: Rc<RefCell<ListenerList<dyn RemoteProfileListener>>>,
}

impl ProfileRegistryListener for RemoteRefan {
    fn on_added(&self, id: ProfileId) {
        self.sink.borrow().for_each(|l| l.on_added(self.muid, id));
    }

    fn on_removed(&self, id: ProfileId) {
        self.sink.borrow().for_each(|l| l.on_removed(self.muid, id));
    }

    fn on_enabled_change(&self, id: ProfileId, channel: u8, enabled: bool) {
        self.sink
            .borrow()
            .for_each(|l| l.on_enabled_change(self.muid, id, channel, enabled));
    }

    fn on_specific_data_change(&self, id: ProfileId, data: &[u8]) {
        self.sink
            .borrow()
            .for_each(|l| l.on_specific_data_change(self.muid, id, data));
    }
}

/// The local device's [`DeviceInfo`] plus a MUID-keyed set of remotes
/// discovered over the session, with a lazily-installed fan-out of every
/// remote's profile events.
pub struct DeviceRegistry {
    local: DeviceInfo,
    remotes: BTreeMap<Muid, DeviceInfo>,
    remote_profile_listeners: Rc<RefCell<ListenerList<dyn RemoteProfileListener>>>,
    remote_subscriptions: BTreeMap<Muid, Handle>,
}

impl DeviceRegistry {
    /// A registry for `local`, with no remotes discovered yet.
    pub fn new(local: DeviceInfo) -> Self {
        DeviceRegistry {
            local,
            remotes: BTreeMap::new(),
            remote_profile_listeners: Rc::new(RefCell::new(ListenerList::new())),
            remote_subscriptions: BTreeMap::new(),
        }
    }

    /// The local device's identity.
    pub fn local(&self) -> &DeviceInfo {
        &self.local
    }

    /// The local device's identity, mutably.
    pub fn local_mut(&mut self) -> &mut DeviceInfo {
        &mut self.local
    }

    /// True iff `muid` names either the local device or a known remote.
    pub fn has_local_or_remote_muid(&self, muid: Muid) -> bool {
        self.local.muid() == muid || self.remotes.contains_key(&muid)
    }

    /// True iff `muid` names a known remote.
    pub fn has_remote(&self, muid: Muid) -> bool {
        self.remotes.contains_key(&muid)
    }

    /// A known remote's identity.
    pub fn remote(&self, muid: Muid) -> Option<&DeviceInfo> {
        self.remotes.get(&muid)
    }

    /// A known remote's identity, mutably.
    pub fn remote_mut(&mut self, muid: Muid) -> Option<&mut DeviceInfo> {
        self.remotes.get_mut(&muid)
    }

    /// Every known remote, in MUID order.
    pub fn remotes(&self) -> impl Iterator<Item = &DeviceInfo> {
        self.remotes.values()
    }

    /// The remote with the most recent `last_receive_time`, if any are known.
    pub fn most_recent_remote(&self) -> Option<&DeviceInfo> {
        self.remotes.values().max_by_key(|info| info.last_receive_time())
    }

    /// Insert or replace a remote record (keyed by its MUID), installing the
    /// lazy remote-profile fan-out listener if any top-level subscribers are
    /// already present.
    pub fn upsert_remote(&mut self, mut info: DeviceInfo) {
        let muid = info.muid();
        if !self.remote_profile_listeners.borrow().is_empty() {
            let handle = info.profiles_mut().subscribe(Box::new(RemoteRefan {
                muid,
                sink: self.remote_profile_listeners.clone(),
            }));
            self.remote_subscriptions.insert(muid, handle);
        }
        self.remotes.insert(muid, info);
    }

    /// Record that a message from `muid` arrived at `now_millis`, creating a
    /// minimal placeholder remote record if `muid` is not yet known.
    pub fn touch_remote(&mut self, muid: Muid, now_millis: u64, default_max_sysex_size: u32) {
        if let Some(info) = self.remotes.get_mut(&muid) {
            info.touch(now_millis);
        } else {
            let placeholder = super::device_info::from_discovery_fields(
                muid,
                0,
                0,
                0,
                0,
                0,
                default_max_sysex_size,
                now_millis,
            );
            self.upsert_remote(placeholder);
        }
    }

    /// Remove a known remote. Returns `true` if it was present.
    pub fn remove_remote(&mut self, muid: Muid) -> bool {
        self.remote_subscriptions.remove(&muid);
        self.remotes.remove(&muid).is_some()
    }

    /// Subscribe to every remote's profile events. Installs the fan-out
    /// listener on every currently-known remote if this is the first
    /// subscriber.
    pub fn subscribe_remote_profiles(&mut self, listener: Box<dyn RemoteProfileListener>) -> Handle {
        let was_empty = self.remote_profile_listeners.borrow().is_empty();
        let handle = self.remote_profile_listeners.borrow_mut().subscribe(listener);
        if was_empty {
            self.subscribe_all_remote_profiles();
        }
        handle
    }

    /// Unsubscribe a previously subscribed remote-profile listener, removing
    /// the fan-out from every remote if this was the last subscriber.
    pub fn unsubscribe_remote_profiles(&mut self, handle: Handle) {
        self.remote_profile_listeners.borrow_mut().unsubscribe(handle);
        if self.remote_profile_listeners.borrow().is_empty() {
            self.unsubscribe_all_remote_profiles();
        }
    }

    fn subscribe_all_remote_profiles(&mut self) {
        let muids: Vec<Muid> = self.remotes.keys().copied().collect();
        for muid in muids {
            if let Some(info) = self.remotes.get_mut(&muid) {
                let handle = info.profiles_mut().subscribe(Box::new(RemoteRefan {
                    muid,
                    sink: self.remote_profile_listeners.clone(),
                }));
                self.remote_subscriptions.insert(muid, handle);
            }
        }
    }

    fn unsubscribe_all_remote_profiles(&mut self) {
        let subscriptions = std::mem::take(&mut self.remote_subscriptions);
        for (muid, handle) in subscriptions {
            if let Some(info) = self.remotes.get_mut(&muid) {
                info.profiles_mut().unsubscribe(handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::device_info::DeviceInfoBuilder;
    use crate::ci::profile_id::ProfileId;
    use std::cell::Cell;
    use std::rc::Rc;

    fn local() -> DeviceInfo {
        DeviceInfoBuilder::new()
            .manufacturer_id(1)
            .max_receivable_sysex_size(256)
            .build()
            .unwrap()
    }

    #[test]
    fn touch_remote_creates_placeholder() {
        let mut reg = DeviceRegistry::new(local());
        let muid = Muid::new(42);
        assert!(!reg.has_remote(muid));
        reg.touch_remote(muid, 1000, 128);
        assert!(reg.has_remote(muid));
        assert_eq!(reg.remote(muid).unwrap().last_receive_time(), 1000);
    }

    #[test]
    fn touch_remote_updates_existing() {
        let mut reg = DeviceRegistry::new(local());
        let muid = Muid::new(42);
        reg.touch_remote(muid, 1000, 128);
        reg.touch_remote(muid, 2000, 128);
        assert_eq!(reg.remote(muid).unwrap().last_receive_time(), 2000);
    }

    #[test]
    fn has_local_or_remote_muid() {
        let mut reg = DeviceRegistry::new(local());
        let local_muid = reg.local().muid();
        assert!(reg.has_local_or_remote_muid(local_muid));
        let remote_muid = Muid::new(7);
        assert!(!reg.has_local_or_remote_muid(remote_muid));
        reg.touch_remote(remote_muid, 0, 128);
        assert!(reg.has_local_or_remote_muid(remote_muid));
    }

    struct Counter(Rc<Cell<u32>>);
    impl RemoteProfileListener for Counter {
        fn on_added(&self, _muid: Muid, _id: ProfileId) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn remote_profile_fan_out_is_lazy() {
        let mut reg = DeviceRegistry::new(local());
        let remote_muid = Muid::new(9);
        reg.touch_remote(remote_muid, 0, 128);

        let seen = Rc::new(Cell::new(0));
        let handle = reg.subscribe_remote_profiles(Box::new(Counter(seen.clone())));
        reg.remote_mut(remote_muid)
            .unwrap()
            .profiles_mut()
            .add(ProfileId::standard(1, 1, 1, 0), 0, true);
        assert_eq!(seen.get(), 1);

        reg.unsubscribe_remote_profiles(handle);
        reg.remote_mut(remote_muid)
            .unwrap()
            .profiles_mut()
            .add(ProfileId::standard(2, 2, 2, 0), 0, true);
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn most_recent_remote_picks_latest() {
        let mut reg = DeviceRegistry::new(local());
        reg.touch_remote(Muid::new(1), 100, 128);
        reg.touch_remote(Muid::new(2), 300, 128);
        reg.touch_remote(Muid::new(3), 200, 128);
        assert_eq!(reg.most_recent_remote().unwrap().muid(), Muid::new(2));
    }
}
