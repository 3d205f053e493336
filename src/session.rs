//! Session context
//!
//! One explicitly-constructed context per command invocation: the resolved
//! settings, the injected remote client and the region cache. Collections
//! and resources receive it by reference; nothing here is global.
//!
//! Single-threaded by design - the cache sits behind a `RefCell` and its
//! discipline is write-once per kind/region key, read thereafter. Anyone
//! introducing concurrent fetches must replace this with real
//! synchronization first.

use crate::aws::client::RemoteClient;
use crate::config::Settings;
use crate::resource::cache::RegionCache;
use std::cell::{Ref, RefCell, RefMut};

pub struct Session {
    settings: Settings,
    client: Box<dyn RemoteClient>,
    cache: RefCell<RegionCache>,
}

impl Session {
    pub fn new(settings: Settings, client: Box<dyn RemoteClient>) -> Self {
        Self {
            settings,
            client,
            cache: RefCell::new(RegionCache::new()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The region this invocation is bound to.
    pub fn region(&self) -> &str {
        &self.settings.region
    }

    pub fn client(&self) -> &dyn RemoteClient {
        self.client.as_ref()
    }

    pub fn cache(&self) -> Ref<'_, RegionCache> {
        self.cache.borrow()
    }

    pub fn cache_mut(&self) -> RefMut<'_, RegionCache> {
        self.cache.borrow_mut()
    }
}
