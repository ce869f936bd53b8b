//! Identifiers and simple allocators for engine entities.

use serde::{Deserialize, Serialize};

/// Pointer-proximity subscription.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

/// Scroll-progress observation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ScrollId(pub u32);

/// Typewriter owned by an [`Engine`](crate::Engine).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TypewriterId(pub u32);

/// Text listener registered on a single typewriter.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u32);

/// Monotonic allocator for every id kind. Ids are never reused within a session.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_subscription: u32,
    next_scroll: u32,
    next_typewriter: u32,
    next_listener: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_subscription(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_scroll(&mut self) -> ScrollId {
        let id = ScrollId(self.next_scroll);
        self.next_scroll = self.next_scroll.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_typewriter(&mut self) -> TypewriterId {
        let id = TypewriterId(self.next_typewriter);
        self.next_typewriter = self.next_typewriter.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener = self.next_listener.wrapping_add(1);
        id
    }
}
