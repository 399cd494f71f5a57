//! Observable attribute storage.
//!
//! The store wraps a `tokio::sync::watch` channel: the manager writes,
//! any number of observers hold a receiver and are woken on change.
//! Writes that leave the value untouched do not notify.

use super::types::{Attributes, CapturedMedia};
use std::sync::Arc;
use tokio::sync::watch;

/// Shared handle to the current [`Attributes`].
///
/// Cloning the handle shares the same underlying value.
#[derive(Clone)]
pub struct AttributesStore {
    sender: Arc<watch::Sender<Attributes>>,
}

impl AttributesStore {
    /// Creates a store holding the given initial attributes.
    pub fn new(initial: Attributes) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns a copy of the current attributes.
    pub fn get(&self) -> Attributes {
        self.sender.borrow().clone()
    }

    /// Reads a projection of the current attributes without cloning them.
    pub fn read<R>(&self, f: impl FnOnce(&Attributes) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Registers a new observer.
    ///
    /// The receiver sees the current value as already seen; it is woken
    /// on the next modification.
    pub fn subscribe(&self) -> watch::Receiver<Attributes> {
        self.sender.subscribe()
    }

    /// Applies a modification, notifying observers only if something changed.
    ///
    /// Returns true if the attributes were modified.
    pub(crate) fn update(&self, f: impl FnOnce(&mut Attributes)) -> bool {
        self.sender.send_if_modified(|attributes| {
            let before = attributes.clone();
            f(attributes);
            *attributes != before
        })
    }

    /// Stores the media produced by a photo or video output.
    pub fn set_captured_media(&self, media: CapturedMedia) {
        self.update(|attributes| attributes.captured_media = Some(media));
    }
}

impl Default for AttributesStore {
    fn default() -> Self {
        Self::new(Attributes::default())
    }
}

impl std::fmt::Debug for AttributesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributesStore")
            .field("attributes", &*self.sender.borrow())
            .field("observers", &self.sender.receiver_count())
            .finish()
    }
}
