//! Topic-based event dispatch between the network manager and subscribers
//!
//! The network manager publishes link transitions on [`LINK_STATUS_CHANGED`];
//! the link handler is registered as a plain closure under a subscriber name.
//! Dispatch takes `&mut self`, so two notifications can never be delivered
//! concurrently to the same subscriber.
//!
//! ## Example
//!
//! ```
//! use http_image_display::events::{EventBus, LINK_STATUS_CHANGED};
//! use http_image_display::LinkStatus;
//!
//! let mut seen = Vec::new();
//! {
//!     let mut bus = EventBus::new();
//!     bus.subscribe(LINK_STATUS_CHANGED, "recorder", |status| {
//!         seen.push(status);
//!         Ok(())
//!     });
//!     assert_eq!(bus.publish(LINK_STATUS_CHANGED, LinkStatus::Up), 1);
//! }
//! assert_eq!(seen, [LinkStatus::Up]);
//! ```

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::Error;
use crate::fetch::HttpTransport;
use crate::link::{LinkHandler, LinkStatus};
use crate::panel::Panel;

/// Topic carrying [`LinkStatus`] transitions
pub const LINK_STATUS_CHANGED: &str = "link.status.changed";

/// Name the image pipeline subscribes under
pub const SUBSCRIBER_NAME: &str = "http_image_display";

type Callback<'a> = Box<dyn FnMut(LinkStatus) -> Result<(), Error> + 'a>;

struct Subscriber<'a> {
    topic: String,
    name: String,
    callback: Callback<'a>,
}

/// Registry of topic subscribers
#[derive(Default)]
pub struct EventBus<'a> {
    subscribers: Vec<Subscriber<'a>>,
}

impl core::fmt::Debug for EventBus<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(
                self.subscribers
                    .iter()
                    .map(|s| (s.topic.as_str(), s.name.as_str())),
            )
            .finish()
    }
}

impl<'a> EventBus<'a> {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for `topic` under `name`
    ///
    /// Subscribing again with the same topic and name replaces the callback.
    pub fn subscribe<F>(&mut self, topic: &str, name: &str, callback: F)
    where
        F: FnMut(LinkStatus) -> Result<(), Error> + 'a,
    {
        let callback: Callback<'a> = Box::new(callback);
        if let Some(existing) = self
            .subscribers
            .iter_mut()
            .find(|s| s.topic == topic && s.name == name)
        {
            existing.callback = callback;
            return;
        }
        self.subscribers.push(Subscriber {
            topic: String::from(topic),
            name: String::from(name),
            callback,
        });
    }

    /// Remove the subscriber `name` from `topic`
    ///
    /// Returns whether a subscriber was removed.
    pub fn unsubscribe(&mut self, topic: &str, name: &str) -> bool {
        let before = self.subscribers.len();
        self.subscribers
            .retain(|s| !(s.topic == topic && s.name == name));
        self.subscribers.len() != before
    }

    /// Deliver `status` to every subscriber of `topic`, in subscription order
    ///
    /// Subscriber errors are logged and do not stop delivery. Returns the
    /// number of subscribers notified.
    pub fn publish(&mut self, topic: &str, status: LinkStatus) -> usize {
        let mut delivered = 0;
        for subscriber in self.subscribers.iter_mut().filter(|s| s.topic == topic) {
            if let Err(e) = (subscriber.callback)(status) {
                log::error!("Subscriber {} failed on {}: {}", subscriber.name, topic, e);
            }
            delivered += 1;
        }
        delivered
    }

    /// Number of subscribers on `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers.iter().filter(|s| s.topic == topic).count()
    }
}

/// Subscribe `handler` to link transitions on `bus`
///
/// The handler moves into the bus; every published status runs
/// [`LinkHandler::on_link_status`].
pub fn subscribe_link_handler<'a, T, P>(bus: &mut EventBus<'a>, mut handler: LinkHandler<T, P>)
where
    T: HttpTransport + 'a,
    P: Panel + 'a,
{
    bus.subscribe(LINK_STATUS_CHANGED, SUBSCRIBER_NAME, move |status| {
        handler.on_link_status(status).map(|_| ())
    });
}
