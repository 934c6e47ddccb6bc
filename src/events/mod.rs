//! Change notifications between the stores and their observers

pub mod bus;

pub use bus::{BusStats, Event, EventBus, MAX_PUBLISH_DEPTH, SubscriptionId, Topic};
