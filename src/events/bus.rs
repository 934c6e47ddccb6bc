//! Synchronous publish/subscribe over a closed set of topics

use crate::models::{Project, SortCriteria, Task};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Deepest allowed chain of publishes made from inside handlers
pub const MAX_PUBLISH_DEPTH: usize = 8;

/// Names a kind of change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    TasksUpdated,
    ProjectsUpdated,
    TasksFilterChanged,
    SortCriteriaChanged,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::TasksUpdated,
        Topic::ProjectsUpdated,
        Topic::TasksFilterChanged,
        Topic::SortCriteriaChanged,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Topic::TasksUpdated => "tasksUpdated",
            Topic::ProjectsUpdated => "projectsUpdated",
            Topic::TasksFilterChanged => "tasksFilterChanged",
            Topic::SortCriteriaChanged => "sortCriteriaChanged",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A notification together with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The full task list in current sort order
    TasksUpdated(Vec<Task>),
    /// Every project plus the current selection
    ProjectsUpdated {
        projects: Vec<Project>,
        current: String,
    },
    /// The new current project name
    TasksFilterChanged(String),
    SortCriteriaChanged(SortCriteria),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::TasksUpdated(_) => Topic::TasksUpdated,
            Event::ProjectsUpdated { .. } => Topic::ProjectsUpdated,
            Event::TasksFilterChanged(_) => Topic::TasksFilterChanged,
            Event::SortCriteriaChanged(_) => Topic::SortCriteriaChanged,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Event) -> anyhow::Result<()>>;

/// Delivery counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    pub published: usize,
    pub delivered: usize,
    pub failed: usize,
    /// Publishes refused by the depth guard
    pub dropped: usize,
    pub max_depth: usize,
}

/// In-process event bus.
///
/// Handlers run synchronously, in registration order, before `publish`
/// returns. A failing handler is logged and does not stop delivery to the
/// others. Handlers may publish and subscribe while being notified.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<HashMap<Topic, Vec<(SubscriptionId, Handler)>>>,
    next_id: Cell<u64>,
    depth: Cell<usize>,
    stats: Cell<BusStats>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every future publish of `topic`
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> anyhow::Result<()> + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push((id, Rc::new(handler)));
        log::trace!("Subscribed {:?} to {}", id, topic);
        id
    }

    /// Remove a subscription, returning whether it existed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        for list in handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Number of handlers currently registered for `topic`
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.handlers.borrow().get(&topic).map_or(0, Vec::len)
    }

    /// Deliver `event` to every handler of its topic.
    ///
    /// Returns the number of handlers that completed successfully.
    pub fn publish(&self, event: Event) -> usize {
        let topic = event.topic();
        let depth = self.depth.get();

        if depth >= MAX_PUBLISH_DEPTH {
            log::error!(
                "Dropping {} publish: nested {} levels deep inside handlers",
                topic,
                depth
            );
            self.update_stats(|s| s.dropped += 1);
            return 0;
        }

        // Snapshot so handlers can subscribe without hitting the borrow.
        let handlers: Vec<Handler> = self
            .handlers
            .borrow()
            .get(&topic)
            .map(|list| list.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default();

        let _guard = DepthGuard::enter(&self.depth);
        self.update_stats(|s| {
            s.published += 1;
            s.max_depth = s.max_depth.max(depth + 1);
        });
        log::trace!("Publishing {} to {} handler(s)", topic, handlers.len());

        let mut delivered = 0;
        for handler in handlers {
            match handler(&event) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    log::error!("Subscriber to {} failed: {:#}", topic, e);
                    self.update_stats(|s| s.failed += 1);
                }
            }
        }
        self.update_stats(|s| s.delivered += delivered);
        delivered
    }

    pub fn stats(&self) -> BusStats {
        self.stats.get()
    }

    fn update_stats(&self, f: impl FnOnce(&mut BusStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.borrow();
        let counts: HashMap<Topic, usize> =
            handlers.iter().map(|(t, list)| (*t, list.len())).collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .field("stats", &self.stats.get())
            .finish()
    }
}

/// Restores the nesting depth even if a handler panics
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
    previous: usize,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        let previous = depth.get();
        depth.set(previous + 1);
        DepthGuard { depth, previous }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.previous);
    }
}
