//! Change observation boundary.
//!
//! Core store logic publishes changes through Topic and WatchRegistry.
//! Callbacks always run from a snapshot of the watcher list taken at
//! notify time, so a callback may watch or unwatch freely.

use crate::db::table::EntityTable;
use serde::{Deserialize, Serialize};
use std::{
    cell::{Cell, RefCell},
    collections::BTreeSet,
    fmt,
    rc::Rc,
};
use tracing::trace;

///
/// Topic
/// One observable slice of the store: the records of a single entity
/// type, or the value of a single stored query.
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum Topic {
    Entities(String),
    StoredQuery(String),
}

impl Topic {
    #[must_use]
    pub fn entities(name: impl Into<String>) -> Self {
        Self::Entities(name.into())
    }

    #[must_use]
    pub fn stored_query(name: impl Into<String>) -> Self {
        Self::StoredQuery(name.into())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entities(name) => write!(f, "entities:{name}"),
            Self::StoredQuery(name) => write!(f, "stored-query:{name}"),
        }
    }
}

///
/// ChangeEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChangeEvent {
    pub topic: Topic,
}

///
/// WatchId
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WatchId(u64);

///
/// StoreObserver
/// Receives a snapshot of the entity tables after every merge,
/// including merges that changed nothing.
///

pub trait StoreObserver {
    fn on_merge(&self, entities: EntityTable);
}

///
/// Watcher
///

#[derive(Clone)]
struct Watcher {
    id: WatchId,
    topics: BTreeSet<Topic>,
    callback: Rc<dyn Fn(&ChangeEvent)>,
}

///
/// WatchRegistry
///

pub(crate) struct WatchRegistry {
    next_id: Cell<u64>,
    watchers: RefCell<Vec<Watcher>>,
}

impl WatchRegistry {
    pub(crate) const fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            watchers: RefCell::new(Vec::new()),
        }
    }

    // register a callback for a set of topics
    pub(crate) fn watch(
        &self,
        topics: BTreeSet<Topic>,
        callback: Rc<dyn Fn(&ChangeEvent)>,
    ) -> WatchId {
        let id = WatchId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.watchers.borrow_mut().push(Watcher {
            id,
            topics,
            callback,
        });

        id
    }

    // drop a registration, returning whether it existed
    pub(crate) fn unwatch(&self, id: WatchId) -> bool {
        let mut watchers = self.watchers.borrow_mut();
        let before = watchers.len();
        watchers.retain(|w| w.id != id);

        watchers.len() != before
    }

    // dispatch one event per changed topic to every subscribed watcher
    pub(crate) fn notify(&self, changed: &BTreeSet<Topic>) {
        if changed.is_empty() {
            return;
        }

        // Snapshot so callbacks can mutate the registry mid-dispatch.
        let watchers = self.watchers.borrow().clone();
        for topic in changed {
            let event = ChangeEvent {
                topic: topic.clone(),
            };
            for watcher in &watchers {
                if watcher.topics.contains(topic) {
                    trace!(topic = %topic, watch_id = watcher.id.0, "dispatching change");
                    (watcher.callback)(&event);
                }
            }
        }
    }

    #[cfg(test)]
    fn watcher_count(&self) -> usize {
        self.watchers.borrow().len()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn count_events(registry: &WatchRegistry, topics: BTreeSet<Topic>) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        registry.watch(
            topics,
            Rc::new(move |_| {
                seen.set(seen.get() + 1);
            }),
        );

        count
    }

    #[test]
    fn notify_reaches_only_subscribed_topics() {
        let registry = WatchRegistry::new();
        let users = count_events(&registry, BTreeSet::from([Topic::entities("User")]));
        let todos = count_events(&registry, BTreeSet::from([Topic::entities("Todo")]));

        registry.notify(&BTreeSet::from([Topic::entities("User")]));

        assert_eq!(users.get(), 1);
        assert_eq!(todos.get(), 0);
    }

    #[test]
    fn empty_change_set_dispatches_nothing() {
        let registry = WatchRegistry::new();
        let count = count_events(&registry, BTreeSet::from([Topic::entities("User")]));

        registry.notify(&BTreeSet::new());

        assert_eq!(count.get(), 0);
    }

    #[test]
    fn unwatch_stops_dispatch_and_reports_removal() {
        let registry = WatchRegistry::new();
        let count = Rc::new(Cell::new(0));
        let seen = Rc::clone(&count);
        let id = registry.watch(
            BTreeSet::from([Topic::stored_query("activeTodoIds")]),
            Rc::new(move |_| {
                seen.set(seen.get() + 1);
            }),
        );

        assert!(registry.unwatch(id));
        assert!(!registry.unwatch(id));

        registry.notify(&BTreeSet::from([Topic::stored_query("activeTodoIds")]));
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn one_event_per_topic_per_watcher() {
        let registry = WatchRegistry::new();
        let count = count_events(
            &registry,
            BTreeSet::from([Topic::entities("User"), Topic::stored_query("userById")]),
        );

        registry.notify(&BTreeSet::from([
            Topic::entities("User"),
            Topic::stored_query("userById"),
            Topic::entities("Todo"),
        ]));

        assert_eq!(count.get(), 2);
    }

    #[test]
    fn callbacks_may_unwatch_during_dispatch() {
        let registry = Rc::new(WatchRegistry::new());

        let slot: Rc<Cell<Option<WatchId>>> = Rc::new(Cell::new(None));
        let inner_registry = Rc::clone(&registry);
        let inner_slot = Rc::clone(&slot);
        let id = registry.watch(
            BTreeSet::from([Topic::entities("User")]),
            Rc::new(move |_| {
                if let Some(id) = inner_slot.take() {
                    inner_registry.unwatch(id);
                }
            }),
        );
        slot.set(Some(id));

        registry.notify(&BTreeSet::from([Topic::entities("User")]));
        assert_eq!(registry.watcher_count(), 0);
    }

    #[test]
    fn topics_render_with_their_kind_prefix() {
        assert_eq!(Topic::entities("User").to_string(), "entities:User");
        assert_eq!(
            Topic::stored_query("userById").to_string(),
            "stored-query:userById"
        );
    }
}
