//! Shared, observable item store.
//!
//! # Responsibility
//! - Own the single SQLite connection used by all item reads and writes.
//! - Push full sorted snapshots to subscribers after every mutation.
//!
//! # Invariants
//! - Every write and the snapshot publication that follows it run under the
//!   same connection lock, so subscribers never observe a partial write and
//!   snapshots arrive in write order.
//! - Lock order is always `conn` then `subscribers`.
//! - Subscribers whose receiver was dropped are pruned on the next publish.

use crate::db::DbTarget;
use crate::model::food_item::{FoodItem, FoodItemId};
use crate::model::sort_order::SortOrder;
use crate::repo::food_item_repo::{
    FoodItemRepository, RepoError, RepoResult, SqliteFoodItemRepository,
};
use crate::repo::preference_repo::{PreferenceRepository, SqlitePreferenceRepository};
use log::{debug, warn};
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Handle identifying one registered subscriber.
pub type SubscriptionId = u64;

struct Subscriber {
    id: SubscriptionId,
    order: SortOrder,
    sender: Sender<Vec<FoodItem>>,
}

/// Receiving side of an item-list subscription.
///
/// The first snapshot is delivered on registration; later ones follow every
/// store mutation and every order change.
pub struct ItemsSubscription {
    id: SubscriptionId,
    receiver: Receiver<Vec<FoodItem>>,
}

impl ItemsSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Blocks until the next snapshot arrives.
    ///
    /// Returns `None` once the store has been dropped.
    pub fn recv(&self) -> Option<Vec<FoodItem>> {
        self.receiver.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<Vec<FoodItem>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(items) => Some(items),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains pending snapshots and returns the most recent one, if any.
    pub fn latest(&self) -> Option<Vec<FoodItem>> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(items) => latest = Some(items),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return latest,
            }
        }
    }
}

/// Thread-safe item store with change subscriptions.
pub struct FoodItemStore {
    conn: Mutex<Connection>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscription_id: AtomicU64,
}

impl FoodItemStore {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            subscribers: Mutex::new(Vec::new()),
            next_subscription_id: AtomicU64::new(1),
        }
    }

    /// Opens `target`, applies migrations and wraps the connection.
    pub fn open(target: &DbTarget) -> RepoResult<Self> {
        Ok(Self::new(target.open()?))
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Self::open(&DbTarget::Memory)
    }

    /// Registers a subscriber for `order` and sends it the current snapshot.
    pub fn subscribe(&self, order: SortOrder) -> RepoResult<ItemsSubscription> {
        let conn = self.lock_conn()?;
        let snapshot = SqliteFoodItemRepository::new(&conn).list_items(order)?;

        let (sender, receiver) = mpsc::channel();
        let id = self.next_subscription_id.fetch_add(1, Ordering::Relaxed);
        // Receiver is alive in this scope, so the initial send cannot fail.
        let _ = sender.send(snapshot);
        self.lock_subscribers()?.push(Subscriber { id, order, sender });

        debug!(
            "event=items_subscribe module=store status=ok subscription_id={id} order={}",
            order.as_str()
        );
        Ok(ItemsSubscription { id, receiver })
    }

    /// Switches a subscriber to `order` and re-emits the snapshot.
    ///
    /// Unknown or already-dropped subscriptions are ignored.
    pub fn set_subscription_order(
        &self,
        id: SubscriptionId,
        order: SortOrder,
    ) -> RepoResult<()> {
        let conn = self.lock_conn()?;
        let mut subscribers = self.lock_subscribers()?;
        let Some(subscriber) = subscribers.iter_mut().find(|entry| entry.id == id) else {
            return Ok(());
        };

        subscriber.order = order;
        let snapshot = SqliteFoodItemRepository::new(&conn).list_items(order)?;
        if subscriber.sender.send(snapshot).is_err() {
            subscribers.retain(|entry| entry.id != id);
        }
        Ok(())
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> RepoResult<()> {
        self.lock_subscribers()?.retain(|entry| entry.id != id);
        Ok(())
    }

    pub fn subscriber_count(&self) -> RepoResult<usize> {
        Ok(self.lock_subscribers()?.len())
    }

    /// Runs a mutation and publishes snapshots while still holding the lock.
    fn mutate<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&SqliteFoodItemRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = self.lock_conn()?;
        let repo = SqliteFoodItemRepository::new(&conn);
        let value = f(&repo)?;
        // The write is already durable; a failed publish must not report it as failed.
        if let Err(err) = self.publish_locked(&repo, op) {
            warn!("event=items_publish module=store status=error op={op} error={err}");
        }
        Ok(value)
    }

    fn publish_locked(&self, repo: &SqliteFoodItemRepository<'_>, op: &str) -> RepoResult<()> {
        let mut subscribers = self.lock_subscribers()?;
        if subscribers.is_empty() {
            return Ok(());
        }

        let mut snapshots: HashMap<SortOrder, Vec<FoodItem>> = HashMap::new();
        for subscriber in subscribers.iter() {
            if !snapshots.contains_key(&subscriber.order) {
                snapshots.insert(subscriber.order, repo.list_items(subscriber.order)?);
            }
        }

        let before = subscribers.len();
        subscribers.retain(|subscriber| {
            let snapshot = snapshots
                .get(&subscriber.order)
                .cloned()
                .unwrap_or_default();
            subscriber.sender.send(snapshot).is_ok()
        });
        let pruned = before - subscribers.len();
        if pruned > 0 {
            debug!("event=items_publish module=store status=pruned op={op} pruned={pruned}");
        }
        Ok(())
    }

    fn lock_conn(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            warn!("event=store_lock module=store status=error error_code=conn_poisoned");
            RepoError::LockPoisoned
        })
    }

    fn lock_subscribers(&self) -> RepoResult<MutexGuard<'_, Vec<Subscriber>>> {
        self.subscribers.lock().map_err(|_| {
            warn!("event=store_lock module=store status=error error_code=subscribers_poisoned");
            RepoError::LockPoisoned
        })
    }
}

impl FoodItemRepository for FoodItemStore {
    fn insert_item(&self, item: &FoodItem) -> RepoResult<FoodItemId> {
        self.mutate("insert", |repo| repo.insert_item(item))
    }

    fn update_item(&self, item: &FoodItem) -> RepoResult<()> {
        self.mutate("update", |repo| repo.update_item(item))
    }

    fn delete_item(&self, id: FoodItemId) -> RepoResult<()> {
        self.mutate("delete", |repo| repo.delete_item(id))
    }

    fn get_item(&self, id: FoodItemId) -> RepoResult<FoodItem> {
        let conn = self.lock_conn()?;
        SqliteFoodItemRepository::new(&conn).get_item(id)
    }

    fn list_items(&self, order: SortOrder) -> RepoResult<Vec<FoodItem>> {
        let conn = self.lock_conn()?;
        SqliteFoodItemRepository::new(&conn).list_items(order)
    }
}

impl PreferenceRepository for FoodItemStore {
    fn get_preference(&self, key: &str) -> RepoResult<Option<String>> {
        let conn = self.lock_conn()?;
        SqlitePreferenceRepository::new(&conn).get_preference(key)
    }

    fn set_preference(&self, key: &str, value: &str) -> RepoResult<()> {
        let conn = self.lock_conn()?;
        SqlitePreferenceRepository::new(&conn).set_preference(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::FoodItemStore;
    use crate::model::food_item::FoodItem;
    use crate::model::sort_order::SortOrder;
    use crate::repo::food_item_repo::FoodItemRepository;
    use chrono::NaiveDate;

    fn item(name: &str, day: u32) -> FoodItem {
        FoodItem::new(
            name,
            NaiveDate::from_ymd_opt(2026, 11, day).expect("valid date"),
        )
    }

    #[test]
    fn subscribe_delivers_initial_snapshot() {
        let store = FoodItemStore::open_in_memory().unwrap();
        store.insert_item(&item("Milk", 3)).unwrap();

        let subscription = store.subscribe(SortOrder::NameAsc).unwrap();
        let initial = subscription.recv().unwrap();
        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0].name, "Milk");
    }

    #[test]
    fn dropped_subscription_is_pruned_on_next_write() {
        let store = FoodItemStore::open_in_memory().unwrap();
        let subscription = store.subscribe(SortOrder::default()).unwrap();
        assert_eq!(store.subscriber_count().unwrap(), 1);

        drop(subscription);
        store.insert_item(&item("Bread", 2)).unwrap();
        assert_eq!(store.subscriber_count().unwrap(), 0);
    }

    #[test]
    fn unknown_subscription_order_change_is_ignored() {
        let store = FoodItemStore::open_in_memory().unwrap();
        store.set_subscription_order(999, SortOrder::QuantityAsc).unwrap();
        assert_eq!(store.subscriber_count().unwrap(), 0);
    }
}
