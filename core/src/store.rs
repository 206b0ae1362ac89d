//! Generic in-memory record store.
//!
//! A [`MemoryStore`] owns one keyed collection of a single [`Record`] kind and
//! exposes create, read, update, delete, count and exists. Every mutation:
//!
//! 1. Takes the write gate (shared between related stores)
//! 2. Runs the record's field rules, optional name uniqueness and the
//!    entity [`Validator`]
//! 3. Applies the change in a single map operation
//! 4. Notifies [`DeletionListener`]s while the gate is still held
//!
//! Readers take a read lock on this store only. The async surface exists for
//! the HTTP host; nothing inside suspends while a lock is held.

use crate::environment::Clock;
use crate::error::{Result, StoreError};
use crate::record::{ListView, Record, RecordId};
use crate::validation::ValidationErrors;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Entity specific rules that may look at other records.
///
/// Validators run after the record's own field rules and see a read-only
/// [`Snapshot`] of the store being written. Rules must not short-circuit:
/// report every failure.
pub trait Validator<T: Record>: Send + Sync + 'static {
    /// Returns every failed domain rule for `record`.
    fn validate(&self, record: &T, existing: Snapshot<'_, T>) -> ValidationErrors;
}

/// Validator for records that only carry field rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDomainRules;

impl<T: Record> Validator<T> for NoDomainRules {
    fn validate(&self, _record: &T, _existing: Snapshot<'_, T>) -> ValidationErrors {
        ValidationErrors::new()
    }
}

/// Read-only view of a store's records handed to validators.
pub struct Snapshot<'a, T> {
    records: &'a BTreeMap<RecordId, T>,
}

impl<T> Clone for Snapshot<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Snapshot<'_, T> {}

impl<'a, T: Record> Snapshot<'a, T> {
    /// Returns true when a record other than `id` matches `predicate`.
    pub fn any_other(&self, id: RecordId, predicate: impl Fn(&T) -> bool) -> bool {
        self.records
            .values()
            .any(|existing| existing.id() != id && predicate(existing))
    }

    /// Looks up a record by identity.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&'a T> {
        self.records.get(&id)
    }

    /// Iterates records in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &'a T> + use<'a, T> {
        self.records.values()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Proof that the caller holds a store's write gate.
///
/// Handed to [`DeletionListener`]s so they can write to stores sharing the
/// same gate without taking it again.
pub struct WriteTicket<'a> {
    gate: &'a Arc<Mutex<()>>,
    _guard: MutexGuard<'a, ()>,
}

impl<'a> WriteTicket<'a> {
    fn acquire(gate: &'a Arc<Mutex<()>>) -> Self {
        let guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
        Self {
            gate,
            _guard: guard,
        }
    }

    /// Returns true when this ticket holds `gate`.
    #[must_use]
    pub fn guards(&self, gate: &Arc<Mutex<()>>) -> bool {
        Arc::ptr_eq(self.gate, gate)
    }
}

impl fmt::Debug for WriteTicket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteTicket").finish_non_exhaustive()
    }
}

/// Callback run after records are removed from a store.
///
/// Listeners run synchronously, before the delete call returns, while the
/// write gate and the notifying store's write lock are held. Readers of that
/// store therefore wait until every listener has finished. Listeners must not
/// read or write the store that notified them.
pub trait DeletionListener<T: Record>: Send + Sync {
    /// Called with every record removed by one delete operation.
    fn records_deleted(&self, removed: &[T], ticket: &WriteTicket<'_>);
}

/// Behavioural switches of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Reject a record whose name is already used by another record
    pub unique_names: bool,
    /// Reject updates whose last-edited marker differs from the stored one
    pub detect_stale_updates: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            unique_names: true,
            detect_stale_updates: true,
        }
    }
}

struct StoreState<T> {
    records: BTreeMap<RecordId, T>,
    last_id: RecordId,
}

/// In-memory store of one record kind.
///
/// # Type Parameters
///
/// - `T`: the record kind
/// - `V`: the domain validator run on create and update
pub struct MemoryStore<T: Record, V: Validator<T> = NoDomainRules> {
    state: RwLock<StoreState<T>>,
    validator: V,
    clock: Arc<dyn Clock>,
    gate: Arc<Mutex<()>>,
    options: StoreOptions,
    listeners: RwLock<Vec<Arc<dyn DeletionListener<T>>>>,
}

impl<T: Record, V: Validator<T>> MemoryStore<T, V> {
    /// Creates an empty store with default options and its own write gate.
    pub fn new(validator: V, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(StoreState {
                records: BTreeMap::new(),
                last_id: 0,
            }),
            validator,
            clock,
            gate: Arc::new(Mutex::new(())),
            options: StoreOptions::default(),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Replaces the store options.
    #[must_use]
    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Serialises this store's mutations with every other store using `gate`.
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Mutex<()>>) -> Self {
        self.gate = gate;
        self
    }

    /// The write gate, for wiring related stores together.
    #[must_use]
    pub fn gate(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.gate)
    }

    /// Current options.
    #[must_use]
    pub const fn options(&self) -> StoreOptions {
        self.options
    }

    /// Registers a listener notified after every delete.
    pub fn on_deleted(&self, listener: Arc<dyn DeletionListener<T>>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Validates and inserts a new record.
    ///
    /// The store assigns the next identity, stamps `created_on` from the clock
    /// and clears `last_edited_on`. A rejected record consumes no identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] with every failed rule.
    pub async fn create(&self, record: T) -> Result<T> {
        let _ticket = WriteTicket::acquire(&self.gate);
        let result = self.insert(record);
        Self::record_outcome("create", &result);
        result
    }

    /// Validates and replaces a stored record.
    ///
    /// Identity and `created_on` are kept from the stored copy; a new
    /// last-edited marker is stamped.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] when no record has the identity
    /// - [`StoreError::Conflict`] when stale detection is on and the marker
    ///   differs from the stored one
    /// - [`StoreError::Validation`] with every failed rule
    pub async fn update(&self, record: T) -> Result<T> {
        let _ticket = WriteTicket::acquire(&self.gate);
        let result = self.replace(record);
        Self::record_outcome("update", &result);
        result
    }

    /// Removes one record and notifies deletion listeners.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no record has the identity.
    pub async fn delete(&self, id: RecordId) -> Result<T> {
        let ticket = WriteTicket::acquire(&self.gate);
        let mut state = self.write_state();
        let result = match state.records.remove(&id) {
            Some(record) => {
                Self::record_size(state.records.len());
                tracing::debug!(kind = T::KIND, id, "Record deleted");
                self.notify_deleted(std::slice::from_ref(&record), &ticket);
                Ok(record)
            },
            None => Err(StoreError::NotFound { kind: T::KIND, id }),
        };
        drop(state);
        Self::record_outcome("delete", &result);
        result
    }

    /// Removes every record matching `predicate` and notifies listeners.
    ///
    /// Returns the removed records; an empty result is not an error.
    pub async fn delete_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let ticket = WriteTicket::acquire(&self.gate);
        self.remove_matching(&ticket, predicate)
    }

    /// Removes matching records under a gate the caller already holds.
    ///
    /// Falls back to taking this store's own gate when the ticket is for a
    /// different one.
    pub fn delete_where_with(
        &self,
        ticket: &WriteTicket<'_>,
        predicate: impl Fn(&T) -> bool,
    ) -> Vec<T> {
        if ticket.guards(&self.gate) {
            self.remove_matching(ticket, predicate)
        } else {
            let own = WriteTicket::acquire(&self.gate);
            self.remove_matching(&own, predicate)
        }
    }

    /// Runs every rule against `record` without writing anything.
    pub async fn validate(&self, record: &T) -> ValidationErrors {
        let state = self.read_state();
        self.check(record, &state.records)
    }

    /// Looks up a record by identity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no record has the identity.
    pub async fn get(&self, id: RecordId) -> Result<T> {
        self.read_state()
            .records
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: T::KIND, id })
    }

    /// Every record, ordered by identity.
    pub async fn get_all(&self) -> Vec<T> {
        self.read_state().records.values().cloned().collect()
    }

    /// The record with the lowest identity, if any.
    pub async fn get_single(&self) -> Option<T> {
        self.read_state().records.values().next().cloned()
    }

    /// Identity and name of every record, ordered by identity.
    pub async fn get_list_view(&self) -> Vec<ListView> {
        self.read_state()
            .records
            .values()
            .map(Record::list_view)
            .collect()
    }

    /// Number of records matching `predicate`.
    pub async fn count(&self, predicate: impl Fn(&T) -> bool) -> usize {
        self.read_state()
            .records
            .values()
            .filter(|r| predicate(r))
            .count()
    }

    /// Number of records.
    pub async fn count_all(&self) -> usize {
        self.read_state().records.len()
    }

    /// Returns true when any record matches `predicate`.
    pub async fn exists(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.read_state().records.values().any(predicate)
    }

    /// Synchronous identity check for validators of other stores.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.read_state().records.contains_key(&id)
    }

    fn insert(&self, mut record: T) -> Result<T> {
        let mut state = self.write_state();
        let id = state.last_id + 1;
        {
            let header = record.header_mut();
            header.id = id;
            header.created_on = self.clock.now();
            header.last_edited_on = None;
        }

        let errors = self.check(&record, &state.records);
        if !errors.is_empty() {
            tracing::debug!(kind = T::KIND, errors = %errors, "Create rejected");
            return Err(StoreError::Validation(errors));
        }

        state.last_id = id;
        state.records.insert(id, record.clone());
        Self::record_size(state.records.len());
        tracing::debug!(kind = T::KIND, id, name = record.name(), "Record created");
        Ok(record)
    }

    fn replace(&self, mut record: T) -> Result<T> {
        let mut state = self.write_state();
        let id = record.id();
        let Some(stored) = state.records.get(&id) else {
            return Err(StoreError::NotFound { kind: T::KIND, id });
        };

        if self.options.detect_stale_updates
            && stored.header().last_edited_on != record.header().last_edited_on
        {
            tracing::warn!(kind = T::KIND, id, "Stale update rejected");
            return Err(StoreError::Conflict { kind: T::KIND, id });
        }

        let created_on = stored.header().created_on;
        let previous_marker = stored.header().last_edited_on;

        let errors = self.check(&record, &state.records);
        if !errors.is_empty() {
            tracing::debug!(kind = T::KIND, id, errors = %errors, "Update rejected");
            return Err(StoreError::Validation(errors));
        }

        {
            let header = record.header_mut();
            header.created_on = created_on;
            header.last_edited_on = Some(next_edit_marker(self.clock.now(), previous_marker));
        }
        state.records.insert(id, record.clone());
        tracing::debug!(kind = T::KIND, id, "Record updated");
        Ok(record)
    }

    fn remove_matching(&self, ticket: &WriteTicket<'_>, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut state = self.write_state();
        let ids: Vec<RecordId> = state
            .records
            .values()
            .filter(|r| predicate(r))
            .map(Record::id)
            .collect();
        let removed: Vec<T> = ids
            .iter()
            .filter_map(|id| state.records.remove(id))
            .collect();
        Self::record_size(state.records.len());

        if !removed.is_empty() {
            tracing::debug!(kind = T::KIND, count = removed.len(), "Records deleted");
            self.notify_deleted(&removed, ticket);
        }
        drop(state);
        metrics::counter!(
            "flight_schedule_store_operations_total",
            "kind" => T::KIND,
            "operation" => "delete_where",
            "outcome" => "ok"
        )
        .increment(1);
        removed
    }

    fn check(&self, record: &T, records: &BTreeMap<RecordId, T>) -> ValidationErrors {
        let mut errors = record.validate_fields();
        let snapshot = Snapshot { records };

        if self.options.unique_names && !record.name().is_empty() {
            let name = record.name();
            if snapshot.any_other(record.id(), |other| other.name() == name) {
                errors.push(
                    "Name",
                    format!("The {name} name already exists in the data store."),
                );
            }
        }

        errors.extend(self.validator.validate(record, snapshot));
        errors
    }

    fn notify_deleted(&self, removed: &[T], ticket: &WriteTicket<'_>) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.records_deleted(removed, ticket);
        }
    }

    fn record_outcome(operation: &'static str, result: &Result<T>) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(error) => error.outcome(),
        };
        metrics::counter!(
            "flight_schedule_store_operations_total",
            "kind" => T::KIND,
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
    }

    #[allow(clippy::cast_precision_loss)]
    fn record_size(len: usize) {
        metrics::gauge!("flight_schedule_records", "kind" => T::KIND).set(len as f64);
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Record, V: Validator<T>> fmt::Debug for MemoryStore<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("MemoryStore")
            .field("kind", &T::KIND)
            .field("records", &state.records.len())
            .field("last_id", &state.last_id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Next optimistic concurrency marker.
///
/// Strictly greater than `previous` even when the clock has not moved.
fn next_edit_marker(now: DateTime<Utc>, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match previous {
        Some(previous) if now <= previous => previous + Duration::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::gate::Gate;
    use chrono::TimeZone;

    struct StoppedClock;

    impl Clock for StoppedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        }
    }

    fn store() -> MemoryStore<Gate> {
        MemoryStore::new(NoDomainRules, Arc::new(StoppedClock))
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = store();
        let a1 = store.create(Gate::new("A1")).await.unwrap();
        let a2 = store.create(Gate::new("A2")).await.unwrap();

        assert_eq!(a1.id(), 1);
        assert_eq!(a2.id(), 2);
        assert_eq!(a1.header.created_on, StoppedClock.now());
        assert_eq!(a1.header.last_edited_on, None);
    }

    #[tokio::test]
    async fn rejected_create_does_not_consume_id() {
        let store = store();
        store.create(Gate::new("A1")).await.unwrap();

        let err = store.create(Gate::new("A1")).await.unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(
            errors.messages_for("Name"),
            vec!["The A1 name already exists in the data store."]
        );

        let a2 = store.create(Gate::new("A2")).await.unwrap();
        assert_eq!(a2.id(), 2);
        assert_eq!(store.count_all().await, 2);
    }

    #[tokio::test]
    async fn update_keeps_identity_and_creation_time() {
        let store = store();
        let created = store.create(Gate::new("A1")).await.unwrap();

        let mut edit = created.clone();
        edit.header.name = "A9".to_string();
        edit.header.created_on = Utc.with_ymd_and_hms(1999, 1, 1, 0, 0, 0).unwrap();
        let updated = store.update(edit).await.unwrap();

        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.header.created_on, created.header.created_on);
        assert!(updated.header.last_edited_on.is_some());
        assert_eq!(store.get(created.id()).await.unwrap().name(), "A9");
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let store = store();
        let created = store.create(Gate::new("A1")).await.unwrap();

        let mut first = created.clone();
        first.header.name = "B1".to_string();
        store.update(first).await.unwrap();

        let mut second = created;
        second.header.name = "C1".to_string();
        let err = store.update(second).await.unwrap_err();

        assert_eq!(err, StoreError::Conflict { kind: "Gate", id: 1 });
        assert_eq!(store.get(1).await.unwrap().name(), "B1");
    }

    #[tokio::test]
    async fn markers_increase_when_clock_is_stopped() {
        let store = store();
        let created = store.create(Gate::new("A1")).await.unwrap();

        let first = store.update(created).await.unwrap();
        let second = store.update(first.clone()).await.unwrap();

        assert!(second.header.last_edited_on > first.header.last_edited_on);
    }

    #[tokio::test]
    async fn stale_detection_can_be_disabled() {
        let store = store().with_options(StoreOptions {
            detect_stale_updates: false,
            ..StoreOptions::default()
        });
        let created = store.create(Gate::new("A1")).await.unwrap();
        store.update(created.clone()).await.unwrap();

        assert!(store.update(created).await.is_ok());
    }

    #[tokio::test]
    async fn update_of_missing_record_is_not_found() {
        let store = store();
        let mut ghost = Gate::new("A1");
        ghost.header.id = 42;

        let err = store.update(ghost).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound { kind: "Gate", id: 42 });
    }

    #[tokio::test]
    async fn delete_and_queries() {
        let store = store();
        for name in ["A1", "A2", "B1"] {
            store.create(Gate::new(name)).await.unwrap();
        }

        assert_eq!(store.count(|g| g.name().starts_with('A')).await, 2);
        assert!(store.exists(|g| g.name() == "B1").await);
        assert_eq!(store.get_single().await.unwrap().name(), "A1");

        store.delete(1).await.unwrap();
        assert!(matches!(
            store.delete(1).await,
            Err(StoreError::NotFound { id: 1, .. })
        ));

        let names: Vec<_> = store
            .get_list_view()
            .await
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["A2", "B1"]);

        let removed = store.delete_where(|g| g.name().starts_with('Z')).await;
        assert!(removed.is_empty());
    }

    struct Recorder(Mutex<Vec<RecordId>>);

    impl DeletionListener<Gate> for Recorder {
        fn records_deleted(&self, removed: &[Gate], _ticket: &WriteTicket<'_>) {
            self.0.lock().unwrap().extend(removed.iter().map(Record::id));
        }
    }

    #[tokio::test]
    async fn listeners_see_every_removed_record() {
        let store = store();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        store.on_deleted(recorder.clone());

        for name in ["A1", "A2", "B1"] {
            store.create(Gate::new(name)).await.unwrap();
        }
        store.delete(3).await.unwrap();
        store.delete_where(|g| g.name().starts_with('A')).await;

        assert_eq!(*recorder.0.lock().unwrap(), vec![3, 1, 2]);
    }

    #[test]
    fn edit_marker_follows_clock_when_it_advances() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let t1 = t0 + Duration::seconds(5);
        assert_eq!(next_edit_marker(t0, None), t0);
        assert_eq!(next_edit_marker(t1, Some(t0)), t1);
        assert_eq!(next_edit_marker(t0, Some(t1)), t1 + Duration::microseconds(1));
    }
}
