//! Unit-of-work session over the engine's connection
//!
//! A `Session` keeps an identity map of the objects it tracks, queues
//! inserts, edits and removals, and writes them in one SQLite transaction on
//! `commit`. Direct statements (`update`, `delete_where`) bypass the queue:
//! they run at once inside the session's transaction, which is opened lazily
//! and made durable by the next `commit`.
//!
//! Bulk-saved records are copied into the queue and never tracked, so the
//! caller's values keep `id == None` after the commit that stores them.

mod state;

pub use state::{ObjectKey, ObjectState};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::NaiveDateTime;
use roster_core::query::{Assignment, Query};
use roster_core::schema::TableSchema;
use roster_core::{log_op_end, log_op_error, log_op_start};
use roster_core::{Row, RosterError, Student, Value};
use roster_core_types::SessionId;
use rusqlite::Connection;

use crate::config::StoreConfig;
use crate::errors::{from_rusqlite, Result};
use crate::repo::hydration::{
    find_by_id, load_count, load_rows, load_students, result_types,
};
use crate::repo::StudentRepo;
use crate::sql::{compile_count, compile_delete, compile_select, compile_update, CompiledSql};
use state::{changed_columns, sync_with_stored, Lifecycle, Tracked};

/// Source of per-session key generations
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Writes performed by one flush, applied to the identity map only after
/// the transaction commits
#[derive(Debug, Default)]
struct FlushOutcome {
    inserted: Vec<(ObjectKey, i64, NaiveDateTime)>,
    updated: Vec<ObjectKey>,
    removed: Vec<(ObjectKey, i64)>,
    bulk_rows: usize,
}

pub struct Session<'e> {
    id: SessionId,
    generation: u64,
    conn: &'e mut Connection,
    schema: &'e TableSchema,
    config: &'e StoreConfig,
    objects: Vec<Tracked>,
    identity: HashMap<i64, ObjectKey>,
    pending_bulk: Vec<Student>,
}

impl<'e> Session<'e> {
    pub(crate) fn new(
        conn: &'e mut Connection,
        schema: &'e TableSchema,
        config: &'e StoreConfig,
    ) -> Self {
        let id = SessionId::new();
        tracing::debug!(session_id = %id, "session opened");
        Self {
            id,
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            conn,
            schema,
            config,
            objects: Vec::new(),
            identity: HashMap::new(),
            pending_bulk: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.id
    }

    // ----- unit of work -----

    /// Track a new record; it is inserted at the next commit
    pub fn add(&mut self, student: Student) -> ObjectKey {
        let key = self.key_at(self.objects.len());
        self.objects.push(Tracked::pending(student));
        key
    }

    pub fn add_all(&mut self, students: impl IntoIterator<Item = Student>) -> Vec<ObjectKey> {
        students.into_iter().map(|s| self.add(s)).collect()
    }

    /// Queue copies of `students` for insertion at the next commit
    ///
    /// The originals are not tracked and never receive ids.
    pub fn bulk_save_objects(&mut self, students: &[Student]) {
        self.pending_bulk.extend_from_slice(students);
    }

    /// The in-memory record behind `key`, in whatever state it is
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for a key this session did not issue.
    pub fn object(&self, key: ObjectKey) -> Result<&Student> {
        self.tracked(key).map(|t| &t.student)
    }

    /// Mutable access for edits written back at the next commit
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown key and `Deleted` for an object that
    /// is marked for deletion or detached.
    pub fn object_mut(&mut self, key: ObjectKey) -> Result<&mut Student> {
        let tracked = self.tracked_mut(key)?;
        match tracked.lifecycle {
            Lifecycle::Pending | Lifecycle::Persistent { .. } => Ok(&mut tracked.student),
            Lifecycle::MarkedForDeletion { .. } | Lifecycle::Detached => {
                Err(RosterError::ObjectDeleted { key: key.index }.into())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `NotFound` for a key this session did not issue.
    pub fn state(&self, key: ObjectKey) -> Result<ObjectState> {
        self.tracked(key).map(|t| t.lifecycle.state())
    }

    /// Mark a tracked object for removal
    ///
    /// A persistent object's row is deleted at the next commit. A pending
    /// object is simply dropped from the unit of work.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown key and `Deleted` for an object
    /// already detached.
    pub fn delete(&mut self, key: ObjectKey) -> Result<()> {
        let tracked = self.tracked_mut(key)?;

        tracked.lifecycle = match std::mem::replace(&mut tracked.lifecycle, Lifecycle::Detached) {
            Lifecycle::Pending => Lifecycle::Detached,
            Lifecycle::Persistent { original } | Lifecycle::MarkedForDeletion { original } => {
                Lifecycle::MarkedForDeletion { original }
            }
            Lifecycle::Detached => return Err(RosterError::ObjectDeleted { key: key.index }.into()),
        };
        Ok(())
    }

    /// True while there is anything for `commit` or `rollback` to act on
    pub fn is_dirty(&self) -> bool {
        !self.pending_bulk.is_empty()
            || !self.conn.is_autocommit()
            || self.objects.iter().any(Tracked::is_dirty)
    }

    /// Number of row writes the next commit would perform
    pub fn pending_count(&self) -> usize {
        self.pending_bulk.len() + self.objects.iter().filter(|t| t.is_dirty()).count()
    }

    // ----- retrieval -----

    /// Every matching row as a detached record
    ///
    /// A projection query is widened to whole records.
    pub fn all(&self, query: &Query) -> Result<Vec<Student>> {
        observed(&self.id, "query_all", || {
            let compiled = compile_select(self.schema.name(), &query.as_entities())?;
            load_students(&*self.conn, &compiled)
        })
    }

    pub fn first(&self, query: &Query) -> Result<Option<Student>> {
        observed(&self.id, "query_first", || {
            let compiled = compile_select(self.schema.name(), &first_only(query).as_entities())?;
            Ok(load_students(&*self.conn, &compiled)?.into_iter().next())
        })
    }

    /// Matching rows as tuples of the query's projection
    pub fn rows(&self, query: &Query) -> Result<Vec<Row>> {
        observed(&self.id, "query_rows", || self.select_rows(query))
    }

    pub fn first_row(&self, query: &Query) -> Result<Option<Row>> {
        observed(&self.id, "query_first_row", || {
            Ok(self.select_rows(&first_only(query))?.into_iter().next())
        })
    }

    /// First column of the first row, typically an aggregate
    ///
    /// `None` when the query matches no row.
    pub fn scalar(&self, query: &Query) -> Result<Option<Value>> {
        observed(&self.id, "query_scalar", || {
            let row = self.select_rows(&first_only(query))?.into_iter().next();
            Ok(row.and_then(|r| r.into_values().into_iter().next()))
        })
    }

    /// Number of rows the query would return
    pub fn count(&self, query: &Query) -> Result<i64> {
        observed(&self.id, "count", || {
            let compiled = compile_count(self.schema.name(), query)?;
            load_count(&*self.conn, &compiled)
        })
    }

    /// Load matching rows into the identity map
    ///
    /// A row already tracked keeps its key; untouched columns are refreshed
    /// from storage while uncommitted edits are kept.
    pub fn load(&mut self, query: &Query) -> Result<Vec<ObjectKey>> {
        let id = self.id.clone();
        observed(&id, "load", || self.load_entities(query))
    }

    pub fn load_first(&mut self, query: &Query) -> Result<Option<ObjectKey>> {
        let id = self.id.clone();
        observed(&id, "load_first", || {
            Ok(self.load_entities(&first_only(query))?.into_iter().next())
        })
    }

    // ----- direct statements -----

    /// Run one `UPDATE` over every matching row and return how many matched
    ///
    /// Ordering and limits on `query` select which rows are updated. Tracked
    /// objects are refreshed afterwards.
    ///
    /// # Errors
    ///
    /// Validation errors are raised before any SQL runs. A constraint
    /// violation fails the whole statement and leaves every row unchanged.
    pub fn update(&mut self, query: &Query, assignments: &[Assignment]) -> Result<usize> {
        log_op_start!("update", session_id = %self.id, assignments = assignments.len());
        let start = Instant::now();

        let rows = compile_update(self.schema.name(), query, assignments)
            .and_then(|compiled| self.run_direct(&compiled));
        let rows = rows.map_err(|e| {
            log_op_error!(
                "update",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                session_id = %self.id
            );
            e
        })?;

        log_op_end!(
            "update",
            duration_ms = start.elapsed().as_millis() as u64,
            session_id = %self.id,
            rows = rows
        );
        Ok(rows)
    }

    /// Run one `DELETE` over every matching row and return how many went
    ///
    /// Tracked objects whose rows are gone become detached.
    pub fn delete_where(&mut self, query: &Query) -> Result<usize> {
        log_op_start!("delete_where", session_id = %self.id);
        let start = Instant::now();

        let rows = compile_delete(self.schema.name(), query)
            .and_then(|compiled| self.run_direct(&compiled));
        let rows = rows.map_err(|e| {
            log_op_error!(
                "delete_where",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                session_id = %self.id
            );
            e
        })?;

        log_op_end!(
            "delete_where",
            duration_ms = start.elapsed().as_millis() as u64,
            session_id = %self.id,
            rows = rows
        );
        Ok(rows)
    }

    // ----- transaction boundaries -----

    /// Write all pending work in one transaction and make it durable
    ///
    /// Bulk rows go first, then tracked inserts, edits, and removals. Ids are
    /// assigned to tracked objects only once the transaction has committed.
    ///
    /// # Errors
    ///
    /// On any failure the transaction is rolled back, storage is left as it
    /// was before the session's open transaction, and the pending work stays
    /// queued so it can be inspected or discarded with `rollback`.
    pub fn commit(&mut self) -> Result<()> {
        log_op_start!("commit", session_id = %self.id, pending = self.pending_count());
        let start = Instant::now();

        let outcome = self.commit_unit_of_work().map_err(|e| {
            log_op_error!(
                "commit",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                session_id = %self.id
            );
            e
        })?;

        log_op_end!(
            "commit",
            duration_ms = start.elapsed().as_millis() as u64,
            session_id = %self.id,
            rows = outcome
        );
        Ok(())
    }

    /// Discard pending work and undo uncommitted direct statements
    ///
    /// Pending objects become detached, edits and deletion marks are
    /// reverted, and tracked objects are refreshed from storage.
    pub fn rollback(&mut self) -> Result<()> {
        log_op_start!("rollback", session_id = %self.id);
        let start = Instant::now();

        let result = self.rollback_unit_of_work().map_err(|e| {
            log_op_error!(
                "rollback",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                session_id = %self.id
            );
            e
        });
        result?;

        log_op_end!(
            "rollback",
            duration_ms = start.elapsed().as_millis() as u64,
            session_id = %self.id
        );
        Ok(())
    }

    // ----- internals -----

    fn key_at(&self, index: usize) -> ObjectKey {
        ObjectKey {
            session: self.generation,
            index,
        }
    }

    fn tracked(&self, key: ObjectKey) -> Result<&Tracked> {
        Ok(self
            .objects
            .get(key.index)
            .filter(|_| key.session == self.generation)
            .ok_or(RosterError::UnknownObject { key: key.index })?)
    }

    fn tracked_mut(&mut self, key: ObjectKey) -> Result<&mut Tracked> {
        if key.session != self.generation {
            return Err(RosterError::UnknownObject { key: key.index }.into());
        }
        Ok(self
            .objects
            .get_mut(key.index)
            .ok_or(RosterError::UnknownObject { key: key.index })?)
    }

    fn select_rows(&self, query: &Query) -> Result<Vec<Row>> {
        let compiled = compile_select(self.schema.name(), query)?;
        load_rows(&*self.conn, &compiled, &result_types(query.projection()))
    }

    fn load_entities(&mut self, query: &Query) -> Result<Vec<ObjectKey>> {
        let compiled = compile_select(self.schema.name(), &query.as_entities())?;
        let stored = load_students(&*self.conn, &compiled)?;

        let mut keys = Vec::with_capacity(stored.len());
        for student in stored {
            let Some(id) = student.id else { continue };

            if let Some(&key) = self.identity.get(&id) {
                if let Some(tracked) = self.objects.get_mut(key.index) {
                    if let Lifecycle::Persistent { original }
                    | Lifecycle::MarkedForDeletion { original } = &mut tracked.lifecycle
                    {
                        sync_with_stored(&mut tracked.student, original, student)?;
                    }
                }
                keys.push(key);
                continue;
            }

            let key = self.key_at(self.objects.len());
            self.objects.push(Tracked::persistent(student));
            self.identity.insert(id, key);
            keys.push(key);
        }

        Ok(keys)
    }

    fn begin(&mut self) -> Result<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN").map_err(from_rusqlite)?;
            tracing::debug!(session_id = %self.id, "transaction opened");
        }
        Ok(())
    }

    /// Run a direct statement inside the session transaction, then refresh
    fn run_direct(&mut self, compiled: &CompiledSql) -> Result<usize> {
        self.begin()?;
        let rows = StudentRepo::execute(&*self.conn, self.schema, compiled)?;
        self.refresh_tracked()?;
        Ok(rows)
    }

    /// Re-read every row-backed object; objects whose rows are gone detach
    fn refresh_tracked(&mut self) -> Result<()> {
        let conn: &Connection = &*self.conn;
        let mut evicted = Vec::new();

        for tracked in self.objects.iter_mut() {
            let Some(id) = tracked.lifecycle.stored_id() else {
                continue;
            };
            match find_by_id(conn, self.schema, id)? {
                None => {
                    tracked.lifecycle = Lifecycle::Detached;
                    evicted.push(id);
                }
                Some(stored) => {
                    if let Lifecycle::Persistent { original }
                    | Lifecycle::MarkedForDeletion { original } = &mut tracked.lifecycle
                    {
                        sync_with_stored(&mut tracked.student, original, stored)?;
                    }
                }
            }
        }

        for id in evicted {
            self.identity.remove(&id);
        }
        Ok(())
    }

    fn enrolled_default(&self) -> NaiveDateTime {
        self.config.enrolled_date.resolve(self.schema)
    }

    /// Issue every queued write against the open transaction
    fn flush(&self) -> Result<FlushOutcome> {
        let conn: &Connection = &*self.conn;
        let mut outcome = FlushOutcome::default();

        for student in &self.pending_bulk {
            StudentRepo::insert(conn, self.schema, student, self.enrolled_default())?;
            outcome.bulk_rows += 1;
        }

        for (index, tracked) in self.objects.iter().enumerate() {
            let key = self.key_at(index);
            match &tracked.lifecycle {
                Lifecycle::Pending => {
                    let enrolled = tracked
                        .student
                        .enrolled_date
                        .unwrap_or_else(|| self.enrolled_default());
                    let id = StudentRepo::insert(conn, self.schema, &tracked.student, enrolled)?;
                    outcome.inserted.push((key, id, enrolled));
                }
                Lifecycle::Persistent { original } => {
                    let changes = changed_columns(original, &tracked.student)?;
                    if changes.is_empty() {
                        continue;
                    }
                    if let Some(id) = original.id {
                        StudentRepo::update_columns(conn, self.schema, id, &changes)?;
                        outcome.updated.push(key);
                    }
                }
                Lifecycle::MarkedForDeletion { original } => {
                    if let Some(id) = original.id {
                        StudentRepo::delete(conn, self.schema, id)?;
                        outcome.removed.push((key, id));
                    }
                }
                Lifecycle::Detached => {}
            }
        }

        Ok(outcome)
    }

    /// Returns the number of rows written
    fn commit_unit_of_work(&mut self) -> Result<usize> {
        self.begin()?;

        let outcome = match self.flush() {
            Ok(outcome) => outcome,
            Err(err) => {
                self.abort_transaction();
                return Err(err);
            }
        };

        if let Err(err) = self.conn.execute_batch("COMMIT") {
            self.abort_transaction();
            return Err(from_rusqlite(err));
        }

        let written = outcome.bulk_rows
            + outcome.inserted.len()
            + outcome.updated.len()
            + outcome.removed.len();
        self.apply_outcome(outcome);
        Ok(written)
    }

    fn apply_outcome(&mut self, outcome: FlushOutcome) {
        self.pending_bulk.clear();

        // Removals first: SQLite may hand a freed rowid to an insert from
        // the same flush
        for (key, id) in outcome.removed {
            if let Some(tracked) = self.objects.get_mut(key.index) {
                tracked.lifecycle = Lifecycle::Detached;
            }
            if self.identity.get(&id) == Some(&key) {
                self.identity.remove(&id);
            }
            tracing::debug!(session_id = %self.id, student_id = id, "row removed");
        }

        for (key, id, enrolled) in outcome.inserted {
            if let Some(tracked) = self.objects.get_mut(key.index) {
                tracked.student.id = Some(id);
                tracked.student.enrolled_date.get_or_insert(enrolled);
                tracked.lifecycle = Lifecycle::Persistent {
                    original: tracked.student.clone(),
                };
                self.identity.insert(id, key);
            }
        }

        for key in outcome.updated {
            if let Some(tracked) = self.objects.get_mut(key.index) {
                tracked.lifecycle = Lifecycle::Persistent {
                    original: tracked.student.clone(),
                };
            }
        }
    }

    /// Roll the storage transaction back after a failed flush or commit
    ///
    /// The unit of work is left untouched. Tracked objects are refreshed so
    /// undone direct statements are reflected.
    fn abort_transaction(&mut self) {
        if !self.conn.is_autocommit() {
            if let Err(err) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(session_id = %self.id, error = %err, "rollback failed");
            }
        }
        if let Err(err) = self.refresh_tracked() {
            tracing::warn!(session_id = %self.id, error = %err, "refresh after rollback failed");
        }
    }

    fn rollback_unit_of_work(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK").map_err(from_rusqlite)?;
        }

        self.pending_bulk.clear();
        for tracked in self.objects.iter_mut() {
            tracked.lifecycle = match std::mem::replace(&mut tracked.lifecycle, Lifecycle::Detached)
            {
                Lifecycle::Pending | Lifecycle::Detached => Lifecycle::Detached,
                Lifecycle::Persistent { original } | Lifecycle::MarkedForDeletion { original } => {
                    tracked.student = original.clone();
                    Lifecycle::Persistent { original }
                }
            };
        }

        self.refresh_tracked()
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if !self.conn.is_autocommit() {
            if let Err(err) = self.conn.execute_batch("ROLLBACK") {
                tracing::warn!(session_id = %self.id, error = %err, "rollback on drop failed");
            }
        }
        if !self.pending_bulk.is_empty() || self.objects.iter().any(Tracked::is_dirty) {
            tracing::debug!(session_id = %self.id, "session dropped with uncommitted work");
        }
    }
}

/// Same query narrowed to its first row
fn first_only(query: &Query) -> Query {
    let limit = query.limit_value().map_or(1, |limit| limit.min(1));
    query.clone().limit(limit)
}

/// Bracket a read with start/end log events
fn observed<T>(session_id: &SessionId, op: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    log_op_start!(op, session_id = %session_id);
    let start = Instant::now();

    let value = f().map_err(|e| {
        log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            session_id = %session_id
        );
        e
    })?;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        session_id = %session_id
    );
    Ok(value)
}
