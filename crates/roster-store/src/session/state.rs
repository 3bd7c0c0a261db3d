//! Identity-map entries and change detection

use roster_core::query::Column;
use roster_core::{RosterError, Student, Value};

/// Handle to an object tracked by one `Session`
///
/// Keys are only meaningful for the session that issued them; another
/// session rejects them as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub(crate) session: u64,
    pub(crate) index: usize,
}

impl ObjectKey {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Where a tracked object is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    /// Added, not yet written; gets an id at the next commit
    Pending,
    /// Backed by a stored row
    Persistent,
    /// Row is removed at the next commit
    MarkedForDeletion,
    /// No longer associated with a row: removed, evicted, or discarded
    Detached,
}

/// Lifecycle plus the last known stored state, used to find dirty columns
#[derive(Debug, Clone)]
pub(crate) enum Lifecycle {
    Pending,
    Persistent { original: Student },
    MarkedForDeletion { original: Student },
    Detached,
}

impl Lifecycle {
    pub(crate) fn state(&self) -> ObjectState {
        match self {
            Lifecycle::Pending => ObjectState::Pending,
            Lifecycle::Persistent { .. } => ObjectState::Persistent,
            Lifecycle::MarkedForDeletion { .. } => ObjectState::MarkedForDeletion,
            Lifecycle::Detached => ObjectState::Detached,
        }
    }

    /// Stored row id for persistent and marked objects
    pub(crate) fn stored_id(&self) -> Option<i64> {
        match self {
            Lifecycle::Persistent { original } | Lifecycle::MarkedForDeletion { original } => {
                original.id
            }
            Lifecycle::Pending | Lifecycle::Detached => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Tracked {
    pub(crate) student: Student,
    pub(crate) lifecycle: Lifecycle,
}

impl Tracked {
    pub(crate) fn pending(student: Student) -> Self {
        Self {
            student,
            lifecycle: Lifecycle::Pending,
        }
    }

    pub(crate) fn persistent(stored: Student) -> Self {
        Self {
            student: stored.clone(),
            lifecycle: Lifecycle::Persistent { original: stored },
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        match &self.lifecycle {
            Lifecycle::Pending | Lifecycle::MarkedForDeletion { .. } => true,
            Lifecycle::Persistent { original } => *original != self.student,
            Lifecycle::Detached => false,
        }
    }
}

/// Columns whose in-memory value differs from the stored one
///
/// # Errors
///
/// Returns `InvalidValue` if the primary key itself was changed.
pub(crate) fn changed_columns(
    original: &Student,
    current: &Student,
) -> Result<Vec<(Column, Value)>, RosterError> {
    if original.id != current.id {
        return Err(RosterError::InvalidValue {
            column: Column::Id.name().to_string(),
            reason: "primary key of a persistent object cannot change".to_string(),
        });
    }

    Ok(Column::ALL
        .into_iter()
        .filter(|column| *column != Column::Id)
        .filter_map(|column| {
            let value = current.get(column);
            (value != original.get(column)).then_some((column, value))
        })
        .collect())
}

/// Bring `current` up to date with `stored`, keeping uncommitted edits
///
/// Columns the caller has not touched take the stored value; `original`
/// becomes the stored state.
pub(crate) fn sync_with_stored(
    current: &mut Student,
    original: &mut Student,
    stored: Student,
) -> Result<(), RosterError> {
    for column in Column::ALL {
        if current.get(column) == original.get(column) {
            current.set(column, stored.get(column))?;
        }
    }
    *original = stored;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::model::date;

    fn stored() -> Student {
        let mut student = Student::new(
            "Alan Turing",
            "alan.turing@sherborne.edu",
            11,
            date(1912, 6, 23).unwrap(),
        );
        student.id = Some(2);
        student
    }

    #[test]
    fn test_only_edited_columns_are_changed() {
        let original = stored();
        let mut current = original.clone();
        current.grade = 12;

        let changes = changed_columns(&original, &current).unwrap();
        assert_eq!(changes, vec![(Column::Grade, Value::Integer(12))]);
    }

    #[test]
    fn test_changed_primary_key_rejected() {
        let original = stored();
        let mut current = original.clone();
        current.id = Some(9);
        assert!(changed_columns(&original, &current).is_err());
    }

    #[test]
    fn test_sync_keeps_local_edits() {
        let mut original = stored();
        let mut current = original.clone();
        current.name = "A. M. Turing".to_string();

        let mut newer = stored();
        newer.grade = 12;
        sync_with_stored(&mut current, &mut original, newer.clone()).unwrap();

        assert_eq!(current.grade, 12);
        assert_eq!(current.name, "A. M. Turing");
        assert_eq!(original, newer);
    }

    #[test]
    fn test_fresh_persistent_entry_is_clean() {
        let tracked = Tracked::persistent(stored());
        assert!(!tracked.is_dirty());
        assert_eq!(tracked.lifecycle.state(), ObjectState::Persistent);
        assert_eq!(tracked.lifecycle.stored_id(), Some(2));
    }
}
