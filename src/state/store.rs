//! Shared per-user timer store
//!
//! The one structure touched concurrently by both the control path (chat
//! commands, scheduled completions) and the web path (pause/resume/stop,
//! status polls). All read-modify-write sequences go through [`TimerStore::with_slot`]
//! so they are serialized under a single lock; nothing performs I/O while
//! holding it.

use std::collections::HashMap;

use tokio::sync::Mutex;

use super::record::{RecordSnapshot, TimerRecord, UserId};

/// Task-safe map from user id to their single timer record.
#[derive(Debug, Default)]
pub struct TimerStore {
    records: Mutex<HashMap<UserId, TimerRecord>>,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the record slot for `user`.
    ///
    /// The slot is `None` when the user has no timer. Setting it to `None`
    /// removes the record; setting it to `Some` inserts or replaces it. The
    /// closure runs entirely inside the critical section, which is what lets
    /// callers cancel or arm scheduler callbacks atomically with the state
    /// transition that requires it.
    pub async fn with_slot<R>(
        &self,
        user: UserId,
        f: impl FnOnce(&mut Option<TimerRecord>) -> R,
    ) -> R {
        let mut records = self.records.lock().await;
        let mut slot = records.remove(&user);
        let result = f(&mut slot);
        if let Some(record) = slot {
            records.insert(user, record);
        }
        result
    }

    /// Observable copy of the user's record, if any.
    pub async fn snapshot(&self, user: UserId) -> Option<RecordSnapshot> {
        let records = self.records.lock().await;
        records.get(&user).map(TimerRecord::snapshot)
    }

    /// Number of live records, for diagnostics.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SchedulerHandle;
    use crate::state::record::{SessionType, TimerPhase, TimerRecord};
    use chrono::Utc;

    fn sample_record() -> TimerRecord {
        TimerRecord::started(
            25,
            SessionType::Work,
            Utc::now(),
            1,
            SchedulerHandle::new(|| true),
        )
    }

    #[tokio::test]
    async fn slot_insert_read_remove() {
        let store = TimerStore::new();
        assert!(store.snapshot(7).await.is_none());

        store
            .with_slot(7, |slot| {
                assert!(slot.is_none());
                *slot = Some(sample_record());
            })
            .await;

        let snap = store.snapshot(7).await.expect("record inserted");
        assert_eq!(snap.phase, TimerPhase::Running);
        assert_eq!(store.len().await, 1);

        store.with_slot(7, |slot| *slot = None).await;
        assert!(store.snapshot(7).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn slots_are_independent_per_user() {
        let store = TimerStore::new();
        store.with_slot(1, |slot| *slot = Some(sample_record())).await;
        store.with_slot(2, |slot| *slot = Some(sample_record())).await;

        store.with_slot(1, |slot| *slot = None).await;
        assert!(store.snapshot(1).await.is_none());
        assert!(store.snapshot(2).await.is_some());
    }

    #[tokio::test]
    async fn closure_return_value_is_passed_through() {
        let store = TimerStore::new();
        let phase = store
            .with_slot(3, |slot| {
                *slot = Some(sample_record());
                slot.as_ref().map(|r| r.phase)
            })
            .await;
        assert_eq!(phase, Some(TimerPhase::Running));
    }
}
