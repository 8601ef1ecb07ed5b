//! Single-slot undo buffer for deletions.
//!
//! States are `Empty` and `Pending`. Arming replaces whatever was pending and
//! restarts the expiry task; taking or expiring returns the slot to `Empty`.
//! Each arm bumps a generation so an expiry task that already woke up can
//! never clear a newer pending deletion.

use crate::models::BookmarkRecord;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeletion {
    pub record: BookmarkRecord,
    pub original_parent_id: String,
}

impl PendingDeletion {
    pub fn of(record: BookmarkRecord) -> Self {
        Self {
            original_parent_id: record.parent_id.clone(),
            record,
        }
    }
}

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Pending {
        deletion: PendingDeletion,
        generation: u64,
    },
}

#[derive(Debug)]
pub struct UndoBuffer {
    window: Duration,
    slot: Arc<Mutex<Slot>>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

impl UndoBuffer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slot: Arc::new(Mutex::new(Slot::Empty)),
            timer: None,
            generation: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Holds `deletion` for one window. Returns the deletion it displaced,
    /// whose undo chance is gone.
    pub async fn arm(&mut self, deletion: PendingDeletion) -> Option<PendingDeletion> {
        self.cancel_timer();
        self.generation += 1;
        let generation = self.generation;
        let previous = {
            let mut slot = self.slot.lock().await;
            std::mem::replace(
                &mut *slot,
                Slot::Pending {
                    deletion,
                    generation,
                },
            )
        };

        let slot = Arc::clone(&self.slot);
        let window = self.window;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let mut slot = slot.lock().await;
            let current = matches!(&*slot, Slot::Pending { generation: g, .. } if *g == generation);
            if current {
                if let Slot::Pending { deletion, .. } = std::mem::take(&mut *slot) {
                    info!(id = %deletion.record.id, "undo window expired, deletion is permanent");
                }
            }
        }));

        match previous {
            Slot::Pending { deletion, .. } => Some(deletion),
            Slot::Empty => None,
        }
    }

    /// Empties the slot and stops the expiry task.
    pub async fn take(&mut self) -> Option<PendingDeletion> {
        self.cancel_timer();
        match std::mem::take(&mut *self.slot.lock().await) {
            Slot::Pending { deletion, .. } => Some(deletion),
            Slot::Empty => None,
        }
    }

    pub async fn pending(&self) -> Option<PendingDeletion> {
        match &*self.slot.lock().await {
            Slot::Pending { deletion, .. } => Some(deletion.clone()),
            Slot::Empty => None,
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for UndoBuffer {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deletion(id: &str) -> PendingDeletion {
        PendingDeletion::of(BookmarkRecord {
            id: id.to_string(),
            title: format!("title {id}"),
            url: format!("https://{id}.example"),
            date_added: 1,
            parent_id: "10".to_string(),
            tags: vec!["Work".to_string()],
            favicon: String::new(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_window() {
        let mut undo = UndoBuffer::new(Duration::from_secs(5));
        assert!(undo.arm(deletion("a")).await.is_none());
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(undo.pending().await.unwrap().original_parent_id, "10");
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(undo.pending().await.is_none());
        assert!(undo.take().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_cancels_the_stale_timer() {
        let mut undo = UndoBuffer::new(Duration::from_secs(5));
        undo.arm(deletion("a")).await;
        tokio::time::sleep(Duration::from_secs(4)).await;
        let displaced = undo.arm(deletion("b")).await.unwrap();
        assert_eq!(displaced.record.id, "a");

        // Past the first deadline, inside the second.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(undo.pending().await.unwrap().record.id, "b");
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(undo.pending().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn take_empties_the_slot_and_stops_expiry() {
        let mut undo = UndoBuffer::new(Duration::from_secs(5));
        undo.arm(deletion("a")).await;
        assert_eq!(undo.take().await.unwrap().record.id, "a");
        assert!(undo.take().await.is_none());

        undo.arm(deletion("b")).await;
        assert_eq!(undo.pending().await.unwrap().record.id, "b");
        assert_eq!(undo.take().await.unwrap().record.id, "b");
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(undo.pending().await.is_none());
    }
}
