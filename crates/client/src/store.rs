//! Read-only state mirrors.
//!
//! Each collection has exactly one authoritative owner (its manager). The
//! rest of the application reads snapshots through a watch channel: the
//! manager publishes after every mutation, readers observe but can never
//! write back. This is the single-writer/many-readers discipline - there is
//! no second path that mutates a collection.

use tokio::sync::watch;

/// Publisher side of a mirrored value.
///
/// Owned by the collection's manager; everything else gets a
/// [`MirrorReader`] via [`watch`](Self::watch).
#[derive(Debug)]
pub struct Mirror<T> {
    tx: watch::Sender<T>,
    // Kept so publishing never observes a closed channel.
    _rx: watch::Receiver<T>,
}

impl<T: Clone> Mirror<T> {
    /// Create a mirror with an initial value.
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self { tx, _rx: rx }
    }

    /// Publish a new snapshot to all readers.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Create a new read-only handle.
    #[must_use]
    pub fn watch(&self) -> MirrorReader<T> {
        MirrorReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only handle to a mirrored value.
#[derive(Debug, Clone)]
pub struct MirrorReader<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> MirrorReader<T> {
    /// Current snapshot of the mirrored value.
    #[must_use]
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait until the value changes, then return the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the owning manager has been dropped.
    pub async fn changed(&mut self) -> Result<T, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_sees_published_snapshots() {
        let mirror = Mirror::new(0_u32);
        let reader = mirror.watch();

        assert_eq!(reader.current(), 0);
        mirror.publish(7);
        assert_eq!(reader.current(), 7);
    }

    #[tokio::test]
    async fn test_changed_wakes_on_publish() {
        let mirror = Mirror::new(vec!["a".to_string()]);
        let mut reader = mirror.watch();

        mirror.publish(vec!["a".to_string(), "b".to_string()]);
        let next = reader.changed().await.expect("mirror alive");
        assert_eq!(next.len(), 2);
    }
}
