//! Single-slot rendezvous channel.
//!
//! `send` returns only once the receiver has taken the item, the same
//! contract as a zero-capacity channel. A slow consumer therefore stalls
//! the producer instead of letting discovered items pile up in memory.

use tokio::sync::{mpsc, oneshot};

struct Parcel<T> {
    item: T,
    taken: oneshot::Sender<()>,
}

/// The receiving side is gone; no further item can be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("hand-off receiver dropped")]
pub struct HandoffClosed;

/// Producer half. Deliberately not `Clone`: there is exactly one producer.
pub struct HandoffSender<T> {
    tx: mpsc::Sender<Parcel<T>>,
}

/// Consumer half.
pub struct HandoffReceiver<T> {
    rx: mpsc::Receiver<Parcel<T>>,
}

/// Create a connected sender/receiver pair.
#[must_use]
pub fn rendezvous<T>() -> (HandoffSender<T>, HandoffReceiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (HandoffSender { tx }, HandoffReceiver { rx })
}

impl<T> HandoffSender<T> {
    /// Hand `item` to the consumer, waiting until it has been taken.
    ///
    /// # Errors
    /// `HandoffClosed` if the receiver is dropped before taking the item.
    pub async fn send(&self, item: T) -> Result<(), HandoffClosed> {
        let (taken, taken_rx) = oneshot::channel();
        self.tx
            .send(Parcel { item, taken })
            .await
            .map_err(|_| HandoffClosed)?;
        taken_rx.await.map_err(|_| HandoffClosed)
    }
}

impl<T> HandoffReceiver<T> {
    /// Take the next item, releasing the waiting sender.
    ///
    /// Returns `None` once the sender is dropped.
    pub async fn recv(&mut self) -> Option<T> {
        let Parcel { item, taken } = self.rx.recv().await?;
        // The sender may have given up waiting; the item is still ours.
        let _ = taken.send(());
        Some(item)
    }
}
