use tokio::sync::{mpsc, watch};

/// Outcome of a `dequeue()` call.
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued<T> {
    /// The oldest queued item
    Item(T),
    /// The communicator is stopping; no further items will be delivered
    Stopped,
}

/// Create a linked producer/consumer pair over an unbounded FIFO queue.
///
/// The consumer observes the shutdown signal and reports `Stopped` instead
/// of waiting once it fires.
pub fn unbounded<T>(shutdown: watch::Receiver<bool>) -> (QueueProducer<T>, QueueConsumer<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueProducer { tx }, QueueConsumer { rx, shutdown })
}

/// Enqueue side of a pipeline queue. Cheap to clone; every producer feeds
/// the same consumer.
pub struct QueueProducer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> QueueProducer<T> {
    /// Append an item. Never blocks. Returns false when the consumer is
    /// gone and the item was discarded.
    pub fn enqueue(&self, item: T) -> bool {
        self.tx.send(item).is_ok()
    }
}

impl<T> Clone for QueueProducer<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Dequeue side of a pipeline queue. Held by exactly one worker.
pub struct QueueConsumer<T> {
    rx: mpsc::UnboundedReceiver<T>,
    shutdown: watch::Receiver<bool>,
}

impl<T> QueueConsumer<T> {
    /// Wait for the oldest item. Resolves to `Stopped` once the shutdown
    /// signal has fired or every producer is dropped, without draining
    /// whatever is still queued.
    pub async fn dequeue(&mut self) -> Dequeued<T> {
        if *self.shutdown.borrow() {
            return Dequeued::Stopped;
        }

        tokio::select! {
            item = self.rx.recv() => match item {
                Some(item) => Dequeued::Item(item),
                None => Dequeued::Stopped,
            },
            _ = self.shutdown.changed() => Dequeued::Stopped,
        }
    }
}
