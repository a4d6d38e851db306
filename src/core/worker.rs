use crate::core::packet::{Category, IncomingPacket, OutgoingPacket};
use crate::core::queue::{Dequeued, QueueConsumer};
use crate::core::registry::HandlerRegistry;
use crate::core::stats::PipelineCounters;
use crate::core::transport::Transmitter;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Drains the outbound queue and hands each packet to the transmitter.
/// Runs until the queue reports `Stopped`.
pub struct SendQueueWorker {
    outbound: QueueConsumer<OutgoingPacket>,
    transmitter: Arc<dyn Transmitter>,
    counters: Arc<PipelineCounters>,
}

impl SendQueueWorker {
    pub fn new(
        outbound: QueueConsumer<OutgoingPacket>,
        transmitter: Arc<dyn Transmitter>,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            outbound,
            transmitter,
            counters,
        }
    }

    pub async fn run(mut self) {
        loop {
            let packet = match self.outbound.dequeue().await {
                Dequeued::Item(packet) => packet,
                Dequeued::Stopped => break,
            };

            match self.transmitter.transmit(&packet).await {
                Ok(()) => {
                    self.counters.record_sent();
                    debug!(
                        "Delivered '{}' packet to {}",
                        packet.identifier, packet.destination
                    );
                }
                Err(e) => {
                    self.counters.record_transmit_failure();
                    warn!(
                        "Failed to deliver '{}' packet to {}: {}",
                        packet.identifier, packet.destination, e
                    );
                }
            }
        }

        debug!("Send queue worker stopped");
    }
}

/// Drains one inbound queue and dispatches each packet to its subscribed
/// handler. One worker runs per category.
pub struct ReceiveQueueWorker {
    category: Category,
    inbound: QueueConsumer<IncomingPacket>,
    registry: HandlerRegistry,
    counters: Arc<PipelineCounters>,
}

impl ReceiveQueueWorker {
    pub fn new(
        category: Category,
        inbound: QueueConsumer<IncomingPacket>,
        registry: HandlerRegistry,
        counters: Arc<PipelineCounters>,
    ) -> Self {
        Self {
            category,
            inbound,
            registry,
            counters,
        }
    }

    pub async fn run(mut self) {
        loop {
            let packet = match self.inbound.dequeue().await {
                Dequeued::Item(packet) => packet,
                Dequeued::Stopped => break,
            };

            self.dispatch(packet).await;
        }

        debug!("{} receive worker stopped", self.category);
    }

    async fn dispatch(&self, packet: IncomingPacket) {
        let handler = match self.registry.lookup(&packet.identifier).await {
            Some(handler) => handler,
            None => {
                self.counters.record_dropped_no_handler();
                debug!(
                    "No handler subscribed for '{}', dropping packet",
                    packet.identifier
                );
                return;
            }
        };

        // The registry lock is already released; the handler runs without
        // holding it, so handlers may subscribe from inside a callback.
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            handler.handle(&packet.message, packet.source_address.as_deref())
        }));

        match outcome {
            Ok(Ok(())) => {
                self.counters.record_dispatched();
                debug!("Dispatched '{}' packet", packet.identifier);
            }
            Ok(Err(e)) => {
                self.counters.record_handler_failure();
                error!("Handler for '{}' failed: {}", packet.identifier, e);
            }
            Err(_) => {
                self.counters.record_handler_failure();
                error!("Handler for '{}' panicked", packet.identifier);
            }
        }
    }
}
