use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters recorded by the pipeline workers. Updates are relaxed;
/// `snapshot()` gives a point-in-time copy for inspection.
#[derive(Debug, Default)]
pub struct PipelineCounters {
    messages_sent: AtomicU64,
    transmit_failures: AtomicU64,
    dropped_not_running: AtomicU64,
    envelopes_received: AtomicU64,
    decode_failures: AtomicU64,
    dispatched: AtomicU64,
    dropped_no_handler: AtomicU64,
    handler_failures: AtomicU64,
}

impl PipelineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transmit_failure(&self) {
        self.transmit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_not_running(&self) {
        self.dropped_not_running.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_envelope_received(&self) {
        self.envelopes_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped_no_handler(&self) {
        self.dropped_no_handler.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_handler_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CommunicatorStats {
        CommunicatorStats {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            transmit_failures: self.transmit_failures.load(Ordering::Relaxed),
            dropped_not_running: self.dropped_not_running.load(Ordering::Relaxed),
            envelopes_received: self.envelopes_received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            dropped_no_handler: self.dropped_no_handler.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time pipeline statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommunicatorStats {
    /// Packets delivered by the transmitter
    pub messages_sent: u64,
    /// Packets the transmitter failed to deliver
    pub transmit_failures: u64,
    /// `send()` calls discarded because the communicator was not running
    pub dropped_not_running: u64,
    /// Wire envelopes decoded from inbound connections
    pub envelopes_received: u64,
    /// Inbound lines discarded as malformed
    pub decode_failures: u64,
    /// Packets whose handler completed without error
    pub dispatched: u64,
    /// Packets discarded because no handler was subscribed
    pub dropped_no_handler: u64,
    /// Handler invocations that returned an error or panicked
    pub handler_failures: u64,
}
