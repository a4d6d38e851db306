use crate::core::packet::{Category, OutgoingPacket};
use crate::core::queue::{self, QueueProducer};
use crate::core::registry::{HandlerRegistry, NotificationHandler};
use crate::core::stats::{CommunicatorStats, PipelineCounters};
use crate::core::transport::Transmitter;
use crate::core::worker::{ReceiveQueueWorker, SendQueueWorker};
use crate::domain::config::CommunicatorConfig;
use crate::domain::error::LanComResult;
use crate::infrastructure::tcp::{SocketListener, TcpTransmitter};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Externally visible communicator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Running,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Stopped => write!(f, "stopped"),
            LifecycleState::Running => write!(f, "running"),
        }
    }
}

/// Resources owned by one run: created on `start()`, taken and torn down
/// on `stop()`.
struct Pipeline {
    outbound: QueueProducer<OutgoingPacket>,
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

enum Lifecycle {
    Stopped,
    Running(Pipeline),
}

impl Lifecycle {
    fn is_running(&self) -> bool {
        matches!(self, Lifecycle::Running(_))
    }
}

/// LAN message bus endpoint.
///
/// `start()` binds the listen socket and spawns the pipeline workers;
/// `send()` enqueues packets for asynchronous delivery; subscribed
/// handlers receive packets addressed to their identifier. The whole API
/// takes `&self`, so one instance can be shared across tasks.
pub struct LanCommunicator {
    config: CommunicatorConfig,
    registry: HandlerRegistry,
    transmitter: Arc<dyn Transmitter>,
    counters: Arc<PipelineCounters>,
    lifecycle: Arc<RwLock<Lifecycle>>,
}

impl LanCommunicator {
    pub fn new(config: CommunicatorConfig) -> Self {
        let transmitter = Arc::new(TcpTransmitter::new(config.connect_timeout_ms));
        Self::with_transmitter(config, transmitter)
    }

    /// Construct with a custom delivery backend. Used by tests to observe
    /// outbound traffic without real connections.
    pub fn with_transmitter(config: CommunicatorConfig, transmitter: Arc<dyn Transmitter>) -> Self {
        Self {
            config,
            registry: HandlerRegistry::new(),
            transmitter,
            counters: Arc::new(PipelineCounters::new()),
            lifecycle: Arc::new(RwLock::new(Lifecycle::Stopped)),
        }
    }

    /// Bind the listen socket and spawn the pipeline workers. Does nothing
    /// when already running. On a bind error the communicator stays
    /// stopped and can be started again.
    pub async fn start(&self) -> LanComResult<()> {
        let mut lifecycle = self.lifecycle.write().await;
        if lifecycle.is_running() {
            debug!("Communicator already running");
            return Ok(());
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (outbound_tx, outbound_rx) = queue::unbounded(shutdown_rx.clone());
        let (processing_tx, processing_rx) = queue::unbounded(shutdown_rx.clone());
        let (content_tx, content_rx) = queue::unbounded(shutdown_rx.clone());

        // Bind before flipping state so a failed start leaves us stopped.
        let listener = SocketListener::bind(
            &self.config.listen_addr(),
            processing_tx,
            content_tx,
            shutdown_rx,
            Arc::clone(&self.counters),
        )
        .await?;
        let local_addr = listener.local_addr();

        let workers = vec![
            tokio::spawn(
                SendQueueWorker::new(
                    outbound_rx,
                    Arc::clone(&self.transmitter),
                    Arc::clone(&self.counters),
                )
                .run(),
            ),
            tokio::spawn(listener.run()),
            tokio::spawn(
                ReceiveQueueWorker::new(
                    Category::Processing,
                    processing_rx,
                    self.registry.clone(),
                    Arc::clone(&self.counters),
                )
                .run(),
            ),
            tokio::spawn(
                ReceiveQueueWorker::new(
                    Category::Content,
                    content_rx,
                    self.registry.clone(),
                    Arc::clone(&self.counters),
                )
                .run(),
            ),
        ];

        *lifecycle = Lifecycle::Running(Pipeline {
            outbound: outbound_tx,
            local_addr,
            shutdown: shutdown_tx,
            workers,
        });

        info!("Communicator started, listening on {}", local_addr);
        Ok(())
    }

    /// Signal shutdown and wait for every pipeline worker to exit. Does
    /// nothing when already stopped.
    pub async fn stop(&self) {
        let pipeline = {
            let mut lifecycle = self.lifecycle.write().await;
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
                Lifecycle::Running(pipeline) => pipeline,
                Lifecycle::Stopped => {
                    debug!("Communicator already stopped");
                    return;
                }
            }
        };

        let Pipeline {
            outbound,
            shutdown,
            workers,
            ..
        } = pipeline;

        if let Err(e) = shutdown.send(true) {
            warn!("Failed to send shutdown signal: {}", e);
        }
        drop(outbound);

        for handle in workers {
            if let Err(e) = handle.await {
                warn!("Worker task completed with error: {}", e);
            }
        }

        info!("Communicator stopped");
    }

    /// Queue a message for delivery to `destination` (`host:port`). Never
    /// blocks on the network. Dropped with a warning when the communicator
    /// is not running.
    pub async fn send(&self, destination: &str, message: &str, identifier: &str) {
        let lifecycle = self.lifecycle.read().await;
        match &*lifecycle {
            Lifecycle::Running(pipeline) => {
                let packet = OutgoingPacket::new(
                    destination.to_string(),
                    message.to_string(),
                    identifier.to_string(),
                );
                if !pipeline.outbound.enqueue(packet) {
                    self.counters.record_dropped_not_running();
                    warn!(
                        "Send queue closed, dropping '{}' packet to {}",
                        identifier, destination
                    );
                }
            }
            Lifecycle::Stopped => {
                self.counters.record_dropped_not_running();
                warn!(
                    "Communicator not running, dropping '{}' packet to {}",
                    identifier, destination
                );
            }
        }
    }

    /// Register a handler for packets addressed to `identifier`,
    /// replacing any previous handler. Subscriptions survive stop/start
    /// cycles.
    pub async fn subscribe_for_notifications<H>(&self, identifier: &str, handler: H)
    where
        H: NotificationHandler + 'static,
    {
        self.registry
            .subscribe(identifier.to_string(), Arc::new(handler))
            .await;
        debug!("Subscribed handler for '{}'", identifier);
    }

    pub async fn state(&self) -> LifecycleState {
        if self.lifecycle.read().await.is_running() {
            LifecycleState::Running
        } else {
            LifecycleState::Stopped
        }
    }

    pub async fn is_running(&self) -> bool {
        self.lifecycle.read().await.is_running()
    }

    /// Address the listener is bound to while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.lifecycle.read().await {
            Lifecycle::Running(pipeline) => Some(pipeline.local_addr),
            Lifecycle::Stopped => None,
        }
    }

    pub fn stats(&self) -> CommunicatorStats {
        self.counters.snapshot()
    }

    pub async fn handler_count(&self) -> usize {
        self.registry.count().await
    }

    pub fn config(&self) -> &CommunicatorConfig {
        &self.config
    }
}

impl Drop for LanCommunicator {
    fn drop(&mut self) {
        if let Ok(lifecycle) = self.lifecycle.try_read() {
            if lifecycle.is_running() {
                warn!("LanCommunicator dropped while still running - workers will observe the closed shutdown channel and exit");
            }
        }
    }
}
