// crates/valset-consensus/src/actor.rs
//
// Single-writer handle over a `StakeHooks` implementation.
//
// The hooks run on one blocking worker that drains a bounded command queue,
// so post_block, post_epoch, and update_validator_set never interleave and
// the async runtime is never blocked by chain reads or RocksDB writes.
// Each command carries a oneshot sender for its result.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use valset_core::error::ValsetError;
use valset_core::validator::{AccountSet, ValidatorSetDelta};

use crate::stake_manager::{PostBlockRequest, PostEpochRequest, StakeHooks};

/// Default command queue depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

enum Command {
    PostBlock {
        req: PostBlockRequest,
        reply: oneshot::Sender<Result<(), ValsetError>>,
    },
    PostEpoch {
        req: PostEpochRequest,
        reply: oneshot::Sender<Result<(), ValsetError>>,
    },
    UpdateValidatorSet {
        epoch: u64,
        previous: AccountSet,
        reply: oneshot::Sender<Result<ValidatorSetDelta, ValsetError>>,
    },
}

/// Cloneable async front for a stake manager running on its own worker.
#[derive(Clone)]
pub struct StakeManagerHandle {
    tx: mpsc::Sender<Command>,
}

impl StakeManagerHandle {
    /// Move `hooks` onto a blocking worker and return a handle to it.
    ///
    /// The worker exits once every handle has been dropped. Must be called
    /// from within a tokio runtime.
    pub fn spawn<H>(hooks: H, capacity: usize) -> (Self, JoinHandle<()>)
    where
        H: StakeHooks + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::task::spawn_blocking(move || run(hooks, rx));
        (Self { tx }, worker)
    }

    pub async fn post_block(&self, req: PostBlockRequest) -> Result<(), ValsetError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::PostBlock { req, reply }).await?;
        rx.await.map_err(|_| stopped())?
    }

    pub async fn post_epoch(&self, req: PostEpochRequest) -> Result<(), ValsetError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::PostEpoch { req, reply }).await?;
        rx.await.map_err(|_| stopped())?
    }

    pub async fn update_validator_set(
        &self,
        epoch: u64,
        previous: AccountSet,
    ) -> Result<ValidatorSetDelta, ValsetError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::UpdateValidatorSet {
            epoch,
            previous,
            reply,
        })
        .await?;
        rx.await.map_err(|_| stopped())?
    }

    async fn send(&self, cmd: Command) -> Result<(), ValsetError> {
        self.tx.send(cmd).await.map_err(|_| stopped())
    }
}

fn stopped() -> ValsetError {
    ValsetError::InvalidState("stake manager worker has stopped".to_string())
}

fn run<H: StakeHooks>(mut hooks: H, mut rx: mpsc::Receiver<Command>) {
    info!("stake manager worker started");
    while let Some(cmd) = rx.blocking_recv() {
        // A dropped reply receiver only means the caller gave up waiting.
        match cmd {
            Command::PostBlock { req, reply } => {
                let _ = reply.send(hooks.post_block(&req));
            }
            Command::PostEpoch { req, reply } => {
                let _ = reply.send(hooks.post_epoch(&req));
            }
            Command::UpdateValidatorSet {
                epoch,
                previous,
                reply,
            } => {
                let _ = reply.send(hooks.update_validator_set(epoch, &previous));
            }
        }
    }
    info!("stake manager worker stopped");
}
