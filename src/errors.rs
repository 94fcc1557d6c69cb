//! Error taxonomy.
//!
//! Recoverable conditions (unknown cancel id, unfillable FOK, zero quantity)
//! never appear here; they surface as Reject exec events on the output queue.
//! These types cover broken invariants and lifecycle misuse, both of which
//! halt the engine worker rather than continue on a corrupt book.

use crate::command::Qty;
use thiserror::Error;

/// Fatal invariant breaches inside the matching core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A passive insert saw an order id that is already resting.
    #[error("duplicate order id {0} on passive insert")]
    DuplicateOrderId(u64),

    /// The id index pointed at a level or order that does not exist.
    #[error("id index for order {0} resolves to a missing level or order")]
    IdIndexCorrupt(u64),

    /// A FOK order left residue after its feasibility pre-check passed.
    /// Cannot happen while the book is mutated from a single thread.
    #[error("FOK order {order_id} left residue {remaining} after matching")]
    FokResidue { order_id: u64, remaining: Qty },
}

/// Engine-worker lifecycle failures.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// `start` called on a worker that is running or already ran.
    #[error("engine worker already started")]
    AlreadyStarted,

    /// `stop` called on a worker that was never started or already stopped.
    #[error("engine worker is not running")]
    NotRunning,

    /// The OS refused to spawn the worker thread.
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The worker halted on a broken invariant.
    #[error("engine halted: {0}")]
    Engine(#[from] EngineError),

    /// The worker thread panicked.
    #[error("engine thread panicked")]
    Panicked,
}
