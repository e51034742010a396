//! Application Layer - Use cases
//!
//! - `executor`: sequential blockhash/sign/submit/confirm engine
//! - `orchestrator`: quote to executed swap, end to end
//! - `cancel`: cooperative cancellation shared with the caller

pub mod cancel;
pub mod executor;
pub mod orchestrator;

pub use cancel::CancelToken;
pub use executor::{ExecutionConfig, SwapExecutor, TxExecution, TxState};
pub use orchestrator::{PipelineError, SwapAttempt, SwapOptions, SwapOrchestrator};
