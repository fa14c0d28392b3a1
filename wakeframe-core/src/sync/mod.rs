//! Checksum-gated, row-streamed image synchronization
//!
//! One call to [`SyncEngine::synchronize`] performs up to
//! [`RetryPolicy::max_attempts`] request/response cycles:
//!
//! ```text
//!   Idle ──request──► RequestSent ──"MM" + checksum──► HeaderParsed
//!    ▲  ▲                 │                              │      │
//!    │  └───── 304 ───────┘                     unchanged │      │ changed
//!    └────────────────────────────────────────────────────┘      ▼
//!                                                          StreamingRows
//!                                                                 │ all rows
//!   Failed ◄──── fault in any state ──────                        ▼
//!     │                                                       Committed
//!     └── retry ──► RequestSent
//! ```

pub mod engine;
pub mod outcome;
pub mod policy;
pub mod request;
pub mod state;

pub use engine::{SyncEngine, SyncStats};
pub use outcome::{FailureReason, TransferOutcome};
pub use policy::RetryPolicy;
pub use request::{FrameRequest, RequestError, MAX_DEVICE_ID_LEN, MAX_PATH_LEN};
pub use state::{SyncEvent, SyncState};
