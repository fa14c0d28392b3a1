//! Collaborator traits
//!
//! These traits define the seams between the wake-cycle logic and the
//! network stack, the panel driver and the watchdog.

pub mod connector;
pub mod display;
pub mod liveness;
pub mod stream;

pub use connector::{ConnectError, Connector};
pub use display::{DisplayError, DisplaySink};
pub use liveness::{Liveness, WatchdogLiveness};
pub use stream::{ByteStream, StreamError};
