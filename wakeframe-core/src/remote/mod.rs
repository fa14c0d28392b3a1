//! Remote configuration fetched at the start of every wake cycle
//!
//! The device reports its identity, battery and panel to the server and
//! gets back a small JSON object:
//!
//! ```text
//! GET /config?mac=..&adc=..&v=..&vmin=..&vmax=..&vlmin=..&vlmax=..&w=..&h=..&c=..&fw=..&reset=..&wakeup=..
//!
//! {"sleep": 3600, "battery_percent": 87, "ota_mode": false}
//! ```

pub mod config;
pub mod fetch;
pub mod query;

pub use config::{JsonError, RemoteConfig};
pub use fetch::{fetch_remote_config, RemoteError, MAX_BODY_LEN};
pub use query::ConfigQuery;
