//! WiFi bring-up and the TCP connector used for HTTP requests

pub mod tcp;
pub mod wifi;

pub use tcp::{SocketStream, TcpConnector};
pub use wifi::{connect, disconnect, net_task, wait_for_ip, WifiError};
