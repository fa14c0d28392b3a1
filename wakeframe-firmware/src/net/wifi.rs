//! Station-mode WiFi with DHCP
//!
//! Connection and address acquisition are bounded so a missing access
//! point costs one short wake instead of a watchdog reset.

use defmt::*;
use embassy_net::{Runner, Stack};
use embassy_time::{with_timeout, Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice};
use wakeframe_core::traits::Liveness;

const SSID: &str = env!("WIFI_SSID");
const PASSWORD: &str = env!("WIFI_PASS");

/// Association attempts before giving up
const CONNECT_ATTEMPTS: u8 = 3;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);
const DHCP_TIMEOUT_MS: u32 = 20_000;
const POLL_MS: u32 = 250;

/// WiFi bring-up errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum WifiError {
    /// Radio could not be initialised
    Radio,
    /// Controller rejected the configuration or failed to start
    Start,
    /// Could not associate with the access point
    Connect,
    /// No DHCP lease in time
    Dhcp,
}

/// Configure the station and associate, retrying a few times
pub async fn connect<L: Liveness>(
    controller: &mut WifiController<'static>,
    liveness: &mut L,
) -> Result<(), WifiError> {
    if !matches!(controller.is_started(), Ok(true)) {
        let client = ModeConfig::Client(
            ClientConfig::default()
                .with_ssid(SSID.into())
                .with_password(PASSWORD.into()),
        );
        controller.set_config(&client).map_err(|e| {
            warn!("WiFi config rejected: {:?}", e);
            WifiError::Start
        })?;
        controller.start_async().await.map_err(|e| {
            warn!("WiFi start failed: {:?}", e);
            WifiError::Start
        })?;
        debug!("WiFi started");
    }

    info!("Connecting to {}...", SSID);
    for attempt in 1..=CONNECT_ATTEMPTS {
        liveness.tick().await;
        match with_timeout(CONNECT_TIMEOUT, controller.connect_async()).await {
            Ok(Ok(())) => {
                info!("WiFi connected");
                return Ok(());
            }
            Ok(Err(e)) => warn!("WiFi connect attempt {} failed: {:?}", attempt, e),
            Err(_) => warn!("WiFi connect attempt {} timed out", attempt),
        }
        liveness.tick().await;
        Timer::after(CONNECT_RETRY_DELAY).await;
    }

    Err(WifiError::Connect)
}

/// Wait for the link and a DHCP lease
pub async fn wait_for_ip<L: Liveness>(
    stack: Stack<'static>,
    liveness: &mut L,
) -> Result<(), WifiError> {
    let mut waited = 0u32;
    while waited < DHCP_TIMEOUT_MS {
        liveness.tick().await;
        if stack.is_link_up() {
            if let Some(config) = stack.config_v4() {
                info!("Got IP: {}", config.address);
                return Ok(());
            }
        }
        Timer::after_millis(u64::from(POLL_MS)).await;
        waited += POLL_MS;
    }

    warn!("No DHCP lease after {} ms", DHCP_TIMEOUT_MS);
    Err(WifiError::Dhcp)
}

/// Disconnect and stop the radio before deep sleep
pub async fn disconnect(controller: &mut WifiController<'static>) {
    if let Err(e) = controller.disconnect_async().await {
        debug!("WiFi disconnect: {:?}", e);
    }
    if let Err(e) = controller.stop_async().await {
        debug!("WiFi stop: {:?}", e);
    }
    debug!("WiFi stopped");
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
