//! Wakeframe - e-paper frame firmware
//!
//! One wake cycle per boot: read the retained state, check the battery,
//! join WiFi, fetch the remote settings, sync the bitmap and go back to
//! deep sleep. Every exit path stores the state and sleeps; nothing loops.
//!
//! ```text
//!  boot ─► config ─► watchdog ─► retained state ─► panel ─► battery
//!                                                             │
//!   sleep ◄─ store ◄─ SyncEngine ◄─ remote config ◄─ WiFi ◄───┘
//! ```

#![no_std]
#![no_main]

use core::fmt::Write as _;

use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Stack, StackResources};
use embassy_time::{Delay, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_hal::rtc_cntl::Rtc;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::spi::Mode;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_radio::wifi::WifiController;
use esp_radio::Controller;
use heapless::String;
use {esp_backtrace as _, esp_println as _};

use wakeframe_core::config::DeviceConfig;
use wakeframe_core::power::{BatteryMonitor, SleepReason};
use wakeframe_core::remote::{fetch_remote_config, ConfigQuery, RemoteError};
use wakeframe_core::render::MessageScreen;
use wakeframe_core::state::PersistedState;
use wakeframe_core::sync::{RetryPolicy, SyncEngine, TransferOutcome};
use wakeframe_core::traits::{DisplaySink, Liveness, WatchdogLiveness};
use wakeframe_hal::NoUpdates;
use wakeframe_protocol::RasterGeometry;

esp_bootloader_esp_idf::esp_app_desc!();

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

mod board;
mod config;
mod net;
mod panel;

use board::{device_id, reset_reason, wakeup_reason, AdcBattery, RtcStore, RtcWatchdog};
use config::load_config;
use net::{TcpConnector, WifiError};
use panel::{Gd7965, WIDTH};

// Heap for the radio driver
const HEAP_SIZE: usize = 72 * 1024;

/// Largest row one plane can carry on this panel
const MAX_ROW_BYTES: usize = WIDTH as usize / 8;

/// Longest text shown on the panel
const MESSAGE_LEN: usize = 160;

/// Panel SPI clock
const SPI_FREQ_KHZ: u32 = 7_000;

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    info!("Wakeframe {} starting", env!("CARGO_PKG_VERSION"));

    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let (config, config_ok) = match load_config() {
        Ok(config) => (config, true),
        Err(e) => {
            error!("Embedded device.toml rejected: {:?}", e);
            (DeviceConfig::new(), false)
        }
    };

    let watchdog = RtcWatchdog::start(Rtc::new(peripherals.LPWR), config.watchdog.timeout_s);
    let mut liveness = WatchdogLiveness::new(watchdog, NoUpdates);

    let mut store = RtcStore::take().expect("retained record taken twice");
    let mut state = PersistedState::load(&mut store);
    let cycle = state.begin_cycle();
    let reset = reset_reason();
    let wakeup = wakeup_reason();
    info!(
        "Wake cycle {} (reset: {}, wakeup: {}, stored: {:?})",
        cycle,
        reset.as_str(),
        wakeup.as_str(),
        state.checksum
    );

    // Panel: SCK=GPIO14, MOSI=GPIO13, CS=GPIO15, DC=GPIO23, RST=GPIO33, BUSY=GPIO27
    let spi = Spi::new(
        peripherals.SPI2,
        SpiConfig::default()
            .with_frequency(Rate::from_khz(SPI_FREQ_KHZ))
            .with_mode(Mode::_0),
    )
    .expect("SPI init failed")
    .with_sck(peripherals.GPIO14)
    .with_mosi(peripherals.GPIO13);
    let cs = Output::new(peripherals.GPIO15, Level::High, OutputConfig::default());
    let spi_device = ExclusiveDevice::new_no_delay(spi, cs).expect("CS pin");
    let dc = Output::new(peripherals.GPIO23, Level::High, OutputConfig::default());
    let rst = Output::new(peripherals.GPIO33, Level::High, OutputConfig::default());
    let busy = Input::new(peripherals.GPIO27, InputConfig::default().with_pull(Pull::None));

    let mut panel = Gd7965::new(spi_device, dc, rst, busy, config.display.color);
    if let Err(e) = panel.init().await {
        // commit_frame retries the init
        warn!("Panel init failed: {:?}", e);
    }

    let mut sleep = config.sleep;
    let mut radio: Option<WifiController<'static>> = None;

    let reason = 'cycle: {
        if !config_ok {
            show_message(&mut panel, &mut liveness, &config, "Invalid device.toml").await;
            state.checksum.clear();
            break 'cycle SleepReason::PermanentError;
        }

        let mut battery = BatteryMonitor::new(
            AdcBattery::new(peripherals.ADC1, peripherals.GPIO32),
            config.battery,
        );
        let reading = match battery.sample() {
            Ok(reading) => {
                info!(
                    "Battery: {} mV ({}%)",
                    reading.millivolts,
                    battery.percent(&reading)
                );
                Some(reading)
            }
            Err(e) => {
                warn!("Battery read failed: {:?}", e);
                None
            }
        };

        if let Some(reading) = reading.filter(|r| battery.is_critical(r)) {
            warn!("Battery critical: {} mV", reading.millivolts);
            let text = message(format_args!(
                "Voltage {}.{:03} V critical\nPlease charge",
                reading.millivolts / 1000,
                reading.millivolts % 1000
            ));
            show_message(&mut panel, &mut liveness, &config, &text).await;
            state.checksum.clear();
            break 'cycle SleepReason::PermanentError;
        }

        let network = match start_network(&spawner, peripherals.WIFI).await {
            Ok(network) => network,
            Err(e) => {
                error!("Radio bring-up failed: {:?}", e);
                show_message(&mut panel, &mut liveness, &config, "WiFi unavailable").await;
                state.checksum.clear();
                break 'cycle SleepReason::TemporaryError;
            }
        };
        let (controller, stack, mac) = network;
        let controller = radio.insert(controller);

        let joined = match net::connect(controller, &mut liveness).await {
            Ok(()) => net::wait_for_ip(stack, &mut liveness).await,
            Err(e) => Err(e),
        };
        if let Err(e) = joined {
            warn!("Network unavailable: {:?}", e);
            show_message(&mut panel, &mut liveness, &config, "WiFi connect failed").await;
            state.checksum.clear();
            break 'cycle SleepReason::TemporaryError;
        }

        let id = device_id(mac);
        info!("Device id {}", id.as_str());

        let rx = mk_static!([u8; net::tcp::RX_BUFFER_LEN], [0; net::tcp::RX_BUFFER_LEN]);
        let tx = mk_static!([u8; net::tcp::TX_BUFFER_LEN], [0; net::tcp::TX_BUFFER_LEN]);
        let mut connector =
            TcpConnector::new(stack, config.server.host.as_str(), config.server.port, rx, tx);
        let mut delay = Delay;

        let query = ConfigQuery {
            device_id: id.as_str(),
            battery: reading,
            battery_config: &config.battery,
            width: config.display.width,
            height: config.display.height,
            color: config.display.color,
            firmware: config.display.firmware.as_str(),
            reset,
            wakeup,
        };
        let remote = match query.target(config.server.config_path.as_str()) {
            Ok(target) => {
                fetch_remote_config(
                    &mut connector,
                    &mut liveness,
                    &mut delay,
                    config.sync.timeouts,
                    &RetryPolicy::light(),
                    &target,
                )
                .await
            }
            Err(_) => Err(RemoteError::RequestTooLong),
        };

        match remote {
            Ok(remote) => {
                info!("Remote config: {:?}", remote);
                sleep = sleep.with_override(remote.sleep_s);
                if let Some(percent) = remote.battery_percent {
                    info!("Server battery estimate: {}%", percent);
                }
                if remote.ota_allowed(reset) {
                    warn!("Update mode requested; not supported on this board");
                } else if remote.ota_mode {
                    info!("Update mode ignored after {} reset", reset.as_str());
                }
            }
            Err(e) => {
                warn!("Remote config failed: {:?}", e);
                let text = message(format_args!("{}", e));
                show_message(&mut panel, &mut liveness, &config, &text).await;
                state.checksum.clear();
                break 'cycle if e.is_retryable() {
                    SleepReason::TemporaryError
                } else {
                    SleepReason::PermanentError
                };
            }
        }

        let request = match config
            .display
            .frame_request(config.server.bitmap_path.as_str(), id.as_str())
        {
            Ok(request) => request,
            Err(e) => {
                error!("Frame request rejected: {:?}", e);
                show_message(&mut panel, &mut liveness, &config, "Invalid display region").await;
                state.checksum.clear();
                break 'cycle SleepReason::PermanentError;
            }
        };

        let mut engine = SyncEngine::<_, _, _, _, MAX_ROW_BYTES>::new(
            connector,
            &mut liveness,
            delay,
            &mut panel,
            state.checksum.clone(),
        )
        .with_policy(config.sync.policy)
        .with_timeouts(config.sync.timeouts);

        let outcome = engine.synchronize(&request).await;
        info!("Sync finished: {:?} {:?}", outcome, engine.stats());
        let (_, _, _, _, stored) = engine.into_parts();
        state.checksum = stored;

        if let TransferOutcome::Failed(failure) = &outcome {
            let text = message(format_args!("{}", failure));
            show_message(&mut panel, &mut liveness, &config, &text).await;
            state.checksum.clear();
        }

        SleepReason::for_outcome(&outcome)
    };

    if let Some(controller) = radio.as_mut() {
        net::disconnect(controller).await;
    }
    if let Err(e) = panel.sleep().await {
        warn!("Panel sleep failed: {:?}", e);
    }
    if let Err(e) = state.store(&mut store) {
        warn!("Retained state not stored: {:?}", e);
    }

    let seconds = sleep.seconds(reason);
    info!("Sleeping {} s ({:?})", seconds, reason);
    // let the log drain
    Timer::after_millis(100).await;
    liveness.watchdog_mut().sleep_deep(seconds)
}

/// Bring up the radio and network stack, returning the station MAC
async fn start_network(
    spawner: &Spawner,
    wifi: WIFI<'static>,
) -> Result<(WifiController<'static>, Stack<'static>, [u8; 6]), WifiError> {
    let radio = esp_radio::init().map_err(|e| {
        warn!("esp-radio init: {:?}", e);
        WifiError::Radio
    })?;
    let radio = &*mk_static!(Controller<'static>, radio);

    let (controller, interfaces) =
        esp_radio::wifi::new(radio, wifi, Default::default()).map_err(|e| {
            warn!("WiFi init: {:?}", e);
            WifiError::Radio
        })?;
    let device = interfaces.sta;
    let mac = device.mac_address();

    let rng = Rng::new();
    let seed = u64::from(rng.random()) << 32 | u64::from(rng.random());
    let (stack, runner) = embassy_net::new(
        device,
        embassy_net::Config::dhcpv4(Default::default()),
        mk_static!(StackResources<3>, StackResources::<3>::new()),
        seed,
    );
    spawner.spawn(net::net_task(runner).map_err(|_| WifiError::Start)?);

    Ok((controller, stack, mac))
}

/// Draw `text` centred in the configured region
async fn show_message<S: DisplaySink, L: Liveness>(
    panel: &mut S,
    liveness: &mut L,
    config: &DeviceConfig,
    text: &str,
) {
    let display = &config.display;
    let geometry = RasterGeometry::new(display.width, display.height, display.color.planes());
    let screen = MessageScreen::new(text);
    if let Err(e) = screen
        .render::<_, _, MAX_ROW_BYTES>(panel, liveness, geometry, display.x, display.y)
        .await
    {
        warn!("Message screen failed: {:?}", e);
    }
}

/// Format a panel message, truncating what does not fit
fn message(args: core::fmt::Arguments<'_>) -> String<MESSAGE_LEN> {
    let mut text = String::new();
    let _ = text.write_fmt(args);
    text
}
