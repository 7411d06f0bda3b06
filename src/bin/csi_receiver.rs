//! Station CSI receiver
//!
//! Connects to an access point and prints every captured CSI sample to the console as a `CSI_DATA: ` line.
//! The station reconnects immediately whenever the access point drops it.
//!
//! Set the `SSID` and `PASSWORD` environment variables before building.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use esp_backtrace as _;
use esp_bootloader_esp_idf::esp_app_desc;
use esp_csi_station::{
    register, AuthThreshold, CaptureEmitter, CaptureRadio, ConnectionConfig, ConnectionSupervisor,
    CsiCaptureConfig, EspStation,
};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use esp_println::Printer;
use esp_wifi::{init, EspWifiController};

esp_app_desc!();

extern crate alloc;

const SSID: &str = env!("SSID");
const PASSWORD: &str = env!("PASSWORD");

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    #[cfg(not(feature = "defmt"))]
    esp_println::logger::init_logger(log::LevelFilter::Info);

    // Configure System Clock
    let config = esp_hal::Config::default().with_cpu_clock(esp_hal::clock::CpuClock::max());
    // Take Peripherals
    let peripherals = esp_hal::init(config);

    // Allocate some heap space
    esp_alloc::heap_allocator!(size: 72 * 1024);

    // Initialize Embassy
    // ESP32-C2 only has TIMG0, so it drives embassy from the system timer
    #[cfg(feature = "esp32c2")]
    {
        let systimer = esp_hal::timer::systimer::SystemTimer::new(peripherals.SYSTIMER);
        esp_hal_embassy::init(systimer.alarm0);
    }
    #[cfg(not(feature = "esp32c2"))]
    {
        let timg1 = TimerGroup::new(peripherals.TIMG1);
        esp_hal_embassy::init(timg1.timer0);
    }

    // Instantiate peripherals necessary to set up WiFi
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    let mut rng = Rng::new(peripherals.RNG);

    // Initialize WiFi Controller
    let wifi_init = &*mk_static!(
        EspWifiController<'static>,
        init(timg0.timer0, rng).unwrap()
    );

    // Obtain a random seed value
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let connection = ConnectionConfig::new(SSID, PASSWORD, AuthThreshold::Wpa2Personal).unwrap();
    let station = EspStation::new(wifi_init, peripherals.WIFI, spawner, seed);
    let mut supervisor = ConnectionSupervisor::new(connection, station);

    supervisor.initialize().unwrap();

    register(
        supervisor.stack_mut(),
        &CsiCaptureConfig::default(),
        CaptureEmitter::new(Printer),
    )
    .unwrap();
    supervisor.stack_mut().set_capture_enabled(true).unwrap();

    // Only returns if the station loses its event source
    supervisor.run().await.unwrap();
}
