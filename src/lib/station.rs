//! `esp-wifi` backed implementation of the stack and capture boundaries.

use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_net::{Runner, Stack, StackResources};
use enumset::{enum_set, EnumSet};
use esp_hal::peripherals::WIFI;
use esp_println::Printer;
use esp_wifi::config::PowerSaveMode;
use esp_wifi::wifi::{
    AuthMethod, ClientConfiguration, Configuration, CsiConfig, WifiController, WifiDevice,
    WifiEvent,
};
use esp_wifi::EspWifiController;
use static_cell::StaticCell;

#[cfg(feature = "defmt")]
use defmt::info;
#[cfg(not(feature = "defmt"))]
use log::info;

use crate::capture::{CaptureEmitter, CaptureRadio, CsiSample};
use crate::config::{AuthThreshold, ConnectionConfig, CsiCaptureConfig, PowerSave, RadioTuning, WifiMode};
use crate::error::{Error, Result};
use crate::event::{EventClass, IpEvent, LinkEvent, NetEvent};
use crate::stack::{EventSource, NetworkStack};

static STACK_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

const STA_EVENTS: EnumSet<WifiEvent> = enum_set!(
    WifiEvent::StaStart | WifiEvent::StaStop | WifiEvent::StaConnected | WifiEvent::StaDisconnected
);

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Station built on the ESP WiFi driver and an embassy-net DHCP stack.
///
/// CSI lines go straight to the serial console through [`Printer`].
pub struct EspStation {
    wifi_init: &'static EspWifiController<'static>,
    wifi: Option<WIFI<'static>>,
    spawner: Spawner,
    seed: u64,
    resources: Option<&'static mut StackResources<3>>,
    controller: Option<WifiController<'static>>,
    net: Option<Stack<'static>>,
    event_loop_ready: bool,
    classes: EnumSet<EventClass>,
    pending: EnumSet<WifiEvent>,
    mode: Option<WifiMode>,
    address_reported: bool,
    address_lost: bool,
    capture_config: Option<CsiCaptureConfig>,
    emitter: Option<CaptureEmitter<Printer>>,
}

impl EspStation {
    /// `wifi_init` is the initialized radio scheduler, `seed` feeds the TCP/IP stack.
    pub fn new(
        wifi_init: &'static EspWifiController<'static>,
        wifi: WIFI<'static>,
        spawner: Spawner,
        seed: u64,
    ) -> Self {
        Self {
            wifi_init,
            wifi: Some(wifi),
            spawner,
            seed,
            resources: None,
            controller: None,
            net: None,
            event_loop_ready: false,
            classes: EnumSet::empty(),
            pending: EnumSet::empty(),
            mode: None,
            address_reported: false,
            address_lost: false,
            capture_config: None,
            emitter: None,
        }
    }

    fn controller(&mut self) -> Result<&mut WifiController<'static>> {
        self.controller
            .as_mut()
            .ok_or(Error::SystemError("Station interface not created"))
    }

    fn pop_pending(&mut self) -> Option<NetEvent> {
        while let Some(event) = self.pending.iter().next() {
            self.pending.remove(event);
            let link = match event {
                WifiEvent::StaStart => LinkEvent::StaStarted,
                WifiEvent::StaStop => LinkEvent::StaStopped,
                WifiEvent::StaConnected => LinkEvent::StaConnected,
                WifiEvent::StaDisconnected => LinkEvent::StaDisconnected,
                _ => continue,
            };
            return Some(NetEvent::Link(link));
        }
        None
    }
}

impl NetworkStack for EspStation {
    fn initialize_network_runtime(&mut self) -> Result<()> {
        let resources = STACK_RESOURCES
            .try_init(StackResources::new())
            .ok_or(Error::SystemError("Network runtime already initialized"))?;
        self.resources = Some(resources);
        Ok(())
    }

    fn create_default_event_loop(&mut self) -> Result<()> {
        self.pending = EnumSet::empty();
        self.event_loop_ready = true;
        Ok(())
    }

    fn create_default_station_interface(&mut self) -> Result<()> {
        let resources = self
            .resources
            .take()
            .ok_or(Error::SystemError("Network runtime not initialized"))?;
        let wifi = self
            .wifi
            .take()
            .ok_or(Error::SystemError("Station interface already created"))?;

        let (controller, interfaces) = esp_wifi::wifi::new(self.wifi_init, wifi)?;

        // Station IP Configuration - DHCP
        let ip_config = embassy_net::Config::dhcpv4(Default::default());
        let (stack, runner) = embassy_net::new(interfaces.sta, ip_config, resources, self.seed);
        self.spawner
            .spawn(net_task(runner))
            .map_err(|_| Error::SystemError("Failed to spawn network task"))?;
        info!("Network Task Running");

        self.controller = Some(controller);
        self.net = Some(stack);
        Ok(())
    }

    fn initialize_radio(&mut self, tuning: &RadioTuning) -> Result<()> {
        let mode = match tuning.power_save {
            PowerSave::None => PowerSaveMode::None,
            PowerSave::Minimum => PowerSaveMode::Minimum,
            PowerSave::Maximum => PowerSaveMode::Maximum,
        };
        self.controller()?.set_power_saving(mode)?;
        Ok(())
    }

    fn subscribe(&mut self, classes: EnumSet<EventClass>) -> Result<()> {
        if !self.event_loop_ready {
            return Err(Error::SystemError("Event loop not created"));
        }
        self.classes |= classes;
        Ok(())
    }

    fn set_mode(&mut self, mode: WifiMode) -> Result<()> {
        self.mode = Some(mode);
        Ok(())
    }

    fn apply_config(&mut self, config: &ConnectionConfig) -> Result<()> {
        let client = match self.mode {
            Some(WifiMode::Station) => ClientConfiguration {
                ssid: config.ssid().into(),
                password: config.password().into(),
                auth_method: auth_method(config.auth_threshold()),
                ..Default::default()
            },
            None => return Err(Error::ConfigError("WiFi mode not set")),
        };
        let config = Configuration::Client(client);
        self.controller()?.set_configuration(&config)?;
        info!("WiFi Configuration Set");
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.controller()?.start()?;
        info!("WiFi Started");
        Ok(())
    }

    fn connect(&mut self) -> Result<()> {
        self.controller()?.connect()?;
        Ok(())
    }
}

impl EventSource for EspStation {
    async fn next_event(&mut self) -> Result<NetEvent> {
        loop {
            if let Some(event) = self.pop_pending() {
                if self.classes.contains(EventClass::Link) {
                    return Ok(event);
                }
                continue;
            }

            let watch_link = self.classes.contains(EventClass::Link);
            let watch_ip = self.classes.contains(EventClass::Ip) && !self.address_reported;
            let address_lost = self.address_lost;
            let net = self
                .net
                .ok_or(Error::SystemError("Station interface not created"))?;
            let controller = self
                .controller
                .as_mut()
                .ok_or(Error::SystemError("Station interface not created"))?;

            let link_fut = async {
                if !watch_link {
                    core::future::pending::<()>().await;
                }
                // Events raised before we started waiting, such as StaStart, are kept.
                controller.wait_for_events(STA_EVENTS, false).await
            };
            let ip_fut = async {
                if !watch_ip {
                    core::future::pending::<()>().await;
                }
                if address_lost {
                    net.wait_config_down().await;
                }
                net.wait_config_up().await
            };

            match select(link_fut, ip_fut).await {
                Either::First(events) => {
                    if events.contains(WifiEvent::StaDisconnected) {
                        self.address_reported = false;
                        self.address_lost = true;
                    }
                    self.pending |= events;
                }
                Either::Second(()) => {
                    self.address_reported = true;
                    self.address_lost = false;
                    if let Some(config) = net.config_v4() {
                        info!("Local IP: {}", config.address);
                    }
                    return Ok(NetEvent::Ip(IpEvent::AddressAssigned));
                }
            }
        }
    }
}

impl CaptureRadio for EspStation {
    type Sink = Printer;

    fn set_capture_config(&mut self, config: &CsiCaptureConfig) -> Result<()> {
        self.capture_config = Some(*config);
        Ok(())
    }

    fn register_capture_callback(&mut self, emitter: CaptureEmitter<Printer>) -> Result<()> {
        self.emitter = Some(emitter);
        Ok(())
    }

    fn set_capture_enabled(&mut self, enabled: bool) -> Result<()> {
        if !enabled {
            // The driver offers no way to disarm a running CSI callback.
            return Err(Error::SystemError("CSI capture cannot be disabled once armed"));
        }
        let config = self
            .capture_config
            .ok_or(Error::ConfigError("CSI capture config not set"))?;
        let mut emitter = self
            .emitter
            .take()
            .ok_or(Error::ConfigError("CSI callback not registered"))?;
        self.controller()?
            .set_csi(build_csi_config(&config), move |info: esp_wifi::wifi::wifi_csi_info_t| {
                let sample = unsafe { CsiSample::from_raw_parts(info.buf as *const i8, info.len as usize) };
                let _ = emitter.on_csi_sample(sample);
            })?;
        info!("CSI initialized");
        Ok(())
    }
}

fn auth_method(threshold: AuthThreshold) -> AuthMethod {
    match threshold {
        AuthThreshold::Open => AuthMethod::None,
        AuthThreshold::Wep => AuthMethod::WEP,
        AuthThreshold::Wpa => AuthMethod::WPA,
        AuthThreshold::Wpa2Personal => AuthMethod::WPA2Personal,
        AuthThreshold::WpaWpa2Personal => AuthMethod::WPAWPA2Personal,
        AuthThreshold::Wpa3Personal => AuthMethod::WPA3Personal,
        AuthThreshold::Wpa2Wpa3Personal => AuthMethod::WPA2WPA3Personal,
    }
}

fn build_csi_config(config: &CsiCaptureConfig) -> CsiConfig {
    CsiConfig {
        lltf_en: config.lltf_enabled,
        htltf_en: config.htltf_enabled,
        stbc_htltf2_en: config.stbc_htltf2_enabled,
        ltf_merge_en: config.ltf_merge_enabled,
        channel_filter_en: config.channel_filter_enabled,
        manu_scale: config.manu_scale,
        shift: u8::from(config.shift),
        dump_ack_en: config.dump_ack_en,
    }
}
