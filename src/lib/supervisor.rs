//! Keeps the station associated with its access point.

use core::convert::Infallible;

#[cfg(feature = "defmt")]
use defmt::{info, warn};
#[cfg(not(feature = "defmt"))]
use log::{info, warn};

use crate::config::{ConnectionConfig, RadioTuning, WifiMode};
use crate::error::Result;
use crate::event::{EventClass, EventHandler, IpEvent, LinkEvent, NetEvent};
use crate::policy::{ImmediateReconnect, ReconnectPolicy};
use crate::stack::{EventSource, NetworkStack};

/// Owns the station connection lifecycle.
///
/// The supervisor keeps no connection state of its own. It reacts to the
/// lifecycle events the stack reports: a started or disconnected station gets
/// a connect request, an assigned address is logged.
pub struct ConnectionSupervisor<S, P = ImmediateReconnect> {
    config: ConnectionConfig,
    stack: S,
    policy: P,
}

impl<S: NetworkStack> ConnectionSupervisor<S> {
    /// Creates a supervisor that reconnects immediately after every disconnect.
    pub fn new(config: ConnectionConfig, stack: S) -> Self {
        Self::with_policy(config, stack, ImmediateReconnect)
    }
}

impl<S: NetworkStack, P: ReconnectPolicy> ConnectionSupervisor<S, P> {
    pub fn with_policy(config: ConnectionConfig, stack: S, policy: P) -> Self {
        Self {
            config,
            stack,
            policy,
        }
    }

    /// Brings up the network stack and starts the radio.
    ///
    /// Once this returns the radio is trying to associate; the stack reports
    /// `StaStarted` and the supervisor follows up with a connect request.
    pub fn initialize(&mut self) -> Result<()> {
        info!("Initializing Station");
        self.stack.initialize_network_runtime()?;
        self.stack.create_default_event_loop()?;
        self.stack.create_default_station_interface()?;
        self.stack.initialize_radio(&RadioTuning::default())?;
        self.stack.subscribe(EventClass::Link | EventClass::Ip)?;
        self.stack.set_mode(WifiMode::Station)?;
        self.stack.apply_config(&self.config)?;
        self.stack.start()?;
        info!("Station Initialized");
        Ok(())
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn stack(&self) -> &S {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut S {
        &mut self.stack
    }

    fn request_connect(&mut self) {
        if let Err(e) = self.stack.connect() {
            warn!("Connect request failed: {}", e);
        }
    }
}

impl<S, P> ConnectionSupervisor<S, P>
where
    S: NetworkStack + EventSource,
    P: ReconnectPolicy,
{
    /// Dispatches stack events to [`EventHandler::handle`] until the event source fails.
    pub async fn run(&mut self) -> Result<Infallible> {
        loop {
            let event = self.stack.next_event().await?;
            self.handle(event);
        }
    }
}

impl<S: NetworkStack, P: ReconnectPolicy> EventHandler for ConnectionSupervisor<S, P> {
    fn handle(&mut self, event: NetEvent) {
        match event {
            NetEvent::Link(LinkEvent::StaStarted) => self.request_connect(),
            NetEvent::Link(LinkEvent::StaDisconnected) => {
                if self.policy.should_reconnect() {
                    self.request_connect();
                    info!("Retrying WiFi connection...");
                } else {
                    info!("WiFi disconnected, reconnect withheld");
                }
            }
            NetEvent::Ip(IpEvent::AddressAssigned) => {
                info!("WiFi connected. CSI should start appearing.");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthThreshold;
    use crate::error::Error;
    use enumset::EnumSet;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::string::{String, ToString};
    use std::sync::Once;
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Runtime,
        EventLoop,
        StationInterface,
        Radio(RadioTuning),
        Subscribe(EnumSet<EventClass>),
        Mode(WifiMode),
        Config(String),
        Start,
        Connect,
    }

    #[derive(Default)]
    struct MockStack {
        calls: Vec<Call>,
        fail_radio: bool,
        fail_connect: bool,
        events: VecDeque<NetEvent>,
    }

    impl MockStack {
        fn connects(&self) -> usize {
            self.calls.iter().filter(|c| **c == Call::Connect).count()
        }
    }

    impl NetworkStack for MockStack {
        fn initialize_network_runtime(&mut self) -> Result<()> {
            self.calls.push(Call::Runtime);
            Ok(())
        }

        fn create_default_event_loop(&mut self) -> Result<()> {
            self.calls.push(Call::EventLoop);
            Ok(())
        }

        fn create_default_station_interface(&mut self) -> Result<()> {
            self.calls.push(Call::StationInterface);
            Ok(())
        }

        fn initialize_radio(&mut self, tuning: &RadioTuning) -> Result<()> {
            self.calls.push(Call::Radio(*tuning));
            if self.fail_radio {
                return Err(Error::SystemError("radio init failed"));
            }
            Ok(())
        }

        fn subscribe(&mut self, classes: EnumSet<EventClass>) -> Result<()> {
            self.calls.push(Call::Subscribe(classes));
            Ok(())
        }

        fn set_mode(&mut self, mode: WifiMode) -> Result<()> {
            self.calls.push(Call::Mode(mode));
            Ok(())
        }

        fn apply_config(&mut self, config: &ConnectionConfig) -> Result<()> {
            self.calls.push(Call::Config(config.ssid().to_string()));
            Ok(())
        }

        fn start(&mut self) -> Result<()> {
            self.calls.push(Call::Start);
            Ok(())
        }

        fn connect(&mut self) -> Result<()> {
            self.calls.push(Call::Connect);
            if self.fail_connect {
                return Err(Error::SystemError("association refused"));
            }
            Ok(())
        }
    }

    impl EventSource for MockStack {
        async fn next_event(&mut self) -> Result<NetEvent> {
            self.events
                .pop_front()
                .ok_or(Error::SystemError("event source drained"))
        }
    }

    struct NeverReconnect;

    impl ReconnectPolicy for NeverReconnect {
        fn should_reconnect(&mut self) -> bool {
            false
        }
    }

    struct CaptureLogger;

    std::thread_local! {
        static RECORDS: RefCell<Vec<(log::Level, String)>> = RefCell::new(Vec::new());
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, _metadata: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            RECORDS.with(|r| {
                r.borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }

        fn flush(&self) {}
    }

    static LOGGER: CaptureLogger = CaptureLogger;

    fn capture_logs() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            log::set_logger(&LOGGER).unwrap();
            log::set_max_level(log::LevelFilter::Trace);
        });
        RECORDS.with(|r| r.borrow_mut().clear());
    }

    fn take_logs() -> Vec<(log::Level, String)> {
        RECORDS.with(|r| r.borrow_mut().drain(..).collect())
    }

    fn supervisor() -> ConnectionSupervisor<MockStack> {
        let config = ConnectionConfig::new("lab-ap", "hunter22", AuthThreshold::Wpa2Personal).unwrap();
        ConnectionSupervisor::new(config, MockStack::default())
    }

    #[test]
    fn initialize_brings_up_stack_in_order() {
        let mut sup = supervisor();
        sup.initialize().unwrap();
        assert_eq!(
            sup.stack().calls,
            [
                Call::Runtime,
                Call::EventLoop,
                Call::StationInterface,
                Call::Radio(RadioTuning::default()),
                Call::Subscribe(EventClass::Link | EventClass::Ip),
                Call::Mode(WifiMode::Station),
                Call::Config("lab-ap".to_string()),
                Call::Start,
            ]
        );
    }

    #[test]
    fn initialize_does_not_connect_by_itself() {
        let mut sup = supervisor();
        sup.initialize().unwrap();
        assert_eq!(sup.stack().connects(), 0);
    }

    #[test]
    fn initialize_stops_at_first_failure() {
        let mut sup = supervisor();
        sup.stack_mut().fail_radio = true;
        assert!(matches!(sup.initialize(), Err(Error::SystemError(_))));
        assert_eq!(sup.stack().calls.last(), Some(&Call::Radio(RadioTuning::default())));
        assert!(!sup.stack().calls.contains(&Call::Start));
    }

    #[test]
    fn station_started_issues_one_connect() {
        let mut sup = supervisor();
        sup.handle(LinkEvent::StaStarted.into());
        assert_eq!(sup.stack().calls, [Call::Connect]);
    }

    #[test]
    fn disconnect_reconnects_and_logs() {
        capture_logs();
        let mut sup = supervisor();
        sup.handle(LinkEvent::StaDisconnected.into());
        assert_eq!(sup.stack().calls, [Call::Connect]);
        assert_eq!(
            take_logs(),
            [(log::Level::Info, "Retrying WiFi connection...".to_string())]
        );
    }

    #[test]
    fn address_assigned_logs_without_connecting() {
        capture_logs();
        let mut sup = supervisor();
        sup.handle(IpEvent::AddressAssigned.into());
        assert_eq!(sup.stack().connects(), 0);
        assert_eq!(
            take_logs(),
            [(
                log::Level::Info,
                "WiFi connected. CSI should start appearing.".to_string()
            )]
        );
    }

    #[test]
    fn other_link_events_are_ignored() {
        capture_logs();
        let mut sup = supervisor();
        sup.handle(LinkEvent::StaConnected.into());
        sup.handle(LinkEvent::StaStopped.into());
        assert!(sup.stack().calls.is_empty());
        assert!(take_logs().is_empty());
    }

    #[test]
    fn one_connect_per_lifecycle_event() {
        // Every sequence of up to eight started/disconnected events.
        for len in 0..=8u32 {
            for bits in 0..(1u32 << len) {
                let mut sup = supervisor();
                for i in 0..len {
                    let event = if bits & (1 << i) == 0 {
                        LinkEvent::StaStarted
                    } else {
                        LinkEvent::StaDisconnected
                    };
                    sup.handle(event.into());
                    assert_eq!(sup.stack().connects(), i as usize + 1);
                }
                assert_eq!(sup.stack().calls.len(), len as usize);
            }
        }
    }

    #[test]
    fn failed_connect_is_logged_and_not_retried() {
        capture_logs();
        let mut sup = supervisor();
        sup.stack_mut().fail_connect = true;
        sup.handle(LinkEvent::StaStarted.into());
        assert_eq!(sup.stack().connects(), 1);
        let logs = take_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].0, log::Level::Warn);
        assert!(logs[0].1.contains("association refused"));
    }

    #[test]
    fn policy_can_withhold_reconnect() {
        capture_logs();
        let config = ConnectionConfig::new("lab-ap", "hunter22", AuthThreshold::Wpa2Personal).unwrap();
        let mut sup = ConnectionSupervisor::with_policy(config, MockStack::default(), NeverReconnect);
        sup.handle(LinkEvent::StaDisconnected.into());
        assert_eq!(sup.stack().connects(), 0);
        assert_eq!(take_logs().len(), 1);
        // Station start still connects regardless of the disconnect policy.
        sup.handle(LinkEvent::StaStarted.into());
        assert_eq!(sup.stack().connects(), 1);
    }

    #[test]
    fn run_dispatches_until_source_fails() {
        let mut sup = supervisor();
        sup.stack_mut().events.extend([
            NetEvent::Link(LinkEvent::StaStarted),
            NetEvent::Link(LinkEvent::StaConnected),
            NetEvent::Ip(IpEvent::AddressAssigned),
            NetEvent::Link(LinkEvent::StaDisconnected),
            NetEvent::Link(LinkEvent::StaStarted),
        ]);
        let result = embassy_futures::block_on(sup.run());
        assert!(matches!(result, Err(Error::SystemError("event source drained"))));
        assert_eq!(sup.stack().connects(), 3);
    }
}
