//! # Station-mode CSI capture for ESP devices
//! ## Overview
//! This crate turns an ESP device into a WiFi station that streams raw Channel State Information (CSI) to the serial console.
//! The station connects to a configured access point, keeps reconnecting whenever the link drops, and prints every CSI sample the radio captures as one text line.
//! Currently this crate supports only the ESP `no-std` development framework.
//!
//! ### Choosing a device
//! The device must support WiFi and CSI collection. Currently supported devices include:
//! - ESP32
//! - ESP32-C2
//! - ESP32-C3
//! - ESP32-S3
//!
//! Select exactly one device through the crate features. Without a device feature only the hardware independent core (configuration, connection supervisor, capture emitter) is compiled, which is how the host test suite runs.
//!
//! ## Feature Flags
#![doc = document_features::document_features!()]
//! ## How it works
//! Two components react to notifications from the WiFi driver:
//!
//! - [`ConnectionSupervisor`] brings the station interface up and keeps it associated. A started station gets a connect request, a disconnect triggers an immediate reconnect (governed by a [`ReconnectPolicy`], [`ImmediateReconnect`] by default) and an assigned IP address is logged.
//! - [`CaptureEmitter`] receives each CSI buffer from the driver and writes it as one line.
//!
//! Both talk to the driver through traits ([`NetworkStack`], [`EventSource`], [`CaptureRadio`]). On hardware these are implemented by `EspStation` on top of `esp-wifi` and `embassy-net`.
//!
//! ### Output Format
//! Every captured sample produces exactly one line on the console:
//!
//! `CSI_DATA: <v0> <v1> ... <vn>`
//!
//! where each value is the signed decimal of one raw CSI byte. A sample with no data prints `CSI_DATA: ` followed by the newline.
//! Diagnostics (connection retries, IP acquisition) are interleaved as regular log lines, so host tooling should only consider lines starting with `CSI_DATA: `.
//!
//! ### Example
//!```rust, ignore
//!let config = ConnectionConfig::new(SSID, PASSWORD, AuthThreshold::Wpa2Personal).unwrap();
//!let station = EspStation::new(wifi_init, peripherals.WIFI, spawner, seed);
//!let mut supervisor = ConnectionSupervisor::new(config, station);
//!
//!// Bring the stack up and start the radio
//!supervisor.initialize().unwrap();
//!
//!// Route CSI samples to the console and arm capture
//!register(
//!    supervisor.stack_mut(),
//!    &CsiCaptureConfig::default(),
//!    CaptureEmitter::new(esp_println::Printer),
//!)
//!.unwrap();
//!supervisor.stack_mut().set_capture_enabled(true).unwrap();
//!
//!// Handle connection events forever
//!supervisor.run().await.unwrap();
//!```

#![cfg_attr(not(test), no_std)]

pub mod capture;
pub mod config;
pub mod error;
pub mod event;
pub mod policy;
pub mod stack;
#[cfg(feature = "hw")]
pub mod station;
mod supervisor;

pub use crate::capture::{register, CaptureEmitter, CaptureRadio, CsiSample};
pub use crate::config::{AuthThreshold, ConnectionConfig, CsiCaptureConfig, RadioTuning};
pub use crate::error::{Error, Result};
pub use crate::event::{EventClass, EventHandler, IpEvent, LinkEvent, NetEvent};
pub use crate::policy::{ImmediateReconnect, ReconnectPolicy};
pub use crate::stack::{EventSource, NetworkStack};
#[cfg(feature = "hw")]
pub use crate::station::EspStation;
pub use crate::supervisor::ConnectionSupervisor;
