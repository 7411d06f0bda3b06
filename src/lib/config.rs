//! Immutable configuration records handed to the station at startup.

use heapless::String;

use crate::error::{Error, Result};

/// Longest SSID accepted by 802.11.
pub const MAX_SSID_LEN: usize = 32;
/// Longest WPA passphrase accepted by the driver.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Weakest authentication method the station will accept from an access point.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuthThreshold {
    /// Open network, no authentication.
    Open,
    /// WEP
    Wep,
    /// WPA-PSK
    Wpa,
    /// WPA2-PSK
    #[default]
    Wpa2Personal,
    /// WPA/WPA2 mixed mode
    WpaWpa2Personal,
    /// WPA3-SAE
    Wpa3Personal,
    /// WPA2/WPA3 transition mode
    Wpa2Wpa3Personal,
}

/// Operating mode of the radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiMode {
    /// Client associating to an access point.
    Station,
}

/// Access point credentials the station connects with.
///
/// Built once at startup and owned by the [`ConnectionSupervisor`](crate::ConnectionSupervisor)
/// for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    ssid: String<MAX_SSID_LEN>,
    password: String<MAX_PASSWORD_LEN>,
    auth_threshold: AuthThreshold,
}

impl ConnectionConfig {
    /// Creates a connection configuration.
    ///
    /// Fails if `ssid` is empty or longer than 32 bytes, or if `password` is longer than 64 bytes.
    pub fn new(ssid: &str, password: &str, auth_threshold: AuthThreshold) -> Result<Self> {
        if ssid.is_empty() {
            return Err(Error::ConfigError("SSID must not be empty"));
        }
        let mut ssid_buf = String::new();
        ssid_buf
            .push_str(ssid)
            .map_err(|_| Error::ConfigError("SSID longer than 32 bytes"))?;
        let mut password_buf = String::new();
        password_buf
            .push_str(password)
            .map_err(|_| Error::ConfigError("Password longer than 64 bytes"))?;
        Ok(Self {
            ssid: ssid_buf,
            password: password_buf,
            auth_threshold,
        })
    }

    pub fn ssid(&self) -> &str {
        self.ssid.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn auth_threshold(&self) -> AuthThreshold {
        self.auth_threshold
    }
}

/// Selects which training-field components the radio folds into each CSI sample.
///
/// Applied once before capture is enabled and governs every sample delivered afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CsiCaptureConfig {
    /// Legacy long training field.
    pub lltf_enabled: bool,
    /// High throughput long training field.
    pub htltf_enabled: bool,
    /// Space time block coding HT-LTF2.
    pub stbc_htltf2_enabled: bool,
    /// Generate a single LTF by merging LLTF and HT-LTF (HT packets only).
    pub ltf_merge_enabled: bool,
    /// Smooth adjacent subcarriers. Disabled means every subcarrier is reported independently.
    pub channel_filter_enabled: bool,
    /// Use `shift` for scaling instead of the driver's automatic scaling.
    pub manu_scale: bool,
    /// Left shift applied when `manu_scale` is set.
    pub shift: bool,
    /// Capture CSI from ACK frames as well.
    pub dump_ack_en: bool,
}

impl Default for CsiCaptureConfig {
    fn default() -> Self {
        Self {
            lltf_enabled: true,
            htltf_enabled: true,
            stbc_htltf2_enabled: true,
            ltf_merge_enabled: true,
            channel_filter_enabled: false,
            manu_scale: false,
            shift: false,
            dump_ack_en: false,
        }
    }
}

/// Radio power saving behaviour.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerSave {
    /// Radio stays awake; every frame can produce CSI.
    #[default]
    None,
    /// Modem sleep between DTIM beacons.
    Minimum,
    /// Modem sleep for the listen interval.
    Maximum,
}

/// Tuning handed to the radio during initialization.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioTuning {
    pub power_save: PowerSave,
}
