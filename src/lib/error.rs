use core::fmt;

/// Crate wide result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while bringing up the station or arming CSI capture.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A configuration value was rejected before reaching the radio.
    ConfigError(&'static str),
    /// A bring-up step was called out of order or a platform resource was unavailable.
    SystemError(&'static str),
    /// The WiFi driver refused a request.
    #[cfg(feature = "hw")]
    WifiError(esp_wifi::wifi::WifiError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
            Error::SystemError(msg) => write!(f, "system error: {}", msg),
            #[cfg(feature = "hw")]
            Error::WifiError(e) => write!(f, "wifi driver error: {:?}", e),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(feature = "hw")]
impl From<esp_wifi::wifi::WifiError> for Error {
    fn from(e: esp_wifi::wifi::WifiError) -> Self {
        Error::WifiError(e)
    }
}
