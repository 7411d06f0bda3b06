//! Boundary to the vendor network stack.
//!
//! The station never talks to the radio directly. Everything it needs from the
//! driver goes through [`NetworkStack`] and [`EventSource`], which keeps the
//! connection logic testable off target.

use enumset::EnumSet;

use crate::config::{ConnectionConfig, RadioTuning, WifiMode};
use crate::error::Result;
use crate::event::{EventClass, NetEvent};

/// Bring-up and connection primitives of the network stack.
pub trait NetworkStack {
    /// Prepares the network interface runtime.
    fn initialize_network_runtime(&mut self) -> Result<()>;

    /// Creates the loop that queues lifecycle events for dispatch.
    fn create_default_event_loop(&mut self) -> Result<()>;

    /// Creates the station network interface.
    fn create_default_station_interface(&mut self) -> Result<()>;

    /// Initializes the radio with the given tuning.
    fn initialize_radio(&mut self, tuning: &RadioTuning) -> Result<()>;

    /// Starts delivering events of the given classes through [`EventSource`].
    fn subscribe(&mut self, classes: EnumSet<EventClass>) -> Result<()>;

    fn set_mode(&mut self, mode: WifiMode) -> Result<()>;

    fn apply_config(&mut self, config: &ConnectionConfig) -> Result<()>;

    /// Starts the radio. The stack reports [`LinkEvent::StaStarted`](crate::LinkEvent::StaStarted) once it is up.
    fn start(&mut self) -> Result<()>;

    /// Requests association with the configured access point.
    fn connect(&mut self) -> Result<()>;
}

/// Asynchronous source of subscribed events.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    /// Waits for the next subscribed event.
    ///
    /// An error means the source can no longer deliver events.
    async fn next_event(&mut self) -> Result<NetEvent>;
}
