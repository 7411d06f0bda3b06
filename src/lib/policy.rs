/// Decides what the supervisor does after the station loses its access point.
pub trait ReconnectPolicy {
    /// Called once per disconnect. Returning `true` issues a connect request right away.
    fn should_reconnect(&mut self) -> bool;
}

/// Reconnects immediately after every disconnect, forever.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImmediateReconnect;

impl ReconnectPolicy for ImmediateReconnect {
    fn should_reconnect(&mut self) -> bool {
        true
    }
}
