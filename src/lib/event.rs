//! Lifecycle notifications delivered by the network stack.

use enumset::EnumSetType;

/// Family an event belongs to. Subscriptions are made per class.
#[derive(Debug, EnumSetType)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventClass {
    /// WiFi link layer events.
    Link,
    /// IP layer events.
    Ip,
}

/// Station link layer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    StaStarted,
    StaStopped,
    StaConnected,
    StaDisconnected,
}

/// IP layer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IpEvent {
    /// The station interface obtained an address.
    AddressAssigned,
}

/// Event delivered to an [`EventHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetEvent {
    Link(LinkEvent),
    Ip(IpEvent),
}

impl NetEvent {
    pub fn class(&self) -> EventClass {
        match self {
            NetEvent::Link(_) => EventClass::Link,
            NetEvent::Ip(_) => EventClass::Ip,
        }
    }
}

impl From<LinkEvent> for NetEvent {
    fn from(event: LinkEvent) -> Self {
        NetEvent::Link(event)
    }
}

impl From<IpEvent> for NetEvent {
    fn from(event: IpEvent) -> Self {
        NetEvent::Ip(event)
    }
}

/// Receiver of network events.
///
/// The dispatcher never calls `handle` concurrently with itself.
pub trait EventHandler {
    fn handle(&mut self, event: NetEvent);
}
