pub mod protocol;
pub mod reconciler;
pub mod transport;

pub use protocol::{EntitySnapshot, Message, ProtocolError, RosterEntry, TICK_RATE};
pub use reconciler::BROADCAST_INTERVAL_TICKS;
pub use transport::{ChannelTransport, LocalRelay, Transport};
