use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};

use super::protocol::Message;

/// What the session needs from the wire: fire-and-forget send, a drained
/// inbox, and a closed-or-not signal. How bytes actually move (relay TCP,
/// websocket, in-memory) is somebody else's problem.
pub trait Transport {
    fn send(&mut self, msg: &Message);

    /// Drain everything that arrived since the last poll. Malformed frames
    /// are dropped here, silently.
    fn poll(&mut self) -> Vec<Message>;

    fn is_open(&self) -> bool;
}

/// A transport endpoint wired to a [`LocalRelay`]. Used by tests and the
/// headless demo; behaves like one relay client.
pub struct ChannelTransport {
    outbox: Sender<String>,
    inbox: Receiver<String>,
    open: bool,
}

impl Transport for ChannelTransport {
    fn send(&mut self, msg: &Message) {
        let Ok(raw) = msg.encode() else {
            return;
        };
        if self.outbox.send(raw).is_err() {
            self.open = false;
        }
    }

    fn poll(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        loop {
            match self.inbox.try_recv() {
                Ok(raw) => match Message::decode(&raw) {
                    Ok(msg) => messages.push(msg),
                    Err(err) => log::debug!("dropping malformed frame: {err}"),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.open = false;
                    break;
                }
            }
        }
        messages
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

struct RelayPort {
    from_peer: Receiver<String>,
    to_peer: Sender<String>,
}

/// In-process stand-in for the relay server: every frame a peer sends is
/// forwarded verbatim to every other peer, never echoed back.
#[derive(Default)]
pub struct LocalRelay {
    ports: Vec<RelayPort>,
}

impl LocalRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(&mut self) -> ChannelTransport {
        let (peer_out, relay_in) = channel();
        let (relay_out, peer_in) = channel();
        self.ports.push(RelayPort {
            from_peer: relay_in,
            to_peer: relay_out,
        });
        ChannelTransport {
            outbox: peer_out,
            inbox: peer_in,
            open: true,
        }
    }

    /// Forward all pending frames. Call between session ticks.
    pub fn pump(&mut self) {
        for i in 0..self.ports.len() {
            loop {
                let raw = match self.ports[i].from_peer.try_recv() {
                    Ok(raw) => raw,
                    Err(_) => break,
                };
                for (j, port) in self.ports.iter().enumerate() {
                    if j != i {
                        let _ = port.to_peer.send(raw.clone());
                    }
                }
            }
        }
    }

    /// Drop a peer's link, as a relay would on disconnect.
    pub fn close_endpoint(&mut self, index: usize) {
        if index < self.ports.len() {
            self.ports.remove(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_broadcasts_to_everyone_but_the_sender() {
        let mut relay = LocalRelay::new();
        let mut a = relay.endpoint();
        let mut b = relay.endpoint();
        let mut c = relay.endpoint();

        a.send(&Message::StartGame);
        relay.pump();

        assert!(a.poll().is_empty());
        assert_eq!(b.poll(), vec![Message::StartGame]);
        assert_eq!(c.poll(), vec![Message::StartGame]);
    }

    #[test]
    fn closed_relay_is_observable() {
        let mut relay = LocalRelay::new();
        let mut a = relay.endpoint();
        drop(relay);

        assert!(a.poll().is_empty());
        assert!(!a.is_open());
    }

    #[test]
    fn closing_one_endpoint_keeps_the_rest_alive() {
        let mut relay = LocalRelay::new();
        let mut a = relay.endpoint();
        let mut b = relay.endpoint();

        relay.close_endpoint(1);
        assert!(b.poll().is_empty());
        assert!(!b.is_open());

        a.send(&Message::StartGame);
        relay.pump();
        assert!(a.is_open());
    }
}
