use std::collections::{HashMap, HashSet};

use futures::future::join_all;
use log::{debug, warn};

use simlink_shared::{
    decode_frame, encode_frame, MessageSender, RemoteEndpoint, SessionKey, TransportError,
};

struct SessionEntry<E> {
    endpoint: E,
    sender: Box<dyn MessageSender>,
}

/// Drives one endpoint per connected session through the per-cycle exchange:
/// inbound frames are depacked as they arrive, then once per service tick
/// every dirty session runs its side effects and receives a fresh snapshot.
///
/// Sessions are isolated failure domains: a decode failure, tick failure or
/// send failure disconnects the offending session and nothing else.
pub struct StreamingService<E: RemoteEndpoint> {
    sessions: HashMap<SessionKey, SessionEntry<E>>,
    dirty: HashSet<SessionKey>,
    next_key: u64,
}

impl<E: RemoteEndpoint> Default for StreamingService<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RemoteEndpoint> StreamingService<E> {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            dirty: HashSet::new(),
            next_key: 0,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_connected(&self, key: SessionKey) -> bool {
        self.sessions.contains_key(&key)
    }

    /// Registers a freshly connected session. It is marked dirty so the
    /// next cycle pushes it a full initial snapshot without waiting for an
    /// inbound request.
    pub fn session_connected(&mut self, endpoint: E, sender: Box<dyn MessageSender>) -> SessionKey {
        let key = SessionKey(self.next_key);
        self.next_key += 1;
        self.sessions.insert(key, SessionEntry { endpoint, sender });
        self.dirty.insert(key);
        debug!("Session {} connected ({} live)", key, self.sessions.len());
        key
    }

    /// Tears one session down, closing its transport and dropping its
    /// endpoint (which releases whatever the endpoint owned).
    pub async fn session_disconnected(&mut self, key: SessionKey) {
        self.dirty.remove(&key);
        if let Some(mut entry) = self.sessions.remove(&key) {
            entry.sender.close().await;
            debug!(
                "Session {} disconnected ({} live)",
                key,
                self.sessions.len()
            );
        }
    }

    /// Absorbs one inbound frame for `key`. A frame that fails to decode
    /// disconnects that session immediately; a decodable frame is depacked
    /// and marks the session as owing a response this cycle.
    pub async fn message_received(&mut self, key: SessionKey, frame: &[u8]) {
        let Some(entry) = self.sessions.get_mut(&key) else {
            return;
        };
        match decode_frame::<E::Inbound>(frame) {
            Ok(inbound) => {
                entry.endpoint.depack(inbound);
                self.dirty.insert(key);
            }
            Err(err) => {
                warn!("Disconnecting {}: {}", key, err);
                self.session_disconnected(key).await;
            }
        }
    }

    /// Runs one service cycle: every dirty session's `tick()` concurrently,
    /// then pack-and-send concurrently, then clears dirty flags.
    pub async fn tick(&mut self) {
        let mut failed: Vec<SessionKey> = Vec::new();

        {
            let dirty = &self.dirty;
            let ticks = self
                .sessions
                .iter_mut()
                .filter(|(key, _)| dirty.contains(key))
                .map(|(key, entry)| {
                    let key = *key;
                    async move { (key, entry.endpoint.tick().await) }
                });
            for (key, result) in join_all(ticks).await {
                if let Err(err) = result {
                    warn!("Session {} tick failed: {}", key, err);
                    failed.push(key);
                }
            }
        }
        for key in failed.drain(..) {
            self.session_disconnected(key).await;
        }

        {
            let dirty = &self.dirty;
            let sends = self
                .sessions
                .iter_mut()
                .filter(|(key, _)| dirty.contains(key))
                .map(|(key, entry)| {
                    let key = *key;
                    let frame = encode_frame(&entry.endpoint.pack());
                    let closing = entry.endpoint.is_closed();
                    let sender = &mut entry.sender;
                    async move {
                        let result = match frame {
                            Ok(frame) => sender.send(frame).await,
                            Err(err) => Err(TransportError::Io(err.to_string())),
                        };
                        (key, closing, result)
                    }
                });
            for (key, closing, result) in join_all(sends).await {
                if let Err(err) = result {
                    warn!("Session {} send failed: {}", key, err);
                    failed.push(key);
                } else if closing {
                    // final snapshot delivered; the endpoint asked to end
                    failed.push(key);
                }
            }
        }
        for key in failed {
            self.session_disconnected(key).await;
        }

        self.dirty.clear();
    }
}
