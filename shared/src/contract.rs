use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::EndpointError;

/// One side of a synchronized object graph: consumes the peer's inbound
/// message, performs its owned per-tick side effects, and produces the next
/// outbound message.
///
/// The inbound/outbound pairing is a type-level association: a server-side
/// wrapper is `Inbound = Request, Outbound = Snapshot`, a client-side mirror
/// is the dual. The streaming services are generic over this trait and never
/// inspect message internals.
#[async_trait]
pub trait RemoteEndpoint: Send {
    type Inbound: DeserializeOwned + Send;
    type Outbound: Serialize + Send;

    /// Absorbs one inbound message. Invalid sub-requests (failed action
    /// validation, retired handles) are dropped silently; only transport or
    /// codec level failures escalate, and those are handled by the service
    /// before this is called.
    fn depack(&mut self, inbound: Self::Inbound);

    /// Performs this endpoint's owned side effects for the current tick —
    /// applying pending actions, pulling observations, awaiting the step
    /// barrier. Runs before `pack`.
    async fn tick(&mut self) -> Result<(), EndpointError>;

    /// Composes the next outbound message.
    fn pack(&mut self) -> Self::Outbound;

    /// Whether this endpoint has reached the end of its lifecycle and its
    /// session should be torn down after the current cycle.
    fn is_closed(&self) -> bool {
        false
    }
}
