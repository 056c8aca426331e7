//! Top-level handle: owns the session, controller, and OD registry, and exposes
//! discovery and iteration as the two operations an embedder needs.

use std::net::{IpAddr, SocketAddr};

use crate::container::Container;
use crate::controller::Controller;
use crate::discovery::{Discovery, OdRegistry};
use crate::error::Error;
use crate::iteration::Iteration;
use crate::session::{Session, GATEWAY_PORT};

/// A client for one Mailbox Gateway endpoint.
///
/// Owns the [`Controller`] (and through it, the [`Session`]) and the [`OdRegistry`]
/// populated by [`Client::discover`]. A single `Client` drives at most one request at a
/// time, matching the protocol's single-in-flight session model.
pub struct Client {
    controller: Controller,
    registry: OdRegistry,
}

impl Client {
    /// Build a client targeting `host` on the default Mailbox Gateway port ([`GATEWAY_PORT`]).
    pub fn new(host: IpAddr) -> Self {
        Self::with_port(host, GATEWAY_PORT)
    }

    /// Build a client targeting `host:port`.
    pub fn with_port(host: IpAddr, port: u16) -> Self {
        let session = Session::new(SocketAddr::new(host, port));

        Self {
            controller: Controller::new(session),
            registry: OdRegistry::default(),
        }
    }

    /// Walk the server's Object Dictionary, populating the registry this client holds.
    /// Re-running this rebuilds the registry from scratch.
    pub async fn discover(&mut self) -> Result<(), Error> {
        let registry = Discovery::new().run(&mut self.controller).await?;

        info!("discovery complete: {} indices registered", registry.indices().count());

        self.registry = registry;

        Ok(())
    }

    /// The registry populated by the last [`Client::discover`] call.
    pub fn registry(&self) -> &OdRegistry {
        &self.registry
    }

    /// Build a cursor walking `indices` via repeated SDO Uploads. Fails eagerly if any
    /// index was not found during discovery.
    pub fn watch(&self, indices: Vec<u16>) -> Result<Iteration, Error> {
        Iteration::new(&self.registry, indices)
    }

    /// Advance a cursor previously built with [`Client::watch`].
    pub async fn advance(
        &mut self,
        cursor: &mut Iteration,
    ) -> Option<Result<(u16, Container), Error>> {
        cursor.next(&self.registry, &mut self.controller).await
    }

    /// One-shot fetch of a single already-discovered index.
    pub async fn get(&mut self, index: u16) -> Result<Container, Error> {
        crate::iteration::get(&self.registry, &mut self.controller, index).await
    }

    /// Number of request/response round trips this client's controller has completed.
    pub fn requests_sent(&self) -> u64 {
        self.controller.requests_sent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_rejects_unknown_index() {
        let client = Client::new("127.0.0.1".parse().unwrap());

        let result = client.watch(vec![0x1000]);

        assert!(matches!(result, Err(Error::UnknownIndex(0x1000))));
    }
}
