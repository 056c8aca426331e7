//! A client library for the ETG.1510 diagnostic profile: discovers an EtherCAT
//! main-device's CANopen-over-EtherCAT (CoE) Object Dictionary through a Mailbox
//! Gateway over UDP, and reads configuration, information, and diagnosis objects via
//! SDO Upload.
//!
//! ```no_run
//! # async fn run() -> Result<(), etg1510::error::Error> {
//! let mut client = etg1510::Client::new("192.168.0.10".parse().unwrap());
//!
//! client.discover().await?;
//!
//! for index in client.registry().indices().collect::<Vec<_>>() {
//!     let container = client.get(index).await?;
//!     println!("{index:#06x}: {} entries", container.entries.len());
//! }
//! # Ok(())
//! # }
//! ```

// This mod MUST go first, so the rest of the crate sees its macros.
pub(crate) mod log;

mod catalogue;
mod client;
mod coe;
mod config;
mod container;
mod controller;
mod discovery;
pub mod error;
mod ethercat;
mod iteration;
mod mailbox;
mod session;
mod templates;
mod value;

pub use catalogue::{Kind, MappingMember as CatalogueEntry, Metadata};
pub use client::Client;
pub use coe::CoeAbortCode;
pub use config::{ConfigError, Settings};
pub use container::{Container, DescriptorPiece, Entry, FormatCode};
pub use discovery::{Discovery, OdRegistry};
pub use iteration::Iteration;
pub use session::{Session, GATEWAY_PORT};
pub use value::Value;
