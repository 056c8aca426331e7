//! Walks the server's Object Dictionary via the SDO Information Service and populates
//! an [`OdRegistry`] with freshly instantiated, name-and-shape-annotated containers.

use std::collections::HashMap;

use crate::catalogue::{self, MappingMember, Metadata};
use crate::coe::SubIndex;
use crate::container::Container;
use crate::controller::{Controller, InfoRequest};
use crate::error::Error;
use crate::templates;
use crate::value::Value;

/// Owns the live containers and metadata populated by discovery, keyed by OD index.
///
/// Created once per session; re-running [`Discovery::run`] rebuilds it from scratch.
#[derive(Debug, Default)]
pub struct OdRegistry {
    containers: HashMap<u16, Container>,
    metadata: HashMap<u16, Metadata>,
}

impl OdRegistry {
    /// The container discovered at `index`, if any.
    pub fn get(&self, index: u16) -> Option<&Container> {
        self.containers.get(&index)
    }

    /// The metadata discovered for `index`, if any.
    pub fn metadata(&self, index: u16) -> Option<&Metadata> {
        self.metadata.get(&index)
    }

    /// Every index currently registered, in no particular order.
    pub fn indices(&self) -> impl Iterator<Item = u16> + '_ {
        self.containers.keys().copied()
    }

    pub(crate) fn insert(&mut self, index: u16, container: Container, metadata: Metadata) {
        self.containers.insert(index, container);
        self.metadata.insert(index, metadata);
    }
}

/// Drives the OD-List -> Object-Description -> Entry-Description walk described in the
/// CoE/SDO Information Service.
pub struct Discovery {
    catalogue: Vec<MappingMember>,
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new()
    }
}

impl Discovery {
    /// Build a discovery driver using the static OD catalogue.
    pub fn new() -> Self {
        Self {
            catalogue: catalogue::catalogue(),
        }
    }

    /// Run the full discovery walk, returning a freshly populated registry.
    ///
    /// A failure discovering one index (unknown kind, a transport error walking its
    /// description or entries) is logged and that index is skipped; it never corrupts
    /// indices already registered.
    pub async fn run(&self, controller: &mut Controller) -> Result<OdRegistry, Error> {
        let mut registry = OdRegistry::default();

        let indices = self.fetch_od_list(controller).await?;

        for index in indices {
            if let Err(err) = self.discover_index(controller, index, &mut registry).await {
                warn!("discovery of index {:#06x} failed: {}", index, err);
            }
        }

        Ok(registry)
    }

    async fn fetch_od_list(&self, controller: &mut Controller) -> Result<Vec<u16>, Error> {
        let reply = controller
            .info(InfoRequest::OdList, templates::od_list(0))
            .await?;

        let indices = match reply.get_by_subindex(1).map(|e| &e.value) {
            Some(Value::Seq(values)) => values
                .iter()
                .filter_map(Value::as_u32)
                .map(|v| v as u16)
                .collect(),
            Some(Value::U16(single)) => vec![*single],
            _ => Vec::new(),
        };

        debug!("OD-List reports {} indices", indices.len());

        Ok(indices)
    }

    async fn discover_index(
        &self,
        controller: &mut Controller,
        index: u16,
        registry: &mut OdRegistry,
    ) -> Result<(), Error> {
        let Some(member) = catalogue::lookup(&self.catalogue, index) else {
            debug!("index {:#06x} has no catalogue entry, skipping", index);
            return Ok(());
        };

        let mut metadata = member.metadata.clone();
        metadata.index = index;

        let mut container = templates::for_kind(metadata.kind);

        if let Ok(description) = controller
            .info(InfoRequest::Description(index), templates::object_description())
            .await
        {
            metadata.max_sub_index = description
                .get_by_subindex(0)
                .and_then(|e| e.value.as_u32())
                .map(|v| v as u8)
                .unwrap_or(0);
        } else {
            metadata.max_sub_index = 0;
        }

        let sub_indices: Vec<u8> = container.entries.iter().map(|e| e.sub_index).collect();

        for sub_index in sub_indices {
            match controller
                .info(
                    InfoRequest::Entry(index, sub_index),
                    templates::entry_description(),
                )
                .await
            {
                Ok(entry_reply) => apply_entry_description(&mut container, sub_index, &entry_reply),
                Err(Error::SdoInfoError(abort)) => {
                    debug!(
                        "entry {:#06x}:{} aborted ({}), leaving disabled",
                        index, sub_index, abort
                    );
                    if let Some(entry) = container.get_by_subindex(sub_index) {
                        let mut disabled = entry.clone();
                        disabled.enable = false;
                        container.set_by_subindex(sub_index, disabled);
                    }
                }
                Err(err) => return Err(err),
            }
        }

        registry.insert(index, container, metadata);

        Ok(())
    }
}

fn apply_entry_description(container: &mut Container, sub_index: u8, reply: &Container) {
    let Some(existing) = container.get_by_subindex(sub_index) else {
        return;
    };

    let name = reply
        .get_by_subindex(1)
        .and_then(|e| e.value.as_str())
        .unwrap_or_default()
        .to_string();

    let bit_length = reply
        .get_by_subindex(0)
        .and_then(|e| e.value.as_u32())
        .unwrap_or(0);

    let mut updated = existing.clone();
    updated.name = name;
    updated.enable = true;

    if !matches!(existing.value, Value::Seq(_)) {
        updated.size = (bit_length / 8) as usize;
    }

    container.set_by_subindex(sub_index, updated);
}
