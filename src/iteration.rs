//! A pull-style cursor that repeatedly fetches SDO Upload data for a fixed set of
//! discovered indices.

use crate::catalogue::Metadata;
use crate::coe::SubIndex;
use crate::container::Container;
use crate::controller::Controller;
use crate::discovery::OdRegistry;
use crate::error::Error;

/// Walks a fixed watch-list of indices against an already-populated [`OdRegistry`],
/// issuing one SDO Upload per index through the [`Controller`] and yielding
/// `(index, container)` pairs in list order.
///
/// [`Iteration::next`] returns `None` once every watched index has been yielded for this
/// pass; calling it again restarts from the first element, matching the protocol's
/// "ordinary `None`, not an exception" framing of end-of-stream.
pub struct Iteration {
    watch_list: Vec<u16>,
    position: usize,
}

impl Iteration {
    /// Build a cursor over `watch_list`. Fails eagerly with [`Error::UnknownIndex`] if
    /// any watched index was not found during discovery.
    pub fn new(registry: &OdRegistry, watch_list: Vec<u16>) -> Result<Self, Error> {
        for &index in &watch_list {
            if registry.get(index).is_none() {
                return Err(Error::UnknownIndex(index));
            }
        }

        Ok(Self {
            watch_list,
            position: 0,
        })
    }

    /// Fetch the next watched index's data, or `None` if this pass has completed (the
    /// following call restarts from the first element).
    pub async fn next(
        &mut self,
        registry: &OdRegistry,
        controller: &mut Controller,
    ) -> Option<Result<(u16, Container), Error>> {
        if self.watch_list.is_empty() {
            return None;
        }

        if self.position == self.watch_list.len() {
            self.position = 0;
            return None;
        }

        let index = self.watch_list[self.position];
        self.position += 1;

        Some(fetch_one(registry, controller, index).await.map(|c| (index, c)))
    }
}

/// One-shot fetch of a single index's data, independent of any cursor position.
pub async fn get(
    registry: &OdRegistry,
    controller: &mut Controller,
    index: u16,
) -> Result<Container, Error> {
    fetch_one(registry, controller, index).await
}

async fn fetch_one(
    registry: &OdRegistry,
    controller: &mut Controller,
    index: u16,
) -> Result<Container, Error> {
    let container = registry.get(index).ok_or(Error::UnknownIndex(index))?.clone();
    let metadata = registry.metadata(index).ok_or(Error::UnknownIndex(index))?;

    controller
        .upload(metadata, sub_index_for(metadata), container)
        .await
}

fn sub_index_for(metadata: &Metadata) -> SubIndex {
    if metadata.complete_access_supported {
        SubIndex::Complete
    } else {
        SubIndex::Index(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Kind;
    use crate::templates;

    fn registry_with(index: u16, kind: Kind) -> OdRegistry {
        let mut registry = OdRegistry::default();
        registry.insert(
            index,
            templates::for_kind(kind),
            Metadata {
                index,
                complete_access_supported: false,
                max_sub_index: 0,
                kind,
            },
        );
        registry
    }

    #[test]
    fn unknown_watch_index_is_rejected() {
        let registry = registry_with(0x1000, Kind::DeviceType);

        let result = Iteration::new(&registry, vec![0x9999]);

        assert!(matches!(result, Err(Error::UnknownIndex(0x9999))));
    }

    #[test]
    fn empty_watch_list_is_accepted() {
        let registry = registry_with(0x1000, Kind::DeviceType);

        assert!(Iteration::new(&registry, vec![]).is_ok());
    }
}
