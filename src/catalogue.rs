//! The static object-dictionary catalogue: index ranges mapped to container templates.

/// One OD index kind. Templates are singletons keyed by this discriminant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Kind {
    DeviceType,
    DeviceName,
    HardwareVersion,
    SoftwareVersion,
    IdentityObject,
    ConfigurationData,
    InformationData,
    DiagnosisData,
    DetectModulesCommand,
    ConfiguredAddressList,
    MasterDiagData,
    DiagInterfaceControl,
}

/// `(index, sub_index, complete_access_supported, max_sub_index, request_container_type,
/// response_container_type)`.
///
/// `max_sub_index` starts at the catalogue's static value and is mutated by discovery
/// once the server's own Object-Description response is known.
#[derive(Debug, Clone)]
pub struct Metadata {
    pub index: u16,
    pub complete_access_supported: bool,
    pub max_sub_index: u8,
    pub kind: Kind,
}

/// `(index_range, metadata)`. The catalogue is the ordered list of these.
#[derive(Debug, Clone)]
pub struct MappingMember {
    pub index_range: (u16, u16),
    pub metadata: Metadata,
}

fn member(lo: u16, hi: u16, complete_access: bool, max_sub_index: u8, kind: Kind) -> MappingMember {
    MappingMember {
        index_range: (lo, hi),
        metadata: Metadata {
            index: lo,
            complete_access_supported: complete_access,
            max_sub_index,
            kind,
        },
    }
}

/// The static OD catalogue, in the order given by the ETG.1510 object list.
pub fn catalogue() -> Vec<MappingMember> {
    vec![
        member(0x1000, 0x1000, false, 0, Kind::DeviceType),
        member(0x1008, 0x1008, false, 0, Kind::DeviceName),
        member(0x1009, 0x1009, false, 0, Kind::HardwareVersion),
        member(0x100A, 0x100A, false, 0, Kind::SoftwareVersion),
        member(0x1018, 0x1018, true, 4, Kind::IdentityObject),
        member(0x8000, 0x8FFF, true, 16, Kind::ConfigurationData),
        member(0x9000, 0x9FFF, true, 6, Kind::InformationData),
        member(0xA000, 0xAFFF, true, 32, Kind::DiagnosisData),
        member(0xF002, 0xF002, true, 1, Kind::DetectModulesCommand),
        member(0xF020, 0xF020, true, 1, Kind::ConfiguredAddressList),
        member(0xF120, 0xF120, true, 1, Kind::MasterDiagData),
        member(0xF200, 0xF200, true, 1, Kind::DiagInterfaceControl),
    ]
}

/// Given an index, return the first mapping member whose range contains it.
///
/// Overlapping ranges in the catalogue are a programming error, not a runtime
/// condition handled here.
pub fn lookup(catalogue: &[MappingMember], index: u16) -> Option<&MappingMember> {
    catalogue
        .iter()
        .find(|m| (m.index_range.0..=m.index_range.1).contains(&index))
}

/// The starting index of the range containing `index`, if any.
pub fn range_start(catalogue: &[MappingMember], index: u16) -> Option<u16> {
    lookup(catalogue, index).map(|m| m.index_range.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn od_range_lookup() {
        let table = catalogue();

        let cases = [
            (0x1000u16, Some(Kind::DeviceType)),
            (0x1018, Some(Kind::IdentityObject)),
            (0x8ABC, Some(Kind::ConfigurationData)),
            (0x9FFF, Some(Kind::InformationData)),
            (0xA000, Some(Kind::DiagnosisData)),
            (0xF020, Some(Kind::ConfiguredAddressList)),
            (0xF500, None),
        ];

        for (index, expected) in cases {
            let got = lookup(&table, index).map(|m| m.metadata.kind);
            assert_eq!(got, expected, "lookup({index:#06x})");
        }
    }

    #[test]
    fn range_start_returns_lower_bound() {
        let table = catalogue();

        assert_eq!(range_start(&table, 0x8ABC), Some(0x8000));
        assert_eq!(range_start(&table, 0xF500), None);
    }
}
