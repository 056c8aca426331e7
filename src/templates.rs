//! Factory functions producing a freshly initialized [`Container`] for each OD index
//! kind and each SDO Information Service reply shape.

use crate::catalogue::Kind;
use crate::container::{Container, Entry, FormatCode};

fn seq(name: &str, sub_index: u8, format_code: FormatCode, count: usize) -> Entry {
    Entry::new(name, sub_index, format_code, format_code.element_size() * count)
}

/// Build the initial container for a catalogue [`Kind`]. Discovery overwrites names,
/// sizes, and `enable` flags once the server's own Object-Description and
/// Entry-Description responses are known; this only fixes sub-index layout and
/// primitive format.
pub fn for_kind(kind: Kind) -> Container {
    match kind {
        Kind::DeviceType => Container::new(vec![Entry::new("DeviceType", 0, FormatCode::U32, 4)]),

        Kind::DeviceName => Container::new(vec![Entry::new("DeviceName", 0, FormatCode::Str, 0)]),

        Kind::HardwareVersion => {
            Container::new(vec![Entry::new("HardwareVersion", 0, FormatCode::Str, 0)])
        }

        Kind::SoftwareVersion => {
            Container::new(vec![Entry::new("SoftwareVersion", 0, FormatCode::Str, 0)])
        }

        Kind::IdentityObject => Container::new(vec![
            Entry::new("NumberOfEntries", 0, FormatCode::U8, 1),
            Entry::new("VendorID", 1, FormatCode::U32, 4),
            Entry::new("ProductCode", 2, FormatCode::U32, 4),
            Entry::new("RevisionNumber", 3, FormatCode::U32, 4),
            Entry::new("SerialNumber", 4, FormatCode::U32, 4),
        ]),

        Kind::ConfigurationData => Container::new(vec![
            Entry::new("NumberOfEntries", 0, FormatCode::U8, 1),
            Entry::new("FixedStationAddress", 1, FormatCode::U16, 2),
            Entry::new("Type", 2, FormatCode::Str, 16),
            Entry::new("Name", 3, FormatCode::Str, 32),
            Entry::new("DeviceType", 4, FormatCode::U32, 4),
            Entry::new("VendorId", 5, FormatCode::U32, 4),
            Entry::new("ProductCode", 6, FormatCode::U32, 4),
            Entry::new("RevisionNumber", 7, FormatCode::U32, 4),
            Entry::new("SerialNumber", 8, FormatCode::U32, 4),
            Entry::new("MailboxOutSize", 33, FormatCode::U16, 2),
            Entry::new("MailboxInSize", 34, FormatCode::U16, 2),
            Entry::new("LinkStatus", 35, FormatCode::U16, 2),
            Entry::new("LinkPreset", 36, FormatCode::U16, 2),
            Entry::new("Flags", 37, FormatCode::U16, 2),
            Entry::new("PortPhysics", 38, FormatCode::U8, 1),
            Entry::new("MailboxProtocolsSupported", 39, FormatCode::U16, 2),
            Entry::new("DiagHistoryObjectSupported", 40, FormatCode::Bool, 1),
        ]),

        // The original source declares every field with sub_index=0; we assign
        // sequential sub-indices in declaration order instead, since collapsing every
        // field onto sub-index 0 would make per-entry discovery unusable.
        Kind::InformationData => Container::new(vec![
            Entry::new("NumberOfEntries", 0, FormatCode::U8, 1),
            Entry::new("StationAddress", 1, FormatCode::U16, 2),
            Entry::new("VendorId", 2, FormatCode::U32, 4),
            Entry::new("ProductCode", 3, FormatCode::U32, 4),
            Entry::new("RevisionNumber", 4, FormatCode::U32, 4),
            Entry::new("SerialNumber", 5, FormatCode::U32, 4),
            Entry::new("DLStatusRegister", 6, FormatCode::U32, 4),
        ]),

        Kind::DiagnosisData => {
            let mut entries = vec![
                Entry::new("NumberOfEntries", 0, FormatCode::U8, 1),
                Entry::new("ALStatus", 1, FormatCode::U16, 2),
                Entry::new("ALControl", 2, FormatCode::U16, 2),
                Entry::new("ALStatusCode", 3, FormatCode::U16, 2),
                Entry::new("LinkConnStatus", 4, FormatCode::U8, 1),
                Entry::new("LinkControl", 5, FormatCode::U8, 1),
                seq("FixedAddressConnPort", 6, FormatCode::U16, 4),
                seq("FrameErrorCounterPort", 10, FormatCode::U32, 4),
                Entry::new("CyclicWCErrorCounter", 14, FormatCode::U32, 4),
                Entry::new("SlaveNotPresentCounter", 15, FormatCode::U32, 4),
                Entry::new("AbnormalStateChangeCounter", 16, FormatCode::U32, 4),
                Entry::new("DisableAutomaticLinkControl", 17, FormatCode::Bool, 1),
                Entry::new("LastProtocolError", 18, FormatCode::U32, 4),
                Entry::new("NewDiagMessageAvailable", 19, FormatCode::Bool, 1),
            ];
            for entry in entries.iter_mut().filter(|e| e.size > e.format_code.element_size()) {
                entry.value = crate::value::Value::Seq(Vec::new());
            }
            Container::new(entries)
        }

        Kind::MasterDiagData => Container::new(vec![
            Entry::new("NumberOfEntries", 0, FormatCode::U8, 1),
            Entry::new("CyclicLostFrames", 1, FormatCode::U32, 4),
            Entry::new("ACyclicLostFrames", 2, FormatCode::U32, 4),
            Entry::new("CyclicFramesPerSecond", 3, FormatCode::U32, 4),
            Entry::new("ACyclicFramesPerSecond", 4, FormatCode::U32, 4),
            Entry::new("MasterState", 16, FormatCode::U8, 1),
        ]),

        Kind::DetectModulesCommand => Container::new(vec![
            Entry::new("NumberOfEntries", 0, FormatCode::U8, 1),
            seq("ScanCommandRequest", 1, FormatCode::U8, 2),
            Entry::new("ScanCommandStatus", 2, FormatCode::U8, 1),
            seq("ScanCommandResponse", 3, FormatCode::U8, 6),
        ]),

        Kind::ConfiguredAddressList => {
            let mut entries = vec![Entry::new("NumberOfSlaves", 0, FormatCode::U8, 1)];

            for sub_index in 1..=125u8 {
                entries.push(Entry::new(
                    format!("ConfiguredAddress{sub_index}"),
                    sub_index,
                    FormatCode::U16,
                    2,
                ));
            }

            Container::new(entries)
        }

        Kind::DiagInterfaceControl => Container::new(vec![
            Entry::new("NumberOfEntries", 0, FormatCode::U8, 1),
            Entry::new("ResetDiagInfo", 16, FormatCode::Bool, 1),
        ]),
    }
}

/// The OD-List response shape: `ListType` plus a variable-length sequence of indices.
pub fn od_list(index_count: usize) -> Container {
    Container::new(vec![
        Entry::new("ListType", 0, FormatCode::U16, 2),
        seq("ObjectIndex", 1, FormatCode::U16, index_count),
    ])
}

/// The Object-Description response shape: the reported `MaxSubindex` for one index.
pub fn object_description() -> Container {
    Container::new(vec![Entry::new("MaxSubindex", 0, FormatCode::U8, 1)])
}

/// The Entry-Description response shape: bit length plus the entry's name string.
pub fn entry_description() -> Container {
    Container::new(vec![
        Entry::new("BitLength", 0, FormatCode::U16, 2),
        Entry::new("Data", 1, FormatCode::Str, 0),
    ])
}

/// The SDO Information Service error reply shape: a raw abort code.
pub fn sdo_info_error() -> Container {
    Container::new(vec![Entry::new("AbortCode", 0, FormatCode::U32, 4)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnosis_data_has_expected_shape() {
        let container = for_kind(Kind::DiagnosisData);

        assert_eq!(container.entries.len(), 14);
        assert_eq!(
            container.get_by_subindex(6).unwrap().size,
            FormatCode::U16.element_size() * 4
        );
        assert_eq!(
            container.get_by_subindex(10).unwrap().size,
            FormatCode::U32.element_size() * 4
        );
    }

    #[test]
    fn configured_address_list_has_125_addresses_plus_count() {
        let container = for_kind(Kind::ConfiguredAddressList);

        assert_eq!(container.entries.len(), 126);
    }

    #[test]
    fn od_list_of_unknown_length_grows_to_fit_the_response() {
        // Discovery doesn't know how many indices the server will report up front, so
        // it asks for a zero-length ObjectIndex and relies on the binder's "grow the
        // last entry" rule to absorb however many come back.
        let container = od_list(0);

        let payload = [0x01, 0x00, 0x00, 0x10, 0x08, 0x10];
        let bound = crate::container::bind(&payload, container).unwrap();

        assert_eq!(
            bound.get_by_subindex(1).unwrap().value,
            crate::value::Value::Seq(vec![
                crate::value::Value::U16(0x1000),
                crate::value::Value::U16(0x1008),
            ])
        );
    }
}
