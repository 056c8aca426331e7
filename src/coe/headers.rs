use etg1510_wire::WireReadWriteSized;

/// Defined in ETG1000.6 5.6.1 Table 29 – CoE elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[cfg_attr(test, derive(arbitrary::Arbitrary))]
#[repr(u8)]
pub enum CoeService {
    /// Emergency
    Emergency = 0x01,
    /// SDO Request
    SdoRequest = 0x02,
    /// SDO Response
    SdoResponse = 0x03,
    /// TxPDO
    TxPdo = 0x04,
    /// RxPDO
    RxPdo = 0x05,
    /// TxPDO remote request
    TxPdoRemoteRequest = 0x06,
    /// RxPDO remote request
    RxPdoRemoteRequest = 0x07,
    /// SDO Information
    SdoInformation = 0x08,
}

/// Defined in ETG1000.6 Section 5.6.2.1.1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[cfg_attr(test, derive(arbitrary::Arbitrary))]
#[wire(bytes = 2)]
pub struct CoeHeader {
    // bits 0..=11 are "number", unused by a diagnostic client; bits 12..=15 carry service.
    #[wire(pre_skip = 12, bits = 4)]
    pub service: CoeService,
}

/// The "Command specifier" field near the bottom of SDO definition tables.
///
/// See e.g. ETG1000.6 Section 5.6.2.6.2 Table 39 – Upload SDO Segment Response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[wire(bits = 3)]
#[repr(u8)]
pub enum CoeCommand {
    Download = 0x01,
    Upload = 0x02,
    UploadSegment = 0x03,
    Abort = 0x04,
}

/// Defined in ETG1000.6 Section 5.6.2.1.1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[wire(bytes = 4)]
pub struct SdoHeader {
    #[wire(bits = 1)]
    pub size_indicator: bool,
    #[wire(bits = 1)]
    pub expedited_transfer: bool,
    #[wire(bits = 2)]
    pub size: u8,
    #[wire(bits = 1)]
    pub complete_access: bool,
    #[wire(bits = 3)]
    pub command: CoeCommand,
    #[wire(bytes = 2)]
    pub index: u16,
    #[wire(bytes = 1)]
    pub sub_index: u8,
}

/// The opening word of an SDO Upload *request*, defined in ETG1000.6 Section 5.6.2.4.1
/// Table 36 – Upload SDO Request. Distinct from [`SdoHeader`] (the response's opening
/// word): the request carries no size-indication fields, just a 4-bit reserved prefix
/// and a trailing 32-bit reserved block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[wire(bytes = 8)]
pub struct SdoUploadRequestHeader {
    // bits 0..=3: reserved.
    #[wire(pre_skip = 4, bits = 1)]
    pub complete_access: bool,
    #[wire(bits = 3)]
    pub command: CoeCommand,
    #[wire(bytes = 2)]
    pub index: u16,
    // bits 32..=63: reserved.
    #[wire(bytes = 1, post_skip = 32)]
    pub sub_index: u8,
}

/// Defined in ETG1000.6 5.6.2.3.1, used by the normal (segmented) SDO upload transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[wire(bytes = 1)]
pub struct SdoHeaderSegmented {
    #[wire(bits = 1)]
    pub is_last_segment: bool,

    /// Number of data bytes in this segment's final 7-byte chunk; `0` means all 7 are
    /// used.
    #[wire(bits = 3)]
    pub segment_data_size: u8,

    #[wire(bits = 1)]
    pub toggle: bool,

    #[wire(bits = 3)]
    pub(crate) command: CoeCommand,
}

/// Defined in ETG.1000.6 5.6.3.2 – the header shared by all SDO Information service
/// requests and responses (OD-List, Object-Description, Entry-Description, Error).
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[wire(bytes = 4)]
pub struct SdoInfoHeader {
    #[wire(bits = 7)]
    pub op_code: SdoInfoOpCode,
    #[wire(bits = 1)]
    pub incomplete: bool,
    #[wire(pre_skip = 8, bytes = 2)]
    pub fragments_left: u16,
}

/// Defined in ETG.1000.6 5.6.3.2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[repr(u8)]
pub enum SdoInfoOpCode {
    GetObjectDescriptionListRequest = 0x01,
    GetObjectDescriptionListResponse = 0x02,
    GetObjectDescriptionRequest = 0x03,
    GetObjectDescriptionResponse = 0x04,
    GetEntryDescriptionRequest = 0x05,
    GetEntryDescriptionResponse = 0x06,
    SdoInfoErrorRequest = 0x07,
}

/// Sub-index access mode for an SDO Upload request.
#[derive(Copy, Clone, Debug)]
pub enum SubIndex {
    /// Complete access, transferring every sub-index of the entry as one block.
    Complete,

    /// A single sub-index.
    Index(u8),
}

impl SubIndex {
    pub(crate) fn complete_access(&self) -> bool {
        matches!(self, Self::Complete)
    }

    pub(crate) fn sub_index(&self) -> u8 {
        match self {
            // Sub-index 0 holds the entry's sub-index count, so complete access starts
            // reading from 1.
            Self::Complete => 1,
            Self::Index(idx) => *idx,
        }
    }
}

impl From<u8> for SubIndex {
    fn from(value: u8) -> Self {
        Self::Index(value)
    }
}

/// Fixed value of [`OdListRequest::list_type`]: "all objects", the only list type this
/// client asks for.
pub const OD_LIST_TYPE_ALL: u16 = 0x0001;

/// Fixed value of [`EntryRequest::value_info`]: request every descriptive field the
/// server can report for the sub-index.
pub const ENTRY_VALUE_INFO_ALL: u8 = 0x7F;

/// Sub-body of a GET_OD_LIST_REQ, defined in ETG1000.6 Section 5.6.3.3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[wire(bytes = 2)]
pub struct OdListRequest {
    #[wire(bytes = 2)]
    pub list_type: u16,
}

/// Sub-body of a GET_OBJECT_DESCRIPTION_REQ, defined in ETG1000.6 Section 5.6.3.4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[wire(bytes = 2)]
pub struct DescriptionRequest {
    #[wire(bytes = 2)]
    pub index: u16,
}

/// Sub-body of a GET_ENTRY_DESCRIPTION_REQ, defined in ETG1000.6 Section 5.6.3.6.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[wire(bytes = 4)]
pub struct EntryRequest {
    #[wire(bytes = 2)]
    pub index: u16,
    #[wire(bytes = 1)]
    pub sub_index: u8,
    #[wire(bytes = 1)]
    pub value_info: u8,
}

/// Types that can be carried directly in an expedited SDO upload response (4 bytes or
/// fewer, no segmentation required).
pub trait SdoExpeditedPayload: WireReadWriteSized {}

impl SdoExpeditedPayload for u8 {}
impl SdoExpeditedPayload for u16 {}
impl SdoExpeditedPayload for u32 {}

#[cfg(test)]
mod tests {
    pub use super::*;
    use etg1510_wire::{WireRead, WireReadWriteSized};

    #[test]
    fn sanity_coe_service() {
        assert_eq!(CoeService::SdoRequest.pack(), [0x02]);
        assert_eq!(
            CoeService::unpack_from_slice(&[0x02]),
            Ok(CoeService::SdoRequest)
        );
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn coe_header_fuzz() {
        heckcheck::check(|header: CoeHeader| {
            let mut buf = [0u8; CoeHeader::PACKED_LEN];

            let packed = header.pack_to_slice(&mut buf).expect("pack");

            let unpacked = CoeHeader::unpack_from_slice(packed).expect("unpack");

            pretty_assertions::assert_eq!(header, unpacked);

            Ok(())
        });
    }

    #[test]
    fn upload_request_header_layout() {
        let header = SdoUploadRequestHeader {
            complete_access: true,
            command: CoeCommand::Upload,
            index: 0x1018,
            sub_index: 1,
        };

        let packed = header.pack();

        // Reserved nibble (bits 0..=3, zero) | CompleteAccess=1 (bit 4) |
        // CommandSpecifier=2 (bits 5..=7, LSB first) -> 0b0101_0000.
        assert_eq!(packed[0], 0b0101_0000);
        assert_eq!(&packed[1..3], &0x1018u16.to_le_bytes());
        assert_eq!(packed[3], 1);
        assert_eq!(&packed[4..8], &[0, 0, 0, 0]);

        let unpacked = SdoUploadRequestHeader::unpack_from_slice(&packed).unwrap();

        assert_eq!(unpacked, header);
    }
}
