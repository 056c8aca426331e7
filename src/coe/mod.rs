//! CANopen over EtherCAT (CoE) mailbox protocol types.

mod abort_code;
mod headers;

pub use abort_code::CoeAbortCode;
pub use headers::{
    CoeCommand, CoeHeader, CoeService, DescriptionRequest, EntryRequest, OdListRequest,
    SdoExpeditedPayload, SdoHeader, SdoHeaderSegmented, SdoInfoHeader, SdoInfoOpCode,
    SdoUploadRequestHeader, SubIndex, ENTRY_VALUE_INFO_ALL, OD_LIST_TYPE_ALL,
};
