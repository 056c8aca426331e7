//! Drives one SDO transaction at a time: builds a request frame, sends it, and parses
//! and binds the reply.

use crate::catalogue::Metadata;
use crate::coe::{
    CoeCommand, CoeHeader, CoeService, DescriptionRequest, EntryRequest, OdListRequest,
    SdoHeader, SdoInfoHeader, SdoInfoOpCode, SdoUploadRequestHeader, SubIndex,
    ENTRY_VALUE_INFO_ALL, OD_LIST_TYPE_ALL,
};
use crate::container::{bind, Container};
use crate::error::Error;
use crate::ethercat::{DataType, EthercatHeader};
use crate::mailbox::{MailboxHeader, MailboxType, Priority};
use crate::session::Session;
use crate::templates;

use etg1510_wire::{WireRead, WireReadWrite, WireReadWriteSized};

/// Which SDO Information Service walk step a [`Controller::info`] call performs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InfoRequest {
    /// GET_OD_LIST_REQ: list every index the server exposes.
    OdList,
    /// GET_OBJECT_DESCRIPTION_REQ for one index.
    Description(u16),
    /// GET_ENTRY_DESCRIPTION_REQ for one `(index, sub_index)`.
    Entry(u16, u8),
}

impl InfoRequest {
    fn opcode(self) -> SdoInfoOpCode {
        match self {
            Self::OdList => SdoInfoOpCode::GetObjectDescriptionListRequest,
            Self::Description(_) => SdoInfoOpCode::GetObjectDescriptionRequest,
            Self::Entry(_, _) => SdoInfoOpCode::GetEntryDescriptionRequest,
        }
    }

    fn sub_body(self) -> Vec<u8> {
        match self {
            Self::OdList => OdListRequest {
                list_type: OD_LIST_TYPE_ALL,
            }
            .pack()
            .to_vec(),
            Self::Description(index) => DescriptionRequest { index }.pack().to_vec(),
            Self::Entry(index, sub_index) => EntryRequest {
                index,
                sub_index,
                value_info: ENTRY_VALUE_INFO_ALL,
            }
            .pack()
            .to_vec(),
        }
    }
}

/// One SDO transaction at a time over a [`Session`].
///
/// Owns the u3 mailbox counter (`1..=7`, wrapping `7 -> 1`, never `0`) across every
/// request this controller builds.
pub struct Controller {
    session: Session,
    counter: u8,
    requests_sent: u64,
}

impl Controller {
    /// Build a controller driving requests over `session`.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            counter: 0,
            requests_sent: 0,
        }
    }

    /// Number of request/response round trips this controller has completed.
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }

    fn next_counter(&mut self) -> u8 {
        self.counter = if self.counter == 0 || self.counter >= 7 {
            1
        } else {
            self.counter + 1
        };

        self.counter
    }

    /// Issue an SDO Upload for `metadata` starting at `sub_index`, binding the reply
    /// onto a fresh copy of `container`.
    pub async fn upload(
        &mut self,
        metadata: &Metadata,
        sub_index: SubIndex,
        container: Container,
    ) -> Result<Container, Error> {
        let header = SdoUploadRequestHeader {
            complete_access: metadata.complete_access_supported,
            command: CoeCommand::Upload,
            index: metadata.index,
            sub_index: sub_index.sub_index(),
        };

        let frame = self.build_frame(CoeService::SdoRequest, &header.pack());

        let response = self.session.send(&frame).await?;
        self.requests_sent += 1;

        let body = parse_sdo_response_body(&response)?;

        bind(body, container)
    }

    /// Issue one SDO Information Service request and bind the reply onto a fresh copy
    /// of `container`. If the peer answers with opcode 7 (SDO_INFO_ERR_REQ), the
    /// target container is swapped for an `SDOInfoError` container per the protocol's
    /// error-check step, and this returns [`Error::SdoInfoError`] instead.
    pub async fn info(
        &mut self,
        request: InfoRequest,
        container: Container,
    ) -> Result<Container, Error> {
        let info_header = SdoInfoHeader {
            op_code: request.opcode(),
            incomplete: false,
            fragments_left: 0,
        };

        let mut body = info_header.pack().to_vec();
        body.extend_from_slice(&request.sub_body());

        let frame = self.build_frame(CoeService::SdoInformation, &body);

        let response = self.session.send(&frame).await?;
        self.requests_sent += 1;

        let (op_code, payload) = parse_info_response_body(&response)?;

        if op_code == SdoInfoOpCode::SdoInfoErrorRequest {
            let bound = bind(payload, templates::sdo_info_error())?;

            let abort_code = bound
                .get_by_subindex(0)
                .and_then(|e| e.value.as_u32())
                .unwrap_or_default();

            return Err(Error::SdoInfoError(abort_code.into()));
        }

        bind(payload, container)
    }

    fn build_frame(&mut self, service: CoeService, body: &[u8]) -> Vec<u8> {
        let coe_header = CoeHeader { service };
        let coe_bytes = coe_header.pack();

        let mailbox_length = (coe_bytes.len() + body.len()) as u16;

        let mailbox_header = MailboxHeader {
            length: mailbox_length,
            address: 0,
            priority: Priority::Lowest,
            mailbox_type: MailboxType::Coe,
            counter: self.next_counter(),
        };
        let mailbox_bytes = mailbox_header.pack();

        let ethercat_header = EthercatHeader {
            length: mailbox_bytes.len() as u16 + mailbox_length,
            data_type: DataType::Mailbox,
        };

        let mut frame =
            Vec::with_capacity(ethercat_header.packed_len() + mailbox_bytes.len() + coe_bytes.len() + body.len());

        frame.extend_from_slice(&ethercat_header.pack());
        frame.extend_from_slice(&mailbox_bytes);
        frame.extend_from_slice(&coe_bytes);
        frame.extend_from_slice(body);

        frame
    }
}

const ETHERCAT_HEADER_LEN: usize = 2;
const MAILBOX_HEADER_LEN: usize = 6;
const COE_HEADER_LEN: usize = 2;
const SDO_OPENING_LEN: usize = 4;

/// Offset of the SDO/SDO-Info opening word: past EtherCAT (2) + Mailbox (6) + CoE (2).
const SDO_OFFSET: usize = ETHERCAT_HEADER_LEN + MAILBOX_HEADER_LEN + COE_HEADER_LEN;
/// Offset of the body following the 4-byte SDO/SDO-Info opening word.
const BODY_OFFSET: usize = SDO_OFFSET + SDO_OPENING_LEN;

/// Parse the body of an SDO Upload response, applying the expedited/normal transfer
/// body-size rule, and return a slice borrowed from `response`.
fn parse_sdo_response_body(response: &[u8]) -> Result<&[u8], Error> {
    let opening = response
        .get(SDO_OFFSET..BODY_OFFSET)
        .ok_or(Error::EndOfStream)?;
    let header = SdoHeader::unpack_from_slice(opening)?;

    let region = response.get(BODY_OFFSET..).ok_or(Error::EndOfStream)?;

    let (size, offset) = if header.size_indicator && header.expedited_transfer {
        (4 - header.size as usize, 0)
    } else if header.size_indicator {
        let declared = region.get(0..4).ok_or(Error::EndOfStream)?;
        let size = u32::from_le_bytes(declared.try_into().expect("checked len")) as usize;
        (size, 4)
    } else {
        (4, 0)
    };

    let body = region.get(offset..).ok_or(Error::EndOfStream)?;

    if body.len() < size {
        return Err(Error::EndOfStream);
    }

    Ok(&body[..size])
}

/// Parse the opcode and body of an SDO Information Service response.
fn parse_info_response_body(response: &[u8]) -> Result<(SdoInfoOpCode, &[u8]), Error> {
    let opening = response
        .get(SDO_OFFSET..BODY_OFFSET)
        .ok_or(Error::EndOfStream)?;
    let header = SdoInfoHeader::unpack_from_slice(opening)?;

    let body = response.get(BODY_OFFSET..).ok_or(Error::EndOfStream)?;

    Ok((header.op_code, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::Kind;

    fn frame_with_sdo_response(header: SdoHeader, body: &[u8]) -> Vec<u8> {
        let mut frame = vec![0u8; SDO_OFFSET];
        frame.extend_from_slice(&header.pack());
        frame.extend_from_slice(body);
        frame
    }

    #[test]
    fn expedited_u32_upload() {
        // Scenario 1: expedited upload of a u32, SizeIndicator=1/TransferType=1/DataSetSize=0.
        let header = SdoHeader {
            size_indicator: true,
            expedited_transfer: true,
            size: 0,
            complete_access: false,
            command: CoeCommand::Upload,
            index: 0x1000,
            sub_index: 0,
        };

        let frame = frame_with_sdo_response(header, &[0xf9, 0x00, 0x00, 0x00]);

        let body = parse_sdo_response_body(&frame).unwrap();

        assert_eq!(body, &[0xf9, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn normal_transfer_string_upload() {
        // Scenario 2: normal upload of an 11-byte string "EK1100\0\0\0\0\0".
        let header = SdoHeader {
            size_indicator: true,
            expedited_transfer: false,
            size: 0,
            complete_access: false,
            command: CoeCommand::Upload,
            index: 0x1008,
            sub_index: 0,
        };

        let mut body = 11u32.to_le_bytes().to_vec();
        body.extend_from_slice(b"EK1100\0\0\0\0\0");

        let mut frame = vec![0u8; SDO_OFFSET];
        frame.extend_from_slice(&header.pack());
        frame.extend_from_slice(&body);

        let parsed = parse_sdo_response_body(&frame).unwrap();

        assert_eq!(parsed, b"EK1100\0\0\0\0\0");

        let container = bind(parsed, templates::for_kind(Kind::DeviceName)).unwrap();

        assert_eq!(
            container.get_by_subindex(0).unwrap().value,
            crate::value::Value::Str("EK1100".to_string())
        );
    }

    #[test]
    fn od_list_reply_two_entries() {
        // Scenario 3: OD-List reply with two u16 entries after the info header.
        let info_header = SdoInfoHeader {
            op_code: SdoInfoOpCode::GetObjectDescriptionListResponse,
            incomplete: false,
            fragments_left: 0,
        };

        let mut frame = vec![0u8; SDO_OFFSET];
        frame.extend_from_slice(&info_header.pack());
        frame.extend_from_slice(&[0x01, 0x00, 0x00, 0x10, 0x08, 0x10]);

        let (op_code, body) = parse_info_response_body(&frame).unwrap();

        assert_eq!(op_code, SdoInfoOpCode::GetObjectDescriptionListResponse);

        let container = bind(body, templates::od_list(2)).unwrap();

        assert_eq!(
            container.get_by_subindex(0).unwrap().value,
            crate::value::Value::U16(1)
        );
        assert_eq!(
            container.get_by_subindex(1).unwrap().value,
            crate::value::Value::Seq(vec![
                crate::value::Value::U16(0x1000),
                crate::value::Value::U16(0x1008)
            ])
        );
    }

    #[test]
    fn info_error_reply() {
        // Scenario 4: info error, opcode=7, body 06 00 07 06 -> AbortCode 0x06070006.
        let info_header = SdoInfoHeader {
            op_code: SdoInfoOpCode::SdoInfoErrorRequest,
            incomplete: false,
            fragments_left: 0,
        };

        let mut frame = vec![0u8; SDO_OFFSET];
        frame.extend_from_slice(&info_header.pack());
        frame.extend_from_slice(&[0x06, 0x00, 0x07, 0x06]);

        let (op_code, body) = parse_info_response_body(&frame).unwrap();

        assert_eq!(op_code, SdoInfoOpCode::SdoInfoErrorRequest);

        let container = bind(body, templates::sdo_info_error()).unwrap();

        assert_eq!(
            container.get_by_subindex(0).unwrap().value.as_u32(),
            Some(0x06070006)
        );
    }

    #[test]
    fn counter_wraps_seven_to_one() {
        let mut controller = Controller {
            session: Session::new("127.0.0.1:34980".parse().unwrap()),
            counter: 0,
            requests_sent: 0,
        };

        let sequence: Vec<u8> = (0..9).map(|_| controller.next_counter()).collect();

        assert_eq!(sequence, vec![1, 2, 3, 4, 5, 6, 7, 1, 2]);
        assert!(sequence.iter().all(|&c| c != 0));
    }
}
