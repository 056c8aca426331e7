//! The outermost EtherCAT datagram header wrapping the mailbox payload.

/// Defined in ETG.1000.4 Table 9 – EtherCAT frame header.
///
/// Only the `Mailbox` data type is meaningful to a CoE/SDO diagnostic client; the other
/// values (PDU, network variable, acyclic mailbox at the DL layer) are never produced by
/// this crate and are rejected on decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[cfg_attr(test, derive(arbitrary::Arbitrary))]
#[repr(u8)]
pub enum DataType {
    Mailbox = 0x05,
}

/// Defined in ETG.1000.4 Table 9. The length field covers everything following this
/// header (the mailbox header plus its payload).
#[derive(Clone, Copy, Debug, PartialEq, Eq, etg1510_wire::WireReadWrite)]
#[cfg_attr(test, derive(arbitrary::Arbitrary))]
#[wire(bytes = 2)]
pub struct EthercatHeader {
    /// Length in bytes of the datagram(s) following this header.
    #[wire(bits = 11)]
    pub length: u16,
    // bit 11: reserved/circulating frame flag, unused by a mailbox gateway client.
    #[wire(pre_skip = 1, bits = 4)]
    pub data_type: DataType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use etg1510_wire::{WireRead, WireReadWriteSized};

    #[test]
    #[cfg_attr(miri, ignore)]
    fn ethercat_header_fuzz() {
        heckcheck::check(|header: EthercatHeader| {
            let packed = header.pack();

            let unpacked = EthercatHeader::unpack_from_slice(&packed).expect("unpack");

            pretty_assertions::assert_eq!(header, unpacked);

            Ok(())
        });
    }

    #[test]
    fn encode_mailbox_header() {
        // Length=10, DataType=Mailbox(5): 0b0101_0000_0000_1010 little-endian.
        let header = EthercatHeader {
            length: 10,
            data_type: DataType::Mailbox,
        };

        assert_eq!(header.pack(), [0x0a, 0x50]);
    }

    #[test]
    fn decode_mailbox_header() {
        let parsed = EthercatHeader::unpack_from_slice(&[0x0a, 0x50]).unwrap();

        assert_eq!(
            parsed,
            EthercatHeader {
                length: 10,
                data_type: DataType::Mailbox,
            }
        );
    }
}
