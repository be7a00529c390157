/*
 * SPDX-FileCopyrightText: 2025 UnionTech Software Technology Co., Ltd.
 *
 * SPDX-License-Identifier: GPL-2.0-or-later
 */
//! Get Channel Cipher Suites: paginated collection of the raw record
//! stream and the parser that turns it into cipher suite entries.

use clap::ValueEnum;
use std::error::Error;
use std::fmt;

use crate::debug1;
use crate::error::{ccode_str, IpmiError, IpmiResult};
use crate::helper::ipmi24toh;
use crate::ipmi::constants::*;
use crate::ipmi::intf::IpmiIntf;
use crate::ipmi::ipmi::{IpmiRq, IpmiRs};
use crate::ipmi::strings::{u8_to_str, IPMI_AUTH_ALGORITHMS, IPMI_ENCRYPTION_ALGORITHMS,
    IPMI_INTEGRITY_ALGORITHMS, U8Str};

// Each full page is one echoed channel byte plus 16 record bytes.
const CIPHER_SUITE_PAGE_DATA: usize = 16;
const CIPHER_SUITE_FULL_PAGE: usize = CIPHER_SUITE_PAGE_DATA + 1;
// List index is a 6-bit counter.
const CIPHER_SUITE_MAX_INDEX: u8 = 0x3F;
// Request byte 3: bit 7 selects the cipher-suite record format.
const CIPHER_SUITE_FORMAT_FLAG: u8 = 0x80;

// Record stream markers and specifier classes
const RECORD_START_STANDARD: u8 = 0xC0;
const RECORD_START_OEM: u8 = 0xC1;
const SPEC_CLASS_MASK: u8 = 0xC0;
const SPEC_CLASS_AUTH: u8 = 0x00;
const SPEC_CLASS_INTEGRITY: u8 = 0x40;
const SPEC_CLASS_CRYPT: u8 = 0x80;
const SPEC_VALUE_MASK: u8 = 0x3F;

#[derive(ValueEnum, Clone, Debug)]
pub enum CipherPayload {
    /// IPMI payload cipher suites
    Ipmi,
    /// SOL payload cipher suites
    Sol,
}

impl CipherPayload {
    fn wire(&self) -> u8 {
        match self {
            CipherPayload::Ipmi => 0,
            CipherPayload::Sol => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherSuiteKind {
    Standard,
    Oem { iana: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherSuiteEntry {
    pub cipher_suite_id: u8,
    pub kind: CipherSuiteKind,
    pub auth_alg: u8,
    pub integrity_alg: u8,
    pub crypt_alg: u8,
}

impl CipherSuiteEntry {
    fn new(cipher_suite_id: u8, kind: CipherSuiteKind) -> Self {
        CipherSuiteEntry {
            cipher_suite_id,
            kind,
            auth_alg: IPMI_AUTH_RAKP_NONE,
            integrity_alg: IPMI_INTEGRITY_NONE,
            crypt_alg: IPMI_CRYPT_NONE,
        }
    }

    pub fn iana_string(&self) -> String {
        match self.kind {
            CipherSuiteKind::Oem { iana } if iana != 0 => format!("{:06x}", iana),
            _ => "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherParseError {
    /// A record started with something other than 0xC0/0xC1.
    BadRecordMarker { offset: usize, value: u8 },
    /// The buffer ended inside a record.
    IncompleteRecord { offset: usize },
}

impl fmt::Display for CipherParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherParseError::BadRecordMarker { offset, value } => write!(
                f,
                "Bad start of record byte 0x{:02x} at offset {} in cipher suite data",
                value, offset
            ),
            CipherParseError::IncompleteRecord { offset } => write!(
                f,
                "Incomplete data record at offset {} in cipher suite data",
                offset
            ),
        }
    }
}

impl std::error::Error for CipherParseError {}

impl From<CipherParseError> for IpmiError {
    fn from(e: CipherParseError) -> Self {
        IpmiError::InvalidData(e.to_string())
    }
}

/// Gather the full cipher suite record stream for a channel.
///
/// Requests walk the list index from 0 upward while the controller
/// keeps returning full pages; the first short page is the well-formed
/// end of enumeration. The echoed channel number in byte 0 of the first
/// response is recorded but later requests are not re-validated
/// against it. Any exchange failure or nonzero completion status
/// discards the partial accumulation: a short suite record would be
/// indistinguishable from a true end of data.
pub fn collect_cipher_suites(
    intf: &mut dyn IpmiIntf,
    channel: u8,
    payload: &CipherPayload,
) -> IpmiResult<Vec<u8>> {
    let mut rqdata = [channel, payload.wire(), CIPHER_SUITE_FORMAT_FLAG];
    let mut list_index = 0u8;
    let mut suite_data = Vec::new();

    let mut rsp = exchange_cipher_page(intf, &rqdata)?;

    if let Some(&echoed) = rsp.data.first() {
        debug1!("Cipher suite data for channel 0x{:02x}", echoed);
    }

    while rsp.data.len() == CIPHER_SUITE_FULL_PAGE && list_index < CIPHER_SUITE_MAX_INDEX {
        suite_data.extend_from_slice(&rsp.data[1..]);

        list_index += 1;
        rqdata[2] = CIPHER_SUITE_FORMAT_FLAG | list_index;
        rsp = exchange_cipher_page(intf, &rqdata)?;
    }

    // terminal page, possibly empty
    if rsp.data.len() > 1 {
        suite_data.extend_from_slice(&rsp.data[1..]);
    }

    Ok(suite_data)
}

fn exchange_cipher_page(intf: &mut dyn IpmiIntf, rqdata: &[u8; 3]) -> IpmiResult<IpmiRs> {
    let req = IpmiRq::app(IPMI_GET_CHANNEL_CIPHER_SUITES, rqdata.to_vec());
    let rsp = intf.sendrecv(&req).ok_or_else(|| {
        IpmiError::Interface("Unable to Get Channel Cipher Suites".to_string())
    })?;
    if rsp.fail() {
        return Err(IpmiError::Interface(format!(
            "Get Channel Cipher Suites failed: {}",
            ccode_str(rsp.ccode)
        )));
    }
    Ok(rsp)
}

// Parser states, one per fault point of the record grammar.
enum ParseState {
    RecordStart,
    SuiteId { oem: bool },
    OemIana { cipher_suite_id: u8 },
    AlgorithmBytes { entry: CipherSuiteEntry },
}

/// Parse a collected cipher suite record stream.
///
/// Grammar per record: marker (0xC0 standard / 0xC1 OEM), suite id,
/// for OEM a 24-bit little-endian IANA number, then zero or more
/// algorithm specifier bytes until the next marker or end of buffer.
/// The wire format mandates no order among the three specifier
/// classes and allows any subset; absent classes stay "none".
pub fn parse_cipher_suites(data: &[u8]) -> Result<Vec<CipherSuiteEntry>, CipherParseError> {
    let mut entries = Vec::new();
    let mut pos = 0usize;
    let mut state = ParseState::RecordStart;

    loop {
        state = match state {
            ParseState::RecordStart => {
                if pos >= data.len() {
                    return Ok(entries);
                }
                let oem = match data[pos] {
                    RECORD_START_STANDARD => false,
                    RECORD_START_OEM => true,
                    value => {
                        return Err(CipherParseError::BadRecordMarker { offset: pos, value })
                    }
                };
                // id plus record body; anything shorter is a truncated record
                if data.len() - (pos + 1) < 4 {
                    return Err(CipherParseError::IncompleteRecord { offset: pos });
                }
                pos += 1;
                ParseState::SuiteId { oem }
            }
            ParseState::SuiteId { oem } => {
                let cipher_suite_id = data[pos];
                pos += 1;
                if oem {
                    ParseState::OemIana { cipher_suite_id }
                } else {
                    ParseState::AlgorithmBytes {
                        entry: CipherSuiteEntry::new(cipher_suite_id, CipherSuiteKind::Standard),
                    }
                }
            }
            ParseState::OemIana { cipher_suite_id } => {
                let iana = ipmi24toh(&[data[pos], data[pos + 1], data[pos + 2]]);
                pos += 3;
                ParseState::AlgorithmBytes {
                    entry: CipherSuiteEntry::new(cipher_suite_id, CipherSuiteKind::Oem { iana }),
                }
            }
            ParseState::AlgorithmBytes { mut entry } => {
                while pos < data.len() && data[pos] & SPEC_CLASS_MASK != SPEC_CLASS_MASK {
                    let value = data[pos] & SPEC_VALUE_MASK;
                    match data[pos] & SPEC_CLASS_MASK {
                        SPEC_CLASS_AUTH => entry.auth_alg = value,
                        SPEC_CLASS_INTEGRITY => entry.integrity_alg = value,
                        SPEC_CLASS_CRYPT => entry.crypt_alg = value,
                        _ => unreachable!(),
                    }
                    pos += 1;
                }
                entries.push(entry);
                ParseState::RecordStart
            }
        };
    }
}

fn alg_str(val: u8, vals: &[U8Str]) -> String {
    match u8_to_str(val, vals) {
        Some(desc) => desc.to_string(),
        None => format!("Unknown (0x{:02x})", val),
    }
}

pub fn ipmi_get_channel_cipher_suites(
    intf: &mut dyn IpmiIntf,
    payload: &CipherPayload,
    channel: u8,
) -> Result<(), Box<dyn Error>> {
    let csv = intf.context().output_config().csv;

    let suite_data = collect_cipher_suites(intf, channel, payload)?;
    let entries = parse_cipher_suites(&suite_data)?;

    if !csv {
        println!("ID   IANA    Auth Alg        Integrity Alg   Confidentiality Alg");
    }
    for entry in &entries {
        if csv {
            println!(
                "{},{},{},{},{}",
                entry.cipher_suite_id,
                entry.iana_string(),
                alg_str(entry.auth_alg, IPMI_AUTH_ALGORITHMS),
                alg_str(entry.integrity_alg, IPMI_INTEGRITY_ALGORITHMS),
                alg_str(entry.crypt_alg, IPMI_ENCRYPTION_ALGORITHMS)
            );
        } else {
            println!(
                "{:<4} {:<7} {:<15} {:<15} {:<15}",
                entry.cipher_suite_id,
                entry.iana_string(),
                alg_str(entry.auth_alg, IPMI_AUTH_ALGORITHMS),
                alg_str(entry.integrity_alg, IPMI_INTEGRITY_ALGORITHMS),
                alg_str(entry.crypt_alg, IPMI_ENCRYPTION_ALGORITHMS)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipmi::mock::MockIntf;

    fn full_page(fill: u8) -> Vec<u8> {
        let mut page = vec![0x01]; // echoed channel
        page.extend(std::iter::repeat(fill).take(CIPHER_SUITE_PAGE_DATA));
        page
    }

    #[test]
    fn test_collect_appends_pages_until_short_page() {
        let mut intf = MockIntf::new();
        intf.push_ok(&full_page(0xAA));
        intf.push_ok(&full_page(0xBB));
        intf.push_ok(&full_page(0xCC));
        intf.push_ok(&[0x01, 1, 2, 3, 4, 5, 6, 7, 8]); // 9 bytes, terminal

        let data = collect_cipher_suites(&mut intf, 0x0E, &CipherPayload::Ipmi).unwrap();
        assert_eq!(data.len(), 16 + 16 + 16 + 8);
        assert_eq!(&data[48..], &[1, 2, 3, 4, 5, 6, 7, 8]);

        assert_eq!(intf.requests.len(), 4);
        assert_eq!(intf.requests[0].cmd, IPMI_GET_CHANNEL_CIPHER_SUITES);
        assert_eq!(intf.requests[0].data, vec![0x0E, 0x00, 0x80]);
        // list index climbs, format flag preserved
        assert_eq!(intf.requests[1].data, vec![0x0E, 0x00, 0x81]);
        assert_eq!(intf.requests[2].data, vec![0x0E, 0x00, 0x82]);
        assert_eq!(intf.requests[3].data, vec![0x0E, 0x00, 0x83]);
    }

    #[test]
    fn test_collect_sol_payload_selector() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[0x01]);
        collect_cipher_suites(&mut intf, 2, &CipherPayload::Sol).unwrap();
        assert_eq!(intf.requests[0].data, vec![0x02, 0x01, 0x80]);
    }

    #[test]
    fn test_collect_stops_at_list_index_ceiling() {
        let mut intf = MockIntf::new();
        for _ in 0..64 {
            intf.push_ok(&full_page(0x11));
        }

        let data = collect_cipher_suites(&mut intf, 0x0E, &CipherPayload::Ipmi).unwrap();
        // 63 looped pages plus the trailing bytes of the final response
        assert_eq!(data.len(), 64 * 16);
        assert_eq!(intf.requests.len(), 64);
        assert_eq!(intf.requests[63].data[2], 0x80 | 0x3F);
    }

    #[test]
    fn test_collect_empty_enumeration() {
        let mut intf = MockIntf::new();
        intf.push_ok(&[]);
        let data = collect_cipher_suites(&mut intf, 0x0E, &CipherPayload::Ipmi).unwrap();
        assert!(data.is_empty());

        let mut intf = MockIntf::new();
        intf.push_ok(&[0x01]); // echo byte only
        let data = collect_cipher_suites(&mut intf, 0x0E, &CipherPayload::Ipmi).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_collect_discards_partial_data_on_failure() {
        let mut intf = MockIntf::new();
        intf.push_ok(&full_page(0xAA));
        intf.push_ccode(0xc3);
        assert!(collect_cipher_suites(&mut intf, 0x0E, &CipherPayload::Ipmi).is_err());

        let mut intf = MockIntf::new();
        intf.push_ok(&full_page(0xAA));
        intf.push_none();
        assert!(collect_cipher_suites(&mut intf, 0x0E, &CipherPayload::Ipmi).is_err());
    }

    #[test]
    fn test_parse_standard_record_all_algorithms() {
        // auth hmac_sha1, integrity hmac_sha1_96, crypt aes_cbc_128
        let data = [0xC0, 0x03, 0x01, 0x41, 0x81];
        let entries = parse_cipher_suites(&data).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0],
            CipherSuiteEntry {
                cipher_suite_id: 3,
                kind: CipherSuiteKind::Standard,
                auth_alg: 0x01,
                integrity_alg: 0x01,
                crypt_alg: 0x01,
            }
        );
    }

    #[test]
    fn test_parse_accepts_any_specifier_order() {
        // crypt, auth, integrity
        let data = [0xC0, 0x03, 0x81, 0x01, 0x41];
        let entries = parse_cipher_suites(&data).unwrap();
        assert_eq!(entries[0].auth_alg, 0x01);
        assert_eq!(entries[0].integrity_alg, 0x01);
        assert_eq!(entries[0].crypt_alg, 0x01);
    }

    #[test]
    fn test_parse_absent_classes_default_to_none() {
        // first record carries only an auth specifier, the trailing OEM
        // record has no specifiers at all
        let data = [0xC0, 0x02, 0x02, 0xC1, 0x30, 0x01, 0x02, 0x03];
        let entries = parse_cipher_suites(&data).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].auth_alg, 0x02);
        assert_eq!(entries[0].integrity_alg, IPMI_INTEGRITY_NONE);
        assert_eq!(entries[0].crypt_alg, IPMI_CRYPT_NONE);

        assert_eq!(entries[1].cipher_suite_id, 0x30);
        assert_eq!(entries[1].kind, CipherSuiteKind::Oem { iana: 0x030201 });
        assert_eq!(entries[1].auth_alg, IPMI_AUTH_RAKP_NONE);
        assert_eq!(entries[1].integrity_alg, IPMI_INTEGRITY_NONE);
        assert_eq!(entries[1].crypt_alg, IPMI_CRYPT_NONE);
    }

    #[test]
    fn test_parse_multiple_records() {
        let data = [
            0xC0, 0x00, 0x00, 0x40, 0x80, // suite 0, all none-by-value
            0xC0, 0x01, 0x01, 0x41, 0x80, // suite 1
            0xC0, 0x02, 0x01, 0x41, 0x81, // suite 2
        ];
        let entries = parse_cipher_suites(&data).unwrap();
        assert_eq!(entries.len(), 3);
        let ids: Vec<u8> = entries.iter().map(|e| e.cipher_suite_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(entries[2].crypt_alg, 0x01);
    }

    #[test]
    fn test_parse_oem_iana_little_endian() {
        let data = [0xC1, 0x30, 0xEF, 0xCD, 0xAB, 0x01];
        let entries = parse_cipher_suites(&data).unwrap();
        assert_eq!(entries[0].kind, CipherSuiteKind::Oem { iana: 0xABCDEF });
        assert_eq!(entries[0].auth_alg, 0x01);
        assert_eq!(entries[0].iana_string(), "abcdef");
    }

    #[test]
    fn test_parse_bad_marker_is_fatal() {
        let err = parse_cipher_suites(&[0x7F, 0x01, 0x01, 0x41, 0x81]).unwrap_err();
        assert_eq!(
            err,
            CipherParseError::BadRecordMarker {
                offset: 0,
                value: 0x7F
            }
        );

        // reserved marker (top bits 11 but neither 0xC0 nor 0xC1) after a good record
        let err = parse_cipher_suites(&[0xC0, 0x01, 0x01, 0x41, 0x81, 0xC5]).unwrap_err();
        assert_eq!(
            err,
            CipherParseError::BadRecordMarker {
                offset: 5,
                value: 0xC5
            }
        );
    }

    #[test]
    fn test_parse_truncated_record_is_fatal() {
        let err = parse_cipher_suites(&[0xC0, 0x01]).unwrap_err();
        assert_eq!(err, CipherParseError::IncompleteRecord { offset: 0 });

        let err = parse_cipher_suites(&[0xC0, 0x01, 0x01, 0x41, 0x81, 0xC1, 0x30, 0x01])
            .unwrap_err();
        assert_eq!(err, CipherParseError::IncompleteRecord { offset: 5 });
    }

    #[test]
    fn test_parse_empty_buffer_yields_no_entries() {
        assert_eq!(parse_cipher_suites(&[]).unwrap(), vec![]);
    }

    #[test]
    fn test_iana_string_formats() {
        let standard = CipherSuiteEntry::new(1, CipherSuiteKind::Standard);
        assert_eq!(standard.iana_string(), "N/A");
        let oem = CipherSuiteEntry::new(0x30, CipherSuiteKind::Oem { iana: 0x1BF2 });
        assert_eq!(oem.iana_string(), "001bf2");
        let oem_zero = CipherSuiteEntry::new(0x30, CipherSuiteKind::Oem { iana: 0 });
        assert_eq!(oem_zero.iana_string(), "N/A");
    }
}
