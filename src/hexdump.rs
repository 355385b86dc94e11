//! Hex dump format used when tracing datagrams.
//!
//! Each byte is written as two lowercase hex digits. Bytes are separated by a
//! single space and every 16th byte is followed by CRLF instead.
//!
//! ```
//! use dtls_bridge::hexdump;
//!
//! let dump = hexdump::format(&[0x16, 0xfe, 0xfd]);
//! assert_eq!(dump, "16 fe fd");
//! assert_eq!(hexdump::parse(&dump).unwrap(), vec![0x16, 0xfe, 0xfd]);
//! ```

use std::fmt::Write;

use nom::bytes::complete::take_while_m_n;
use nom::character::complete::{multispace0, multispace1};
use nom::combinator::{all_consuming, map_res};
use nom::multi::separated_list0;
use nom::sequence::delimited;
use nom::IResult;
use thiserror::Error;

/// Bytes per dump row.
pub const ROW: usize = 16;

/// Format `bytes` as a hex dump.
///
/// The result has no trailing line break.
pub fn format(bytes: &[u8]) -> String {
    let rows = bytes.len() / ROW;
    let mut out = String::with_capacity(bytes.len() * 3 + rows * 2);

    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push_str(if i % ROW == 0 { "\r\n" } else { " " });
        }
        let _ = write!(out, "{:02x}", b);
    }

    out
}

/// Hex dump could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid hex dump at offset {offset}")]
pub struct HexDumpError {
    /// Byte offset into the input where parsing stopped.
    pub offset: usize,
}

/// Parse a hex dump back into bytes.
///
/// Any whitespace is accepted between bytes, so dumps split over several log
/// lines can be concatenated before parsing.
pub fn parse(input: &str) -> Result<Vec<u8>, HexDumpError> {
    let mut parser = all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, hex_byte),
        multispace0,
    ));

    match parser(input) {
        Ok((_, bytes)) => Ok(bytes),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(HexDumpError {
            offset: input.len() - e.input.len(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(HexDumpError {
            offset: input.len(),
        }),
    }
}

fn hex_byte(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), |s: &str| {
        u8::from_str_radix(s, 16)
    })(input)
}
