//! Field codec for the OpenSSH wire format (RFC 4251 section 5).
//!
//! Fixed-width integers and length-prefixed strings come from `ssh-encoding`.
//! This module adds the composite types certificates use: `mpint`, string
//! lists and option maps. Every reader is a byte slice that is advanced past
//! the consumed prefix, so `decode(bytes)` leaves the exact remainder behind.

use std::collections::BTreeMap;

use ssh_encoding::{Decode, Encode};

use crate::error::{Result, SshCertError};

pub fn read_u32(reader: &mut &[u8]) -> Result<u32> {
    Ok(u32::decode(reader)?)
}

pub fn read_u64(reader: &mut &[u8]) -> Result<u64> {
    Ok(u64::decode(reader)?)
}

pub fn read_bytes(reader: &mut &[u8]) -> Result<Vec<u8>> {
    Ok(Vec::<u8>::decode(reader)?)
}

pub fn read_string(reader: &mut &[u8]) -> Result<String> {
    Ok(String::decode(reader)?)
}

pub fn write_u32(writer: &mut Vec<u8>, value: u32) -> Result<()> {
    value.encode(writer).map_err(encoding_error)
}

pub fn write_u64(writer: &mut Vec<u8>, value: u64) -> Result<()> {
    value.encode(writer).map_err(encoding_error)
}

pub fn write_bytes(writer: &mut Vec<u8>, value: &[u8]) -> Result<()> {
    value.encode(writer).map_err(encoding_error)
}

pub fn write_str(writer: &mut Vec<u8>, value: &str) -> Result<()> {
    write_bytes(writer, value.as_bytes())
}

/// Reads a non-negative `mpint` and returns its big-endian magnitude without
/// leading zeros. Negative and non-minimal encodings are rejected so that a
/// decoded key re-encodes to the same bytes.
pub fn read_mpint(reader: &mut &[u8]) -> Result<Vec<u8>> {
    let raw = read_bytes(reader)?;
    match raw.as_slice() {
        [] => Ok(raw),
        [first, ..] if first & 0x80 != 0 => {
            Err(SshCertError::Format("negative mpint".to_string()))
        }
        [0] => Err(SshCertError::Format("non-minimal mpint".to_string())),
        [0, second, ..] if second & 0x80 == 0 => {
            Err(SshCertError::Format("non-minimal mpint".to_string()))
        }
        [0, rest @ ..] => Ok(rest.to_vec()),
        _ => Ok(raw),
    }
}

/// Writes a big-endian magnitude as a non-negative `mpint`.
pub fn write_mpint(writer: &mut Vec<u8>, magnitude: &[u8]) -> Result<()> {
    let start = magnitude
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(magnitude.len());
    let trimmed = &magnitude[start..];

    if trimmed.first().is_some_and(|b| b & 0x80 != 0) {
        let mut padded = Vec::with_capacity(trimmed.len() + 1);
        padded.push(0);
        padded.extend_from_slice(trimmed);
        write_bytes(writer, &padded)
    } else {
        write_bytes(writer, trimmed)
    }
}

/// Reads a length-prefixed list of strings.
pub fn read_string_list(reader: &mut &[u8]) -> Result<Vec<String>> {
    let blob = read_bytes(reader)?;
    let mut inner = blob.as_slice();
    let mut items = Vec::new();
    while !inner.is_empty() {
        items.push(read_string(&mut inner)?);
    }
    Ok(items)
}

pub fn write_string_list(writer: &mut Vec<u8>, items: &[String]) -> Result<()> {
    let mut blob = Vec::new();
    for item in items {
        write_str(&mut blob, item)?;
    }
    write_bytes(writer, &blob)
}

/// Reads an option map (critical options or extensions).
///
/// Entries are `string name, string data`; `data` is empty for an empty value
/// and otherwise holds the value as a nested string. Names must be strictly
/// increasing, which is the only order the encoder produces.
pub fn read_option_map(reader: &mut &[u8]) -> Result<BTreeMap<String, String>> {
    let blob = read_bytes(reader)?;
    let mut inner = blob.as_slice();
    let mut map = BTreeMap::new();
    let mut previous: Option<String> = None;

    while !inner.is_empty() {
        let name = read_string(&mut inner)?;
        let data = read_bytes(&mut inner)?;

        if previous.as_ref().is_some_and(|p| *p >= name) {
            return Err(SshCertError::Format(format!(
                "option {name:?} is out of order or duplicated"
            )));
        }

        let value = if data.is_empty() {
            String::new()
        } else {
            let mut nested = data.as_slice();
            let value = read_string(&mut nested)?;
            ensure_consumed(nested, "option value")?;
            if value.is_empty() {
                return Err(SshCertError::Format(format!(
                    "option {name:?} wraps an empty value"
                )));
            }
            value
        };

        previous = Some(name.clone());
        map.insert(name, value);
    }

    Ok(map)
}

pub fn write_option_map(writer: &mut Vec<u8>, map: &BTreeMap<String, String>) -> Result<()> {
    let mut blob = Vec::new();
    for (name, value) in map {
        write_str(&mut blob, name)?;
        if value.is_empty() {
            write_bytes(&mut blob, &[])?;
        } else {
            let mut data = Vec::new();
            write_str(&mut data, value)?;
            write_bytes(&mut blob, &data)?;
        }
    }
    write_bytes(writer, &blob)
}

/// Fails if `remaining` still holds data after `what` was fully parsed.
pub fn ensure_consumed(remaining: &[u8], what: &str) -> Result<()> {
    if remaining.is_empty() {
        Ok(())
    } else {
        Err(SshCertError::Format(format!(
            "{} trailing byte(s) after {what}",
            remaining.len()
        )))
    }
}

/// Left-pads a big-endian magnitude to `width` bytes.
pub fn pad_to(magnitude: &[u8], width: usize) -> Result<Vec<u8>> {
    let start = magnitude
        .iter()
        .position(|b| *b != 0)
        .unwrap_or(magnitude.len());
    let trimmed = &magnitude[start..];
    if trimmed.len() > width {
        return Err(SshCertError::Format(format!(
            "integer of {} bytes does not fit in {width}",
            trimmed.len()
        )));
    }
    let mut out = vec![0u8; width - trimmed.len()];
    out.extend_from_slice(trimmed);
    Ok(out)
}

fn encoding_error(err: ssh_encoding::Error) -> SshCertError {
    SshCertError::Encoding(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpint_matches_rfc4251_examples() {
        let mut out = Vec::new();
        write_mpint(&mut out, &[]).unwrap();
        assert_eq!(out, [0u8, 0, 0, 0]);

        out.clear();
        write_mpint(&mut out, &[0x80]).unwrap();
        assert_eq!(out, [0u8, 0, 0, 2, 0x00, 0x80]);

        out.clear();
        write_mpint(&mut out, &[0x00, 0x00, 0x09, 0xa3]).unwrap();
        assert_eq!(out, [0u8, 0, 0, 2, 0x09, 0xa3]);

        let mut reader: &[u8] = &[0, 0, 0, 2, 0x00, 0x80, 0xff];
        assert_eq!(read_mpint(&mut reader).unwrap(), vec![0x80]);
        assert_eq!(reader, &[0xffu8]);
    }

    #[test]
    fn mpint_rejects_negative_and_padded_values() {
        let mut negative: &[u8] = &[0, 0, 0, 1, 0x80];
        assert!(matches!(
            read_mpint(&mut negative),
            Err(SshCertError::Format(_))
        ));

        let mut padded: &[u8] = &[0, 0, 0, 2, 0x00, 0x01];
        assert!(matches!(
            read_mpint(&mut padded),
            Err(SshCertError::Format(_))
        ));
    }

    #[test]
    fn option_map_encodes_values_as_nested_strings() {
        let mut map = BTreeMap::new();
        map.insert("permit-pty".to_string(), String::new());
        map.insert("force-command".to_string(), "ls".to_string());

        let mut out = Vec::new();
        write_option_map(&mut out, &map).unwrap();

        let expected: Vec<u8> = [
            &[0, 0, 0, 45][..],
            &[0, 0, 0, 13],
            b"force-command",
            &[0, 0, 0, 6, 0, 0, 0, 2],
            b"ls",
            &[0, 0, 0, 10],
            b"permit-pty",
            &[0, 0, 0, 0],
        ]
        .concat();
        assert_eq!(out, expected);

        let mut reader = out.as_slice();
        assert_eq!(read_option_map(&mut reader).unwrap(), map);
        assert!(reader.is_empty());
    }

    #[test]
    fn option_map_rejects_unsorted_names() {
        let mut blob = Vec::new();
        write_str(&mut blob, "permit-pty").unwrap();
        write_bytes(&mut blob, &[]).unwrap();
        write_str(&mut blob, "force-command").unwrap();
        write_bytes(&mut blob, &[]).unwrap();

        let mut out = Vec::new();
        write_bytes(&mut out, &blob).unwrap();

        let mut reader = out.as_slice();
        assert!(matches!(
            read_option_map(&mut reader),
            Err(SshCertError::Format(_))
        ));
    }

    #[test]
    fn truncated_string_is_a_format_error() {
        let mut reader: &[u8] = &[0, 0, 0, 5, b'a', b'b'];
        assert!(matches!(
            read_string(&mut reader),
            Err(SshCertError::Format(_))
        ));
    }

    #[test]
    fn string_list_round_trips_with_remainder() {
        let mut out = Vec::new();
        write_string_list(&mut out, &["alice".to_string(), "bob".to_string()]).unwrap();
        out.push(7);

        let mut reader = out.as_slice();
        assert_eq!(
            read_string_list(&mut reader).unwrap(),
            vec!["alice".to_string(), "bob".to_string()]
        );
        assert_eq!(reader, &[7u8]);
    }
}
