//! Identifier codec
//!
//! Binary identifiers are stored as raw bytes and rendered as hex or canonical UUID text
//! for callers. Nothing here validates that a 16-byte value is a well-formed UUID.

use crate::errors::StoreError;
use std::collections::HashSet;
use type_mapping::{Record, SqlValue};
use uuid::Uuid;

/// Render bytes in the 4-2-2-2-6 dashed UUID layout.
///
/// Inputs shorter than 16 bytes produce short (or empty) groups; anything past byte 16 lands
/// in the last group.
pub fn id_to_text(bytes: &[u8]) -> String {
    let group = |from: usize, to: Option<usize>| {
        let start = from.min(bytes.len());
        let end = to.map_or(bytes.len(), |to| to.min(bytes.len()));
        hex::encode(&bytes[start..end])
    };

    [
        group(0, Some(4)),
        group(4, Some(6)),
        group(6, Some(8)),
        group(8, Some(10)),
        group(10, None),
    ]
    .join("-")
}

/// Strip dashes and hex-decode
pub fn text_to_id(text: &str) -> Result<Vec<u8>, StoreError> {
    let compact: String = text.chars().filter(|c| *c != '-').collect();
    Ok(hex::decode(compact)?)
}

/// Which 16-byte fields are rendered as plain hex instead of UUID text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NotUuid {
    /// Every 16-byte field is UUID text
    #[default]
    None,
    /// No field is UUID text
    All,
    /// Only the named fields are plain hex
    Fields(HashSet<String>),
}

/// Options for [`buffers_to_hex`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexOptions {
    pub not_uuid: NotUuid,
    /// Fields left untouched
    pub skip: HashSet<String>,
}

impl HexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn never_uuid(mut self) -> Self {
        self.not_uuid = NotUuid::All;
        self
    }

    pub fn plain_hex<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = match self.not_uuid {
            NotUuid::Fields(set) => set,
            _ => HashSet::new(),
        };
        set.extend(fields.into_iter().map(Into::into));
        self.not_uuid = NotUuid::Fields(set);
        self
    }

    pub fn skip<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(fields.into_iter().map(Into::into));
        self
    }

    fn uuid_allowed(&self, field: &str) -> bool {
        match &self.not_uuid {
            NotUuid::None => true,
            NotUuid::All => false,
            NotUuid::Fields(fields) => !fields.contains(field),
        }
    }
}

/// Convert every binary field of a record to text.
///
/// 16-byte values become dashed UUID text unless opted out; all other lengths become plain hex.
pub fn buffers_to_hex(record: Record, options: &HexOptions) -> Record {
    record
        .into_iter()
        .map(|(field, value)| {
            let value = match value {
                SqlValue::Bytes(bytes) if !options.skip.contains(&field) => {
                    if bytes.len() == 16 && options.uuid_allowed(&field) {
                        SqlValue::Text(id_to_text(&bytes))
                    } else {
                        SqlValue::Text(hex::encode(bytes))
                    }
                }
                other => other,
            };
            (field, value)
        })
        .collect()
}

fn looks_like_hex(text: &str) -> bool {
    let mut digits = text.chars().filter(|c| *c != '-').peekable();
    digits.peek().is_some() && digits.all(|c| c.is_ascii_hexdigit())
}

/// Hex-decode every text field that consists of hex digits once dashes are removed.
///
/// This is a heuristic: a business value made only of hex digits (a numeric string, `"cafe"`)
/// is converted too. Fields in `skip` are left alone.
pub fn hex_to_buffers(record: Record, skip: &HashSet<String>) -> Result<Record, StoreError> {
    record
        .into_iter()
        .map(|(field, value)| match value {
            SqlValue::Text(text) if !skip.contains(&field) && looks_like_hex(&text) => {
                let compact: String = text.chars().filter(|c| *c != '-').collect();
                // Odd-length digit strings are not byte sequences
                if compact.len() % 2 == 1 {
                    Ok((field, SqlValue::Text(text)))
                } else {
                    Ok((field, SqlValue::Bytes(hex::decode(compact)?)))
                }
            }
            other => Ok((field, other)),
        })
        .collect()
}

/// New time-ordered identifier as 16 raw bytes
pub fn new_id() -> Vec<u8> {
    Uuid::now_v7().as_bytes().to_vec()
}

/// New time-ordered identifier as UUID text
pub fn new_id_text() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];

    #[test]
    fn test_id_to_text_layout() {
        let text = id_to_text(&SAMPLE);
        assert_eq!(text, "00112233-4455-6677-8899-aabbccddeeff");

        let dashes: Vec<usize> = text
            .char_indices()
            .filter(|(_, c)| *c == '-')
            .map(|(i, _)| i)
            .collect();
        // Byte offsets 4, 6, 8, 10 in hex characters plus preceding dashes
        assert_eq!(dashes, vec![8, 13, 18, 23]);
    }

    #[test]
    fn test_round_trip() {
        for seed in [0u8, 7, 128, 255] {
            let bytes: Vec<u8> = (0..16).map(|i| seed.wrapping_add(i * 17)).collect();
            assert_eq!(text_to_id(&id_to_text(&bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn test_short_input_slices() {
        assert_eq!(id_to_text(&[0xab, 0xcd]), "abcd----");
        assert_eq!(id_to_text(&[]), "----");
    }

    #[test]
    fn test_text_to_id_rejects_non_hex() {
        assert!(matches!(text_to_id("xyz"), Err(StoreError::Codec(_))));
    }

    #[test]
    fn test_buffers_to_hex_options() {
        let mut record = Record::new();
        record.insert("id".into(), SqlValue::Bytes(SAMPLE.to_vec()));
        record.insert("orgId".into(), SqlValue::Bytes(SAMPLE.to_vec()));
        record.insert("secret".into(), SqlValue::Bytes(vec![0x01, 0x02]));
        record.insert("raw".into(), SqlValue::Bytes(vec![0x03]));
        record.insert("name".into(), SqlValue::Text("Jim".into()));

        let options = HexOptions::new().plain_hex(["orgId"]).skip(["raw"]);
        let converted = buffers_to_hex(record.clone(), &options);

        assert_eq!(
            converted["id"],
            SqlValue::Text("00112233-4455-6677-8899-aabbccddeeff".into())
        );
        assert_eq!(
            converted["orgId"],
            SqlValue::Text("00112233445566778899aabbccddeeff".into())
        );
        assert_eq!(converted["secret"], SqlValue::Text("0102".into()));
        assert_eq!(converted["raw"], SqlValue::Bytes(vec![0x03]));
        assert_eq!(converted["name"], SqlValue::Text("Jim".into()));

        let all_hex = buffers_to_hex(record, &HexOptions::new().never_uuid());
        assert_eq!(
            all_hex["id"],
            SqlValue::Text("00112233445566778899aabbccddeeff".into())
        );
    }

    #[test]
    fn test_hex_to_buffers_heuristic() {
        let mut record = Record::new();
        record.insert(
            "id".into(),
            SqlValue::Text("00112233-4455-6677-8899-aabbccddeeff".into()),
        );
        record.insert("name".into(), SqlValue::Text("Jim".into()));
        // Known false positive: an all-digit business value is decoded too
        record.insert("zip".into(), SqlValue::Text("1234".into()));
        record.insert("pin".into(), SqlValue::Text("1234".into()));

        let skip: HashSet<String> = ["pin".to_string()].into_iter().collect();
        let converted = hex_to_buffers(record, &skip).unwrap();

        assert_eq!(converted["id"], SqlValue::Bytes(SAMPLE.to_vec()));
        assert_eq!(converted["name"], SqlValue::Text("Jim".into()));
        assert_eq!(converted["zip"], SqlValue::Bytes(vec![0x12, 0x34]));
        assert_eq!(converted["pin"], SqlValue::Text("1234".into()));
    }

    #[test]
    fn test_new_ids() {
        let id = new_id();
        assert_eq!(id.len(), 16);
        // Version nibble of a v7 UUID
        assert_eq!(id[6] >> 4, 7);
        assert_eq!(new_id_text().len(), 36);
    }
}
