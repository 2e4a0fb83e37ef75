/*!
 * Character encoding detection for SAMI subtitle files.
 *
 * SMI files almost never declare a charset. Detection walks a fixed priority list
 * of decoders and keeps the first one that decodes every byte without error:
 *
 * 1. UTF-16 with a byte-order mark
 * 2. UTF-8, with an optional byte-order mark stripped
 * 3. CP949 (the windows-949 superset of EUC-KR)
 *
 * This is first-match, not best-match: a file that happens to be valid under an
 * earlier candidate is accepted as such.
 */

use std::fmt;
use std::path::Path;

use encoding_rs::{EUC_KR, UTF_8, UTF_16BE, UTF_16LE};
use log::{debug, info};

use crate::errors::SyncError;
use crate::file_utils::FileManager;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Encoding a document was decoded with, including the framing needed to
/// re-emit it byte for byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-16, normally with a byte-order mark
    Utf16 { big_endian: bool, bom: bool },
    /// UTF-8, optionally preceded by a byte-order mark
    Utf8 { bom: bool },
    /// Korean legacy code page 949
    Cp949,
}

impl TextEncoding {
    /// Short label of the encoding family
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf16 { .. } => "utf-16",
            Self::Utf8 { .. } => "utf-8-sig",
            Self::Cp949 => "cp949",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf16 { big_endian: true, .. } => write!(f, "utf-16 (big endian)"),
            Self::Utf16 { big_endian: false, .. } => write!(f, "utf-16"),
            Self::Utf8 { bom: true } => write!(f, "utf-8-sig"),
            Self::Utf8 { bom: false } => write!(f, "utf-8"),
            Self::Cp949 => write!(f, "cp949"),
        }
    }
}

/// Decoded text together with the encoding that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDocument {
    pub text: String,
    pub encoding: TextEncoding,
}

/// A decoder attempt: returns `None` unless every byte decodes cleanly
type Candidate = fn(&[u8]) -> Option<DecodedDocument>;

// @const: Decoders in priority order
const CANDIDATES: [(&str, Candidate); 3] = [
    ("utf-16", decode_utf16 as Candidate),
    ("utf-8-sig", decode_utf8 as Candidate),
    ("cp949", decode_cp949 as Candidate),
];

fn decode_utf16(bytes: &[u8]) -> Option<DecodedDocument> {
    if bytes.is_empty() {
        return Some(DecodedDocument {
            text: String::new(),
            encoding: TextEncoding::Utf16 { big_endian: false, bom: false },
        });
    }

    let (decoder, big_endian) = if bytes.starts_with(UTF16LE_BOM) {
        (UTF_16LE, false)
    } else if bytes.starts_with(UTF16BE_BOM) {
        (UTF_16BE, true)
    } else {
        return None;
    };

    decoder
        .decode_without_bom_handling_and_without_replacement(&bytes[2..])
        .map(|text| DecodedDocument {
            text: text.into_owned(),
            encoding: TextEncoding::Utf16 { big_endian, bom: true },
        })
}

fn decode_utf8(bytes: &[u8]) -> Option<DecodedDocument> {
    let (body, bom) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (rest, true),
        None => (bytes, false),
    };

    UTF_8
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| DecodedDocument {
            text: text.into_owned(),
            encoding: TextEncoding::Utf8 { bom },
        })
}

fn decode_cp949(bytes: &[u8]) -> Option<DecodedDocument> {
    EUC_KR
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| DecodedDocument {
            text: text.into_owned(),
            encoding: TextEncoding::Cp949,
        })
}

/// Encoding detection and re-encoding
pub struct EncodingDetector;

impl EncodingDetector {
    /// Read `path` fully and decode it with the first candidate that accepts it
    pub fn detect_and_decode<P: AsRef<Path>>(path: P) -> Result<DecodedDocument, SyncError> {
        let path = path.as_ref();
        let bytes = FileManager::read_bytes(path)?;

        let decoded = Self::decode_bytes(&bytes).ok_or_else(|| SyncError::EncodingUnsupported {
            path: path.to_path_buf(),
        })?;

        info!("Detected encoding {} for {:?}", decoded.encoding, path);
        Ok(decoded)
    }

    /// Decode raw bytes, trying each candidate in order
    pub fn decode_bytes(bytes: &[u8]) -> Option<DecodedDocument> {
        CANDIDATES.iter().find_map(|(label, candidate)| {
            let result = candidate(bytes);
            if result.is_none() {
                debug!("Decoding as {} failed, trying next candidate", label);
            }
            result
        })
    }

    /// Encode `text` back into the bytes of `encoding`, re-emitting its BOM if it had one
    pub fn encode(text: &str, encoding: TextEncoding) -> Result<Vec<u8>, SyncError> {
        match encoding {
            TextEncoding::Utf16 { big_endian, bom } => {
                let mut out = Vec::with_capacity(text.len() * 2 + 2);
                if bom {
                    out.extend_from_slice(if big_endian { UTF16BE_BOM } else { UTF16LE_BOM });
                }
                for unit in text.encode_utf16() {
                    let pair = if big_endian { unit.to_be_bytes() } else { unit.to_le_bytes() };
                    out.extend_from_slice(&pair);
                }
                Ok(out)
            }
            TextEncoding::Utf8 { bom } => {
                let mut out = Vec::with_capacity(text.len() + UTF8_BOM.len());
                if bom {
                    out.extend_from_slice(UTF8_BOM);
                }
                out.extend_from_slice(text.as_bytes());
                Ok(out)
            }
            TextEncoding::Cp949 => {
                let (bytes, _, had_unmappable) = EUC_KR.encode(text);
                if had_unmappable {
                    return Err(SyncError::Unencodable {
                        encoding: encoding.to_string(),
                    });
                }
                Ok(bytes.into_owned())
            }
        }
    }
}
