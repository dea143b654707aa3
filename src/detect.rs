//! Encoding detection for CSV input.
//!
//! Forum exports arrive either as UTF-8 (usually with a BOM, as written by
//! spreadsheet tools) or in one of the legacy Japanese encodings. Each
//! candidate is tried strictly, in priority order; the first one that
//! decodes the whole input without errors wins.

use crate::error::{Error, Result};
use encoding_rs::{EUC_JP, SHIFT_JIS};
use std::path::Path;

/// UTF-8 byte-order mark
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Candidate source encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SourceEncoding {
    /// UTF-8, with or without a leading BOM
    Utf8Sig,
    /// Shift_JIS restricted to JIS X 0201/0208 (no vendor extensions)
    ShiftJis,
    /// Windows code page 932 (Shift_JIS with NEC/IBM extensions)
    Cp932,
    /// EUC-JP
    EucJp,
}

impl SourceEncoding {
    /// Default detection order.
    pub const PRIORITY: [SourceEncoding; 4] = [
        SourceEncoding::Utf8Sig,
        SourceEncoding::ShiftJis,
        SourceEncoding::Cp932,
        SourceEncoding::EucJp,
    ];

    /// Conventional label of the encoding.
    pub fn label(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8Sig => "utf-8-sig",
            SourceEncoding::ShiftJis => "shift_jis",
            SourceEncoding::Cp932 => "cp932",
            SourceEncoding::EucJp => "euc-jp",
        }
    }

    /// Strictly decodes `data`, returning `None` on any malformed sequence.
    pub fn decode(&self, data: &[u8]) -> Option<String> {
        match self {
            SourceEncoding::Utf8Sig => {
                let body = data.strip_prefix(&UTF8_BOM[..]).unwrap_or(data);
                std::str::from_utf8(body).ok().map(str::to_owned)
            }
            SourceEncoding::ShiftJis => {
                if !is_strict_shift_jis(data) {
                    return None;
                }
                decode_strict(SHIFT_JIS, data)
            }
            SourceEncoding::Cp932 => decode_strict(SHIFT_JIS, data),
            SourceEncoding::EucJp => decode_strict(EUC_JP, data),
        }
    }
}

impl std::fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Decodes with encoding_rs, rejecting replacement characters.
///
/// encoding_rs implements the WHATWG Shift_JIS decoder, which is CP932.
fn decode_strict(encoding: &'static encoding_rs::Encoding, data: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|text| text.into_owned())
}

/// Checks that `data` only uses JIS X 0201 single bytes and JIS X 0208
/// double-byte rows.
///
/// Rejects the NEC special row (lead 0x87), NEC-selected IBM extensions
/// (0xED-0xEE), user-defined rows (0xF0-0xF9) and IBM extensions
/// (0xFA-0xFC), all of which only CP932 accepts.
fn is_strict_shift_jis(data: &[u8]) -> bool {
    let mut i = 0;
    while i < data.len() {
        let lead = data[i];
        match lead {
            0x00..=0x7F | 0xA1..=0xDF => {
                i += 1;
            }
            0x81..=0x86 | 0x88..=0x9F | 0xE0..=0xEA => {
                let Some(&trail) = data.get(i + 1) else {
                    return false;
                };
                if !matches!(trail, 0x40..=0x7E | 0x80..=0xFC) {
                    return false;
                }
                i += 2;
            }
            _ => return false,
        }
    }
    true
}

/// Decodes `data` using the first candidate that succeeds.
pub fn decode_with(data: &[u8], candidates: &[SourceEncoding]) -> Result<(String, SourceEncoding)> {
    for &encoding in candidates {
        if let Some(text) = encoding.decode(data) {
            tracing::debug!(encoding = %encoding, bytes = data.len(), "Decoded input");
            return Ok((text, encoding));
        }
        tracing::debug!(encoding = %encoding, "Decode failed, trying next encoding");
    }

    Err(Error::UnreadableEncoding(
        candidates.iter().map(|e| e.label().to_string()).collect(),
    ))
}

/// Decodes `data` using the default priority order.
pub fn decode(data: &[u8]) -> Result<(String, SourceEncoding)> {
    decode_with(data, &SourceEncoding::PRIORITY)
}

/// Reads and decodes a file using the default priority order.
pub fn decode_file(path: impl AsRef<Path>) -> Result<(String, SourceEncoding)> {
    let data = std::fs::read(path)?;
    decode(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_with_bom_is_stripped() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice("レス番号,内容\n".as_bytes());
        let (text, encoding) = decode(&data).unwrap();
        assert_eq!(encoding, SourceEncoding::Utf8Sig);
        assert_eq!(text, "レス番号,内容\n");
    }

    #[test]
    fn test_utf8_without_bom() {
        let (text, encoding) = decode("abc".as_bytes()).unwrap();
        assert_eq!(encoding, SourceEncoding::Utf8Sig);
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_shift_jis_detected() {
        let (bytes, _, had_errors) = SHIFT_JIS.encode("テスト,内容");
        assert!(!had_errors);
        let (text, encoding) = decode(&bytes).unwrap();
        assert_eq!(encoding, SourceEncoding::ShiftJis);
        assert_eq!(text, "テスト,内容");
    }

    #[test]
    fn test_cp932_extension_falls_through_shift_jis() {
        // Circled digit one is NEC row 13 (0x8740), CP932 only
        let data = [0x87, 0x40, b',', 0x82, 0xA0];
        assert!(!is_strict_shift_jis(&data));
        let (text, encoding) = decode(&data).unwrap();
        assert_eq!(encoding, SourceEncoding::Cp932);
        assert_eq!(text, "①,あ");
    }

    #[test]
    fn test_euc_jp_detected_when_sjis_fails() {
        // 0xFE is never valid in Shift_JIS
        let (kanji, _) = EUC_JP.decode_without_bom_handling(&[0xB0, 0xFE]);
        let source = format!("内容{}", kanji);
        let (bytes, _, had_errors) = EUC_JP.encode(&source);
        assert!(!had_errors);
        let (text, encoding) = decode(&bytes).unwrap();
        assert_eq!(encoding, SourceEncoding::EucJp);
        assert_eq!(text, source);
    }

    #[test]
    fn test_unreadable_lists_all_candidates() {
        // Truncated EUC-JP lead byte followed by 0xFF
        let data = [0x8E, 0xFF, 0xFF];
        match decode(&data) {
            Err(Error::UnreadableEncoding(tried)) => {
                assert_eq!(tried, vec!["utf-8-sig", "shift_jis", "cp932", "euc-jp"]);
            }
            other => panic!("Expected UnreadableEncoding, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_with_custom_order() {
        let (bytes, _, _) = SHIFT_JIS.encode("あ");
        let (_, encoding) = decode_with(&bytes, &[SourceEncoding::Cp932]).unwrap();
        assert_eq!(encoding, SourceEncoding::Cp932);
    }

    #[test]
    fn test_strict_shift_jis_rejects_truncated_pair() {
        assert!(!is_strict_shift_jis(&[0x82]));
        assert!(is_strict_shift_jis(&[0x82, 0xA0, 0xB1]));
    }
}
