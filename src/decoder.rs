/*!
 * Content decoding for files fetched from the contents API
 *
 * Payloads arrive base64-encoded, wrapped at 60 columns. Bytes that are not
 * valid UTF-8 are dropped rather than failing the file. Under
 * [`DecodePolicy::Strict`] a file that loses too much of its data is
 * reported as a [`DecodeError`] instead of emitting mangled text.
 */

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

use crate::github::RemoteFile;

/// Default share of dropped bytes tolerated under the strict policy
pub const DEFAULT_MAX_LOSS_RATIO: f64 = 0.05;

/// Errors that can occur while decoding one file
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The API did not inline the content (large file, submodule, symlink)
    #[error("content not available from the API")]
    Unavailable,

    /// The payload uses an encoding other than base64
    #[error("unsupported content encoding: {0}")]
    UnsupportedEncoding(String),

    /// The payload is not valid base64
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Too many bytes were not valid text
    #[error("{dropped} of {total} bytes are not valid UTF-8")]
    ExcessiveLoss { dropped: usize, total: usize },
}

/// How invalid text is handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecodePolicy {
    /// Always keep whatever decodes, dropping invalid sequences
    Lossy,
    /// Reject files where more than `max_loss_ratio` of the bytes were dropped
    Strict { max_loss_ratio: f64 },
}

impl Default for DecodePolicy {
    fn default() -> Self {
        Self::Lossy
    }
}

/// Decode a fetched file into text
pub fn decode_file(file: &RemoteFile, policy: DecodePolicy) -> Result<String, DecodeError> {
    match file.encoding.as_deref() {
        Some("base64") | None => {}
        Some("none") => return Err(DecodeError::Unavailable),
        Some(other) => return Err(DecodeError::UnsupportedEncoding(other.to_string())),
    }

    let content = file.content.as_deref().ok_or(DecodeError::Unavailable)?;

    // An empty payload for a non-empty file means the API withheld it
    if content.is_empty() && file.size > 0 {
        return Err(DecodeError::Unavailable);
    }

    decode_content(content, policy)
}

/// Base64-decode `encoded` and interpret the bytes as text
pub fn decode_content(encoded: &str, policy: DecodePolicy) -> Result<String, DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;

    let (text, dropped) = decode_utf8_dropping_invalid(&bytes);

    if let DecodePolicy::Strict { max_loss_ratio } = policy {
        if dropped > 0 && dropped as f64 / bytes.len() as f64 > max_loss_ratio {
            return Err(DecodeError::ExcessiveLoss {
                dropped,
                total: bytes.len(),
            });
        }
    }

    Ok(text)
}

/// Decode UTF-8, skipping invalid sequences; returns the text and dropped byte count
fn decode_utf8_dropping_invalid(bytes: &[u8]) -> (String, usize) {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0;

    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }

    (text, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_decode_plain_text() {
        assert_eq!(decode_content(&encode(b"hello"), DecodePolicy::Lossy).unwrap(), "hello");
        assert_eq!(decode_content("", DecodePolicy::Lossy).unwrap(), "");
    }

    #[test]
    fn test_decode_wrapped_payload() {
        let text = "fn main() {\n    println!(\"a fairly long line so the payload wraps\");\n}\n";
        let wrapped = encode(text.as_bytes())
            .as_bytes()
            .chunks(60)
            .map(|chunk| std::str::from_utf8(chunk).unwrap())
            .collect::<Vec<_>>()
            .join("\n");

        assert_eq!(decode_content(&wrapped, DecodePolicy::Lossy).unwrap(), text);
    }

    #[test]
    fn test_invalid_base64_is_an_error() {
        let result = decode_content("not base64!!", DecodePolicy::Lossy);
        assert!(matches!(result, Err(DecodeError::InvalidBase64(_))));
    }

    #[test]
    fn test_lossy_policy_drops_invalid_bytes() {
        let bytes = [b'a', 0xff, b'b', 0xc3, 0x28, b'c', 0xe2, 0x82];
        let text = decode_content(&encode(&bytes), DecodePolicy::Lossy).unwrap();
        assert_eq!(text, "ab(c");
        // The trailing truncated sequence counts as dropped too
        assert_eq!(decode_utf8_dropping_invalid(&bytes).1, 4);

        let (text, dropped) = decode_utf8_dropping_invalid("héllo".as_bytes());
        assert_eq!(text, "héllo");
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_strict_policy_rejects_binary() {
        let binary: Vec<u8> = (0u8..=255).collect();
        let strict = DecodePolicy::Strict {
            max_loss_ratio: DEFAULT_MAX_LOSS_RATIO,
        };

        match decode_content(&encode(&binary), strict) {
            Err(DecodeError::ExcessiveLoss { dropped, total }) => {
                assert_eq!(total, 256);
                assert_eq!(dropped, 128);
            }
            other => panic!("expected excessive loss, got {:?}", other),
        }

        // A single stray byte in a long file stays under the threshold
        let mut mostly_text = b"x".repeat(100);
        mostly_text.push(0xff);
        let text = decode_content(&encode(&mostly_text), strict).unwrap();
        assert_eq!(text.len(), 100);
    }

    #[test]
    fn test_decode_file_without_content() {
        let withheld = RemoteFile {
            path: "big.bin".to_string(),
            content: Some(String::new()),
            encoding: Some("none".to_string()),
            size: 5_000_000,
        };
        assert!(matches!(
            decode_file(&withheld, DecodePolicy::Lossy),
            Err(DecodeError::Unavailable)
        ));

        let submodule = RemoteFile {
            path: "vendor/lib".to_string(),
            content: None,
            encoding: None,
            size: 0,
        };
        assert!(matches!(
            decode_file(&submodule, DecodePolicy::Lossy),
            Err(DecodeError::Unavailable)
        ));

        let odd = RemoteFile {
            path: "a.txt".to_string(),
            content: Some("abc".to_string()),
            encoding: Some("utf-16".to_string()),
            size: 3,
        };
        assert!(matches!(
            decode_file(&odd, DecodePolicy::Lossy),
            Err(DecodeError::UnsupportedEncoding(_))
        ));

        let empty = RemoteFile {
            path: "empty.txt".to_string(),
            content: Some(String::new()),
            encoding: Some("base64".to_string()),
            size: 0,
        };
        assert_eq!(decode_file(&empty, DecodePolicy::Lossy).unwrap(), "");
    }
}
