//! Base64url segment framing.
//!
//! Segments are encoded with the URL-safe alphabet and no padding. Decoding
//! tolerates trailing `=` so tokens produced by padding encoders still parse.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

const URL_SAFE_SEGMENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as an unpadded base64url segment.
pub(crate) fn encode_segment(bytes: &[u8]) -> String {
    URL_SAFE_SEGMENT.encode(bytes)
}

/// Decode a base64url segment.
pub(crate) fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_SEGMENT.decode(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_padding_and_url_alphabet() {
        // 0xfb 0xff encodes to "+/8=" in the standard alphabet.
        let encoded = encode_segment(&[0xfb, 0xff]);
        assert_eq!(encoded, "-_8");
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_decode_accepts_padding() {
        assert_eq!(decode_segment("-_8=").unwrap(), vec![0xfb, 0xff]);
        assert_eq!(decode_segment("-_8").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_decode_rejects_standard_alphabet() {
        assert!(decode_segment("+/8").is_err());
    }
}
