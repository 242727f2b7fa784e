use charset::Charset;

use crate::error::{failed, ErrorKind, Result};

/// Converts bytes in some declared charset to a unicode string.
///
/// The decoder only calls this for charsets it does not handle itself (anything other than
/// utf-8, iso-8859-1 and us-ascii). Any state an implementation needs must be set up and torn
/// down within a single call.
pub trait CharsetConverter {
    fn convert(&self, charset: &str, bytes: &[u8]) -> Result<String>;
}

impl<F> CharsetConverter for F
where
    F: Fn(&str, &[u8]) -> Result<String>,
{
    fn convert(&self, charset: &str, bytes: &[u8]) -> Result<String> {
        self(charset, bytes)
    }
}

/// The default converter, backed by the WHATWG encoding tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EncodingConverter;

impl CharsetConverter for EncodingConverter {
    fn convert(&self, label: &str, bytes: &[u8]) -> Result<String> {
        let charset = match Charset::for_label_no_replacement(label.as_bytes()) {
            Some(charset) => charset,
            None => failed!(
                ErrorKind::InvalidEncoding,
                "unsupported charset '{}'",
                label
            ),
        };

        let (decoded, malformed) = charset.decode_without_bom_handling(bytes);

        if malformed {
            failed!(
                ErrorKind::InvalidEncoding,
                "invalid or incomplete multibyte or wide character in '{}' text",
                label
            );
        }

        Ok(decoded.into_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_charsets() {
        let converter = EncodingConverter;

        assert_eq!(
            converter.convert("iso-8859-2", b"Bogl\xe1rka").unwrap(),
            "Boglárka"
        );
        assert_eq!(
            converter.convert("KOI8-R", b"\xf7\xcc\xc1\xc4").unwrap(),
            "Влад"
        );
    }

    #[test]
    fn unknown_charset() {
        let error = EncodingConverter.convert("x-klingon", b"abc").unwrap_err();

        assert_eq!(error.kind(), &ErrorKind::InvalidEncoding);
        assert!(error.message().contains("x-klingon"));
    }

    #[test]
    fn malformed_bytes() {
        let error = EncodingConverter.convert("shift_jis", b"\x82").unwrap_err();

        assert_eq!(error.kind(), &ErrorKind::InvalidEncoding);
    }

    #[test]
    fn closures() {
        let upper = |_: &str, bytes: &[u8]| -> Result<String> {
            Ok(String::from_utf8_lossy(bytes).to_uppercase())
        };

        assert_eq!(upper.convert("anything", b"abc").unwrap(), "ABC");
    }
}
