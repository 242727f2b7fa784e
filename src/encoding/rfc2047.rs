//! RFC 2047 encoded words, e.g. `=?utf-8?q?m=E2=82=ACrtin?=`.

use data_encoding::BASE64;
use log::debug;

use crate::error::{Error, Result};

use super::converter::CharsetConverter;

const CHARSET: &str = "utf-8";

const MAX_ENCODED_WORD_LEN: usize = 75;

const MAX_CONTENT_LEN: usize = MAX_ENCODED_WORD_LEN - "=?utf-8?q?".len() - "?=".len();

const UPPER_HEX: &[u8; 16] = b"0123456789ABCDEF";

struct EncodedWord<'a> {
    start: usize,
    end: usize,
    charset: &'a str,
    encoding: u8,
    text: &'a str,
}

impl<'a> EncodedWord<'a> {
    /// Locate the next `=?charset?E?text?=` token in `header`.
    ///
    /// Gives up at the first `=?` that does not start a complete token.
    fn find(header: &'a str) -> Option<Self> {
        let start = header.find("=?")?;
        let mut cur = start + 2;

        let charset_len = header[cur..].find('?')?;
        let charset = &header[cur..cur + charset_len];
        cur += charset_len + 1;

        if header.len() < cur + "Q??=".len() {
            return None;
        }

        let encoding = header.as_bytes()[cur];
        cur += 1;

        if header.as_bytes()[cur] != b'?' {
            return None;
        }
        cur += 1;

        let text_len = header[cur..].find("?=")?;

        Some(Self {
            start,
            end: cur + text_len + 2,
            charset,
            encoding,
            text: &header[cur..cur + text_len],
        })
    }

    /// The raw bytes carried by this word, if its encoding is well formed.
    fn payload(&self) -> Option<Vec<u8>> {
        match self.encoding {
            b'B' | b'b' => BASE64.decode(self.text.as_bytes()).ok(),
            b'Q' | b'q' => q_decode(self.text),
            _ => None,
        }
    }
}

/// Replace every encoded word in `header` with its decoded text.
///
/// Malformed words are kept as they are. Whitespace separating two encoded words is dropped.
/// Failing to convert a word's charset fails the whole header.
pub fn decode_header(header: &str, converter: &dyn CharsetConverter) -> Result<String> {
    let first = match header.find("=?") {
        Some(first) => first,
        None => return Ok(header.to_string()),
    };

    let mut decoded = String::with_capacity(header.len());
    decoded.push_str(&header[..first]);

    let mut rest = &header[first..];
    let mut between_words = false;

    while let Some(word) = EncodedWord::find(rest) {
        let content = match word.payload() {
            Some(content) => content,
            None => {
                between_words = false;
                decoded.push_str(&rest[..word.start + 2]);
                rest = &rest[word.start + 2..];
                continue;
            }
        };

        let before = &rest[..word.start];

        if !before.is_empty() && (!between_words || before.bytes().any(|b| !is_space(b))) {
            decoded.push_str(before);
        }

        if let Err(err) = convert(&mut decoded, word.charset, &content, converter) {
            debug!("Failed to decode '{}' text: {}", word.charset, err);

            return Err(err);
        }

        rest = &rest[word.end..];
        between_words = true;
    }

    decoded.push_str(rest);

    Ok(decoded)
}

fn convert(
    out: &mut String,
    charset: &str,
    content: &[u8],
    converter: &dyn CharsetConverter,
) -> Result<()> {
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" => match std::str::from_utf8(content) {
            Ok(text) => out.push_str(text),
            Err(_) => return Err(Error::invalid_encoding()),
        },
        "iso-8859-1" => out.extend(content.iter().map(|&byte| byte as char)),
        "us-ascii" => out.extend(content.iter().map(|&byte| {
            if byte.is_ascii() {
                byte as char
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })),
        _ => out.push_str(&converter.convert(charset, content)?),
    }

    Ok(())
}

fn q_decode(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => decoded.push(b' '),
            b'=' => {
                let high = hex_value(*bytes.get(i + 1)?)?;
                let low = hex_value(*bytes.get(i + 2)?)?;

                decoded.push(high << 4 | low);
                i += 2;
            }
            byte @ (b' '..=b'~' | b'\n' | b'\r' | b'\t') => decoded.push(byte),
            _ => return None,
        }

        i += 1;
    }

    Some(decoded)
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|digit| digit as u8)
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// Q-encode `text` as utf-8 encoded words, or return it unchanged when it is plain printable ascii.
pub fn q_encode(text: &str) -> String {
    encode_words(text, Some(MAX_CONTENT_LEN))
}

/// Like [`q_encode`], but always a single encoded word, however long.
///
/// Needed wherever whitespace would split the text, such as inside `<angle-addr>`.
pub fn q_encode_word(text: &str) -> String {
    encode_words(text, None)
}

fn encode_words(text: &str, max_content_len: Option<usize>) -> String {
    if !needs_encoding(text) {
        return text.to_string();
    }

    let mut encoded = String::with_capacity(text.len() * 2 + 12);
    open_word(&mut encoded);

    let mut current_len = 0;
    let mut buf = [0; 4];

    for c in text.chars() {
        let bytes = c.encode_utf8(&mut buf).as_bytes();

        // Never split a character over two words.
        let encoded_len = if is_q_literal(c) { 1 } else { 3 * bytes.len() };

        if let Some(max) = max_content_len {
            if current_len + encoded_len > max {
                encoded.push_str("?= ");
                open_word(&mut encoded);
                current_len = 0;
            }
        }

        write_q(&mut encoded, bytes);
        current_len += encoded_len;
    }

    encoded.push_str("?=");

    encoded
}

fn needs_encoding(text: &str) -> bool {
    text.bytes()
        .any(|byte| (byte < b' ' || byte > b'~') && byte != b'\t')
}

fn is_q_literal(c: char) -> bool {
    (' '..='~').contains(&c) && !matches!(c, '=' | '?' | '_')
}

fn open_word(out: &mut String) {
    out.push_str("=?");
    out.push_str(CHARSET);
    out.push_str("?q?");
}

fn write_q(out: &mut String, bytes: &[u8]) {
    for &byte in bytes {
        match byte {
            b' ' => out.push('_'),
            b'!'..=b'~' if !matches!(byte, b'=' | b'?' | b'_') => out.push(byte as char),
            _ => {
                out.push('=');
                out.push(UPPER_HEX[(byte >> 4) as usize] as char);
                out.push(UPPER_HEX[(byte & 0x0f) as usize] as char);
            }
        }
    }
}
