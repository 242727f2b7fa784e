use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    encoding::{rfc2047, CharsetConverter},
    error::Error,
    types::Address,
};

// `daemon@example.org (Mailer Daemon)`
static TRAILING_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\n\x0C\r ]+\(.*?\)$").expect("valid comment regex"));

static EMBEDDED_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\t\n\x0C\r <>]+@[^\t\n\x0C\r <>]+\.[^\t\n\x0C\r <>]+")
        .expect("valid address regex")
});

/// The text collected by the scanner for a single address, up to the next separator.
#[derive(Debug, Default)]
pub(crate) struct Entry {
    pub(crate) name: String,
    pub(crate) address: String,
    pub(crate) raw: String,
    pub(crate) error: Option<Error>,
}

impl Entry {
    /// Clean up, decode and validate the entry, returning the address and whether it failed.
    pub(crate) fn finish(mut self, converter: &dyn CharsetConverter) -> (Address, bool) {
        let mut failed = false;

        self.raw = self.raw.trim().to_string();

        // Any encoded word is a single atom, so this only happens once the separators are known.
        let decoded = rfc2047::decode_header(strip_single_quotes(self.name.trim()), converter)
            .and_then(|name| {
                if self.address.contains("=?") {
                    self.address = rfc2047::decode_header(&self.address, converter)?;
                }

                Ok(name)
            });

        match decoded {
            Ok(name) => self.name = name,
            Err(err) => {
                debug!("Failed to decode address entry '{}': {}", self.raw, err);

                self.name.clear();
                self.error = Some(err);

                return (self.into_address(), true);
            }
        }

        // A plain <addr-spec>, possibly followed by a legacy comment, instead of <name-addr>.
        if self.address.is_empty() && !self.name.is_empty() {
            let name = TRAILING_COMMENT.replace(&self.name, "");

            match EMBEDDED_ADDRESS.find(&name) {
                Some(found) => {
                    self.address = found.as_str().to_string();

                    if found.len() != name.len() {
                        self.error = Some(Error::invalid_character());
                        failed = true;
                    }
                }
                None => {
                    self.error = Some(Error::no_email());
                    failed = true;
                }
            }

            self.name.clear();
        }

        let mut address = self.into_address();

        if !address.address().is_empty() && !address.validate() {
            failed = true;
        }

        if failed {
            debug!(
                "Address entry '{}' is invalid: {}",
                address.raw(),
                address.error().map(|err| err.to_string()).unwrap_or_default()
            );
        }

        (address, failed)
    }

    fn into_address(self) -> Address {
        Address::from_entry(self.name, self.address, self.raw, self.error)
    }
}

/// `'Martin Tournoij'` becomes `Martin Tournoij`, as long as there are no other single quotes.
fn strip_single_quotes(name: &str) -> &str {
    if name.chars().count() < 3 {
        return name;
    }

    match name
        .strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
    {
        Some(inner) if !inner.contains('\'') => inner,
        _ => name,
    }
}

#[cfg(test)]
mod test {
    use crate::{encoding::EncodingConverter, error::ErrorKind};

    use super::*;

    fn entry(name: &str, address: &str) -> Entry {
        Entry {
            name: name.to_string(),
            address: address.to_string(),
            raw: format!("  {}<{}>  ", name, address),
            error: None,
        }
    }

    #[test]
    fn angle_address() {
        let (address, failed) = entry("  Martin ", "martin@example.com").finish(&EncodingConverter);

        assert!(!failed);
        assert_eq!(address.name(), "Martin");
        assert_eq!(address.address(), "martin@example.com");
        assert_eq!(address.raw(), "Martin <martin@example.com>");
        assert!(address.is_valid());
    }

    #[test]
    fn single_quotes() {
        assert_eq!(strip_single_quotes("'Martin foo Tournoij'"), "Martin foo Tournoij");
        assert_eq!(
            strip_single_quotes("'Martin' foo 'Tournoij'"),
            "'Martin' foo 'Tournoij'"
        );
        assert_eq!(
            strip_single_quotes("'Martin foo's Tournoij'"),
            "'Martin foo's Tournoij'"
        );
        assert_eq!(strip_single_quotes("''"), "''");
        assert_eq!(strip_single_quotes("'a'"), "a");
    }

    #[test]
    fn comment_address() {
        let (address, failed) = entry("MAILER-DAEMON@example.org (Mail Delivery System)", "")
            .finish(&EncodingConverter);

        assert!(!failed);
        assert_eq!(address.name(), "");
        assert_eq!(address.address(), "MAILER-DAEMON@example.org");
        assert!(address.is_valid());
    }

    #[test]
    fn leftover_text() {
        let (address, failed) =
            entry("heartinternet.co.uk NO-REPLY@heartinternet.co.uk", "").finish(&EncodingConverter);

        assert!(failed);
        assert_eq!(address.address(), "NO-REPLY@heartinternet.co.uk");
        assert_eq!(address.error().unwrap().kind(), &ErrorKind::InvalidCharacter);
    }

    #[test]
    fn no_address() {
        let (address, failed) = entry("invalid", "").finish(&EncodingConverter);

        assert!(failed);
        assert_eq!(address.name(), "");
        assert_eq!(address.address(), "");
        assert_eq!(address.error().unwrap().kind(), &ErrorKind::NoEmail);
        assert!(!address.is_empty());
    }

    #[test]
    fn invalid_address() {
        let (address, failed) = entry("Martin", "martin@localhost").finish(&EncodingConverter);

        assert!(failed);
        assert_eq!(address.name(), "Martin");
        assert_eq!(address.error().unwrap().kind(), &ErrorKind::NoEmail);
    }

    #[test]
    fn keeps_scanner_error() {
        let mut junk = entry("foo", "foo@example.com");
        junk.error = Some(Error::invalid_character());

        let (address, failed) = junk.finish(&EncodingConverter);

        assert!(failed);
        assert_eq!(address.error().unwrap().kind(), &ErrorKind::InvalidCharacter);
    }

    #[test]
    fn invalid_address_replaces_scanner_error() {
        let mut junk = entry("x", "a@b");
        junk.error = Some(Error::invalid_character());

        let (address, failed) = junk.finish(&EncodingConverter);

        assert!(failed);
        assert_eq!(address.address(), "a@b");
        assert_eq!(address.error().unwrap().kind(), &ErrorKind::NoEmail);
    }

    #[test]
    fn encoded_name() {
        let (address, failed) =
            entry("=?iso-8859-1?q?J=F6rg_Doe?=", "joerg@example.com").finish(&EncodingConverter);

        assert!(!failed);
        assert_eq!(address.name(), "Jörg Doe");
    }

    #[test]
    fn encoded_address() {
        let (address, failed) =
            entry("Martin", "=?utf-8?q?f=E2=82=AC@example.com?=").finish(&EncodingConverter);

        assert!(!failed);
        assert_eq!(address.address(), "f€@example.com");
    }

    #[test]
    fn undecodable_name() {
        let (address, failed) =
            entry("=?x-klingon?q?abc?=", "a@example.com").finish(&EncodingConverter);

        assert!(failed);
        assert_eq!(address.name(), "");
        assert_eq!(address.address(), "a@example.com");
        assert_eq!(address.error().unwrap().kind(), &ErrorKind::InvalidEncoding);
    }

    #[test]
    fn empty() {
        let (address, failed) = Entry::default().finish(&EncodingConverter);

        assert!(!failed);
        assert!(address.is_empty());
    }
}
