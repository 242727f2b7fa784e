mod entry;
#[cfg(feature = "json")]
pub(crate) mod json;
mod scanner;
pub(crate) mod validate;

use crate::{
    encoding::{CharsetConverter, EncodingConverter},
    error::{Error, Result},
    types::{Address, List},
};

/// Parses mail address headers.
///
/// The only thing that can be configured is how encoded words in a charset other than utf-8,
/// iso-8859-1 or us-ascii are converted.
pub struct Parser {
    converter: Box<dyn CharsetConverter + Send + Sync>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            converter: Box::new(EncodingConverter),
        }
    }

    pub fn converter<C: CharsetConverter + Send + Sync + 'static>(mut self, converter: C) -> Self {
        self.converter = Box::new(converter);

        self
    }

    /// Parse a list of addresses, returning every entry found and whether any of them failed.
    ///
    /// Entries that failed are still in the list, with their error set. Use
    /// [`List::valid_addresses`] to get only the usable ones and [`List::errors`] to report on
    /// the others.
    pub fn parse_list<S: AsRef<str>>(&self, header: S) -> (List, bool) {
        scanner::scan(header.as_ref(), self.converter.as_ref())
    }

    /// Like [`Parser::parse_list`], for headers that may not be valid utf-8.
    ///
    /// Malformed byte sequences end up as an [`crate::ErrorKind::InvalidEncoding`] on the entry
    /// they appear in.
    pub fn parse_list_bytes<B: AsRef<[u8]>>(&self, header: B) -> (List, bool) {
        let header = String::from_utf8_lossy(header.as_ref());

        self.parse_list(header)
    }

    /// Parse exactly one address.
    pub fn parse<S: AsRef<str>>(&self, header: S) -> Result<Address> {
        let (list, _) = self.parse_list(header);

        let mut addresses = list.into_iter();

        let address = match (addresses.next(), addresses.next()) {
            (None, _) => return Err(Error::no_email()),
            (Some(_), Some(_)) => return Err(Error::too_many_emails()),
            (Some(address), None) => address,
        };

        match address.error() {
            Some(error) => Err(error),
            None => Ok(address),
        }
    }
}
