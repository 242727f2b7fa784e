//! A forgiving parser for the address headers of mail messages (`From`, `To`, `Cc`).
//!
//! Instead of rejecting a whole header when part of it is malformed, every entry is parsed on
//! its own and carries its own error:
//!
//! ```
//! let (list, has_error) = dust_mail_address::parse_list("Martin <martin@example.com>, invalid");
//!
//! assert!(has_error);
//! assert_eq!(list.valid_addresses().to_string(), r#""Martin" <martin@example.com>"#);
//! assert_eq!(list.errors().unwrap().errors().len(), 1);
//! ```

pub mod encoding;
mod error;
mod parser;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use parser::Parser;
pub use types::{Address, List, SortKey};

/// Parse a list of addresses with the default [`Parser`].
pub fn parse_list<S: AsRef<str>>(header: S) -> (List, bool) {
    Parser::default().parse_list(header)
}

/// Parse a list of addresses that may not be valid utf-8 with the default [`Parser`].
pub fn parse_list_bytes<B: AsRef<[u8]>>(header: B) -> (List, bool) {
    Parser::default().parse_list_bytes(header)
}

/// Parse exactly one address with the default [`Parser`].
pub fn parse<S: AsRef<str>>(header: S) -> Result<Address> {
    Parser::default().parse(header)
}
