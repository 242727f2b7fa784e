use std::{fmt::Display, result, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    encoding::rfc2047,
    error::Error,
    parser::{validate, Parser},
};

use super::List;

/// Names containing any of these have to be quoted to survive being parsed again.
const SPECIALS: &[char] = &['"', ',', ';', '@', '<', '>', '(', ')'];

#[derive(Debug, Clone, Default)]
enum Validity {
    #[default]
    Unchecked,
    Valid,
    Invalid(Error),
}

/// A single mail participant, e.g. `"Martin Tournoij" <martin@example.com>`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Address {
    name: String,
    address: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    raw: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    validity: Validity,
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.address == other.address
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.address)
        } else {
            write!(f, "\"{}\" <{}>", escape_quotes(&self.name), self.address)
        }
    }
}

impl<N: Into<String>, A: AsRef<str>> From<(N, A)> for Address {
    fn from((name, address): (N, A)) -> Self {
        Self::new(name, address)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        Parser::default().parse(s)
    }
}

impl Address {
    /// Create an address with the given name, parsing `address` as a single address.
    ///
    /// If `address` can not be parsed the result has an empty address and carries the error.
    pub fn new<N: Into<String>, A: AsRef<str>>(name: N, address: A) -> Self {
        let name = name.into();

        match Parser::default().parse(address) {
            Ok(parsed) => Self {
                name,
                address: parsed.address,
                raw: String::new(),
                validity: parsed.validity,
            },
            Err(error) => Self {
                name,
                address: String::new(),
                raw: String::new(),
                validity: Validity::Invalid(error),
            },
        }
    }

    /// Create an address from its parts as they are, without parsing anything.
    pub fn from_parts<N: Into<String>, A: Into<String>>(name: N, address: A) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            raw: String::new(),
            validity: Validity::Unchecked,
        }
    }

    pub(crate) fn from_entry(
        name: String,
        address: String,
        raw: String,
        error: Option<Error>,
    ) -> Self {
        let validity = match error {
            Some(error) => Validity::Invalid(error),
            None => Validity::Unchecked,
        };

        Self {
            name,
            address,
            raw,
            validity,
        }
    }

    /// The decoded display name, empty if there is none.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// The text this address was parsed from, only useful for diagnostics.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether this holds nothing at all, not even an error.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.address.is_empty()
            && !matches!(self.validity, Validity::Invalid(_))
    }

    pub fn is_valid(&self) -> bool {
        match self.validity {
            Validity::Unchecked => validate::is_valid(&self.address),
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }

    /// Check the address and remember the outcome.
    ///
    /// An address that does not match always ends up with [`ErrorKind::NoEmail`]. An error that
    /// is already recorded on an otherwise valid address is kept.
    ///
    /// [`ErrorKind::NoEmail`]: crate::ErrorKind::NoEmail
    pub fn validate(&mut self) -> bool {
        if !validate::is_valid(&self.address) {
            self.validity = Validity::Invalid(Error::no_email());
        } else if let Validity::Unchecked = self.validity {
            self.validity = Validity::Valid;
        }

        matches!(self.validity, Validity::Valid)
    }

    /// Why this address is not valid, if it isn't.
    pub fn error(&self) -> Option<Error> {
        match &self.validity {
            Validity::Invalid(error) => Some(error.clone()),
            Validity::Valid => None,
            Validity::Unchecked => {
                if validate::is_valid(&self.address) {
                    None
                } else {
                    Some(Error::no_email())
                }
            }
        }
    }

    /// The name, quoted if needed and encoded as RFC 2047 encoded words if it is not ascii.
    pub fn name_encoded(&self) -> String {
        if self.name.is_empty() {
            return String::new();
        }

        if self.name.contains(SPECIALS) {
            let quoted = format!("\"{}\"", escape_quotes(&self.name));

            return rfc2047::q_encode(&quoted);
        }

        rfc2047::q_encode(&self.name)
    }

    /// The address as a single encoded word if it is not ascii.
    pub fn address_encoded(&self) -> String {
        rfc2047::q_encode_word(&self.address)
    }

    /// Render the address so it can be used in a mail header as is.
    ///
    /// Unlike [`Display`], this never outputs anything but printable ascii.
    pub fn to_encoded_string(&self) -> String {
        if self.name.is_empty() {
            return self.address.clone();
        }

        format!("{} <{}>", self.name_encoded(), self.address_encoded())
    }

    /// Everything before the first `@`.
    pub fn local(&self) -> &str {
        match self.address.split_once('@') {
            Some((local, _)) => local,
            None => &self.address,
        }
    }

    /// Everything after the first `@`, or the whole address if there is none.
    pub fn domain(&self) -> &str {
        match self.address.split_once('@') {
            Some((_, domain)) => domain,
            None => &self.address,
        }
    }

    /// The address with its `+tag` removed: `martin+tag@example.com` becomes
    /// `martin@example.com`. Empty if the address is not valid.
    pub fn without_tag(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }

        match (self.address.find('+'), self.address.find('@')) {
            (Some(plus), Some(at)) if plus < at => {
                format!("{}{}", &self.address[..plus], &self.address[at..])
            }
            _ => self.address.clone(),
        }
    }

    pub fn to_list(self) -> List {
        List::from(vec![self])
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> crate::error::Result<String> {
        crate::parser::json::to_json(self)
    }
}

fn escape_quotes(name: &str) -> String {
    name.replace('"', "\\\"")
}
