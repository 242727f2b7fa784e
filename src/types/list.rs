use std::{
    collections::HashSet,
    fmt::Display,
    ops::{Deref, DerefMut},
    vec,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

use crate::{error::Error, parser::Parser};

use super::Address;

/// What to sort a [`List`] by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Address,
    Name,
}

/// Addresses in the order they appeared in the header.
///
/// Nothing is removed when a list is built, so it can hold duplicates and invalid entries.
/// Rendering and most queries work on the deduplicated list.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct List {
    addresses: Vec<Address>,
}

impl Deref for List {
    type Target = [Address];

    fn deref(&self) -> &Self::Target {
        &self.addresses
    }
}

impl DerefMut for List {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.addresses
    }
}

impl From<Vec<Address>> for List {
    fn from(addresses: Vec<Address>) -> Self {
        Self { addresses }
    }
}

impl FromIterator<Address> for List {
    fn from_iter<I: IntoIterator<Item = Address>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for List {
    type Item = Address;
    type IntoIter = vec::IntoIter<Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Address;
    type IntoIter = std::slice::Iter<'a, Address>;

    fn into_iter(self) -> Self::IntoIter {
        self.addresses.iter()
    }
}

impl Display for List {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.uniq().iter().map(|address| address.to_string()).collect();

        write!(f, "{}", rendered.join(", "))
    }
}

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from `(name, address)` pairs, parsing every address.
    pub fn from_pairs<N, A, I>(pairs: I) -> Self
    where
        N: Into<String>,
        A: AsRef<str>,
        I: IntoIterator<Item = (N, A)>,
    {
        pairs
            .into_iter()
            .map(|(name, address)| Address::new(name, address))
            .collect()
    }

    /// Build a list of unnamed addresses, parsing every address.
    pub fn from_slice<A: AsRef<str>, I: IntoIterator<Item = A>>(addresses: I) -> Self {
        Self::from_pairs(addresses.into_iter().map(|address| ("", address)))
    }

    /// Parse the value of a header as it was read by [`mailparse`].
    #[cfg(feature = "mailparse")]
    pub fn from_mail_header(header: &mailparse::MailHeader) -> (Self, bool) {
        Parser::default().parse_list_bytes(header.get_value_raw())
    }

    pub fn push(&mut self, address: Address) {
        self.addresses.push(address)
    }

    /// Parse `address` and add it with the given name, see [`Address::new`].
    pub fn append<N: Into<String>, A: AsRef<str>>(&mut self, name: N, address: A) {
        self.push(Address::new(name, address))
    }

    /// A copy without duplicate addresses, ignoring case. The first one wins.
    pub fn uniq(&self) -> Self {
        let mut seen = HashSet::new();

        self.iter()
            .filter(|address| seen.insert(address.address().to_lowercase()))
            .cloned()
            .collect()
    }

    /// Render the list so it can be used in a mail header as is.
    pub fn to_encoded_string(&self) -> String {
        let rendered: Vec<String> = self
            .uniq()
            .iter()
            .map(|address| address.to_encoded_string())
            .collect();

        rendered.join(", ")
    }

    /// Just the addresses, without names, of the valid entries.
    pub fn to_string_vec(&self) -> Vec<String> {
        self.valid_addresses()
            .iter()
            .map(|address| address.address().to_string())
            .collect()
    }

    /// The errors of all invalid entries, duplicates included.
    pub fn errors(&self) -> Option<Error> {
        let errors: Vec<Error> = self.iter().filter_map(|address| address.error()).collect();

        if errors.is_empty() {
            None
        } else {
            Some(Error::multiple(errors))
        }
    }

    pub fn valid_addresses(&self) -> Self {
        self.uniq()
            .into_iter()
            .filter(|address| address.is_valid())
            .collect()
    }

    pub fn contains_address(&self, address: &str) -> bool {
        self.iter()
            .any(|candidate| eq_fold(candidate.address(), address))
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        self.iter()
            .any(|candidate| eq_fold(candidate.domain(), domain))
    }

    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::Address => self
                .addresses
                .sort_by(|a, b| a.address().cmp(b.address())),
            SortKey::Name => self.addresses.sort_by(|a, b| a.name().cmp(b.name())),
        }
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> crate::error::Result<String> {
        crate::parser::json::to_json(self)
    }

    /// Read a list from any of the shapes it can be deserialized from.
    #[cfg(feature = "json")]
    pub fn from_json(data: &str) -> crate::error::Result<Self> {
        crate::parser::json::from_json(data)
    }
}

fn eq_fold(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
#[serde(
    untagged,
    expecting = "a list of addresses, a list of strings or a comma separated string"
)]
enum ListShape {
    Addresses(Vec<Address>),
    Strings(Vec<String>),
    Header(String),
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for List {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = match ListShape::deserialize(deserializer)? {
            ListShape::Addresses(addresses) => Self::from(addresses),
            ListShape::Strings(addresses) => Self::from_slice(addresses),
            ListShape::Header(header) => {
                let (list, _) = Parser::default().parse_list(header);

                list
            }
        };

        Ok(list)
    }
}
