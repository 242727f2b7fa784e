use std::mem;

use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{encoding::CharsetConverter, error::Error, types::List};

use super::{entry::Entry, validate};

// Folded headers are unfolded before scanning.
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\n\x0C\r ]+").expect("valid whitespace regex"));

/// Split `input` into addresses, returning the list and whether any of its entries failed.
///
/// This never fails as a whole: every problem is recorded on the entry it occurred in and
/// scanning continues with the next one.
pub(crate) fn scan(input: &str, converter: &dyn CharsetConverter) -> (List, bool) {
    let input = WHITESPACE.replace_all(input, " ");

    let mut scanner = Scanner::new(converter);

    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let is_last = chars.peek().is_none();

        scanner.feed(c, is_last);
    }

    scanner.finish()
}

struct Scanner<'c> {
    converter: &'c dyn CharsetConverter,
    list: List,
    entry: Entry,
    has_error: bool,
    in_quote: bool,
    in_angle: bool,
    prev: Option<char>,
}

impl<'c> Scanner<'c> {
    fn new(converter: &'c dyn CharsetConverter) -> Self {
        Self {
            converter,
            list: List::new(),
            entry: Entry::default(),
            has_error: false,
            in_quote: false,
            in_angle: false,
            prev: None,
        }
    }

    fn feed(&mut self, c: char, is_last: bool) {
        match c {
            char::REPLACEMENT_CHARACTER => {
                self.entry.raw.push(c);
                self.fail(Error::invalid_encoding());
            }
            // Tab is the only control character we accept.
            '\u{0}'..='\u{8}' | '\u{B}'..='\u{1F}' => {
                self.entry.raw.push(c);
                self.fail(Error::invalid_character());
            }
            // Only ever escapes a quote, never copied to the name or address.
            '\\' => self.entry.raw.push(c),
            '"' => {
                self.entry.raw.push(c);

                if self.in_quote && self.prev == Some('\\') {
                    self.active_buffer().push(c);
                } else {
                    self.in_quote = !self.in_quote;
                }
            }
            '<' if !self.in_quote => {
                self.entry.raw.push(c);
                self.in_angle = true;
            }
            '>' if !self.in_quote => {
                self.entry.raw.push(c);
                self.close_angle(is_last);
            }
            ',' | ';' if !self.in_quote => self.end_entry(),
            c if !self.in_quote && self.in_angle && c.is_whitespace() => self.end_entry(),
            // More text after a complete <angle-addr>, read over it.
            c if !self.in_quote
                && !self.in_angle
                && !self.entry.address.is_empty()
                && !c.is_whitespace() =>
            {
                if self.entry.error.is_none() {
                    self.fail(Error::invalid_character());
                }
            }
            c => {
                self.entry.raw.push(c);
                self.active_buffer().push(c);
            }
        }

        self.prev = Some(c);
    }

    fn fail(&mut self, error: Error) {
        self.entry.error = Some(error);
        self.has_error = true;
    }

    /// `Martin Tour<noij> <martin@example.com>`: the first pair of brackets was part of the
    /// name, as it did not hold an address and something follows it.
    fn close_angle(&mut self, is_last: bool) {
        self.in_angle = false;

        if is_last || validate::is_valid(&self.entry.address) {
            return;
        }

        let address = mem::take(&mut self.entry.address);

        self.entry.name.push(' ');
        self.entry.name.push_str(&address);
        self.entry.error = None;
    }

    fn end_entry(&mut self) {
        let entry = mem::take(&mut self.entry);

        let (address, failed) = entry.finish(self.converter);

        self.has_error = self.has_error || failed;

        if !address.is_empty() {
            trace!(
                "Found address entry '{}' at position {}",
                address.raw(),
                self.list.len()
            );

            self.list.push(address);
        }
    }

    fn active_buffer(&mut self) -> &mut String {
        if self.in_angle {
            &mut self.entry.address
        } else {
            &mut self.entry.name
        }
    }

    fn finish(mut self) -> (List, bool) {
        self.end_entry();

        (self.list, self.has_error)
    }
}
