use std::{error, fmt, result};

pub(crate) const INVALID_ENCODING_MESSAGE: &str = "invalid or incomplete multibyte or wide character";
pub(crate) const NO_EMAIL_MESSAGE: &str = "unable to find an email address";
pub(crate) const TOO_MANY_EMAILS_MESSAGE: &str = "only one address expected";
pub(crate) const INVALID_CHARACTER_MESSAGE: &str = "invalid character";

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// The text could not be interpreted, either because the input contained malformed bytes
    /// or because an encoded word declared a charset we could not convert.
    InvalidEncoding,
    /// Control characters, or junk around a bracketed or commented address.
    InvalidCharacter,
    /// No address shaped text was found.
    NoEmail,
    /// Exactly one address was expected but more were found.
    TooManyEmails,
    /// Structured data did not match any of the accepted list shapes.
    Format,
    /// Failed to serialize the given data to JSON.
    SerializeJSON,
    /// One or more entries in a list failed, in order of appearance.
    Multiple(Vec<Error>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    pub fn new<S: Into<String>>(kind: ErrorKind, msg: S) -> Self {
        Self {
            message: msg.into(),
            kind,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn invalid_encoding() -> Self {
        Self::new(ErrorKind::InvalidEncoding, INVALID_ENCODING_MESSAGE)
    }

    pub(crate) fn invalid_character() -> Self {
        Self::new(ErrorKind::InvalidCharacter, INVALID_CHARACTER_MESSAGE)
    }

    pub(crate) fn no_email() -> Self {
        Self::new(ErrorKind::NoEmail, NO_EMAIL_MESSAGE)
    }

    pub(crate) fn too_many_emails() -> Self {
        Self::new(ErrorKind::TooManyEmails, TOO_MANY_EMAILS_MESSAGE)
    }

    /// Combine the errors of several entries into one.
    pub(crate) fn multiple(errors: Vec<Error>) -> Self {
        let mut message = match errors.len() {
            1 => String::from("1 error occurred:\n"),
            count => format!("{} errors occurred:\n", count),
        };

        for error in &errors {
            message.push_str("\t* ");
            message.push_str(error.message());
            message.push('\n');
        }

        Self::new(ErrorKind::Multiple(errors), message)
    }

    /// The individual causes, a single error yields itself.
    pub fn errors(&self) -> Vec<&Error> {
        match self.kind() {
            ErrorKind::Multiple(errors) => errors.iter().collect(),
            _ => vec![self],
        }
    }
}

impl error::Error for Error {}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    fn from(json_error: serde_json::Error) -> Self {
        Error::new(
            ErrorKind::Format,
            format!("Failed to parse address list: {}", json_error),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

macro_rules! failed {
    ($kind:expr, $($arg:tt)*) => {{
        use crate::error::Error;

        let kind = $kind;
        let message = format!($($arg)*);
        return Err(Error::new( kind, message ));
    }};
}

pub(crate) use failed;

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn multiple_message() {
        let single = Error::multiple(vec![Error::no_email()]);

        assert_eq!(
            single.to_string(),
            "1 error occurred:\n\t* unable to find an email address\n"
        );

        let double = Error::multiple(vec![Error::no_email(), Error::invalid_character()]);

        assert!(double.to_string().starts_with("2 errors occurred:"));
        assert_eq!(double.errors().len(), 2);
        assert_eq!(double.errors()[1].kind(), &ErrorKind::InvalidCharacter);
    }

    #[test]
    fn single_errors() {
        let error = Error::too_many_emails();

        assert_eq!(error.errors(), vec![&error]);
        assert_eq!(error.to_string(), TOO_MANY_EMAILS_MESSAGE);
    }
}
