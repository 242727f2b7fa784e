mod converter;
pub mod rfc2047;

pub use self::converter::{CharsetConverter, EncodingConverter};
