use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, ErrorKind, Result};

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|err| {
        Error::new(
            ErrorKind::SerializeJSON,
            format!("Failed to serialize addresses to json: {}", err),
        )
    })
}

pub(crate) fn from_json<T: DeserializeOwned>(data: &str) -> Result<T> {
    let value = serde_json::from_str(data)?;

    Ok(value)
}
