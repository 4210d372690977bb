use crate::base62::{self, EncodeError};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

/// A validated short code identifying a [`Mapping`](crate::Mapping).
///
/// Short codes are 1-32 characters long and only contain base62 symbols.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortCode(SmolStr);

const MIN_LENGTH: usize = 1;
const MAX_LENGTH: usize = 32;

impl ShortCode {
    /// Creates a `ShortCode` by base62-encoding a non-negative id.
    ///
    /// # Examples
    ///
    /// ```
    /// use snowlink_core::ShortCode;
    ///
    /// let code = ShortCode::from_id(12345).unwrap();
    /// assert_eq!(code.as_str(), "3d7");
    /// assert!(ShortCode::from_id(-1).is_err());
    /// ```
    pub fn from_id(id: i64) -> std::result::Result<Self, EncodeError> {
        base62::encode(id).map(|encoded| Self(SmolStr::new(encoded)))
    }

    /// Creates a new `ShortCode` after validating the input.
    pub fn new(code: impl AsRef<str>) -> std::result::Result<Self, CoreError> {
        let code = code.as_ref();
        Self::validate(code)?;
        Ok(Self(SmolStr::new(code)))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes produced by trusted internal sources
    /// (e.g. rows read back from the store).
    pub fn new_unchecked(code: impl AsRef<str>) -> Self {
        Self(SmolStr::new(code.as_ref()))
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(code: &str) -> std::result::Result<(), CoreError> {
        if code.len() < MIN_LENGTH || code.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortCode(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                code.len()
            )));
        }

        if !base62::is_base62(code) {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only base62 characters: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ShortCode {
    type Error = CoreError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShortCode> for String {
    fn from(value: ShortCode) -> Self {
        value.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert!(ShortCode::new("0").is_ok());
        assert!(ShortCode::new("aMoY42").is_ok());
        assert!(ShortCode::new("a".repeat(32)).is_ok());
    }

    #[test]
    fn empty_is_rejected() {
        assert!(ShortCode::new("").is_err());
    }

    #[test]
    fn too_long() {
        assert!(ShortCode::new("a".repeat(33)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortCode::new("abc def").is_err());
        assert!(ShortCode::new("abc/def").is_err());
        assert!(ShortCode::new("abc-def").is_err());
        assert!(ShortCode::new("abc_def").is_err());
        assert!(ShortCode::new("caf\u{e9}").is_err());
    }

    #[test]
    fn from_id_encodes_base62() {
        assert_eq!(ShortCode::from_id(0).unwrap().as_str(), "0");
        assert_eq!(ShortCode::from_id(9876543210).unwrap().as_str(), "aMoY42");
    }

    #[test]
    fn from_negative_id_fails() {
        assert_eq!(
            ShortCode::from_id(-5),
            Err(EncodeError::Negative(-5))
        );
    }

    #[test]
    fn display() {
        let code = ShortCode::new("my0code").unwrap();
        assert_eq!(code.to_string(), "my0code");
    }

    #[test]
    fn to_url() {
        let code = ShortCode::new("abc123").unwrap();
        assert_eq!(code.to_url("https://snow.link"), "https://snow.link/abc123");
        assert_eq!(code.to_url("https://snow.link/"), "https://snow.link/abc123");
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let code: ShortCode = serde_json::from_str("\"3d7\"").unwrap();
        assert_eq!(code.as_str(), "3d7");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"3d7\"");
        assert!(serde_json::from_str::<ShortCode>("\"not/valid\"").is_err());
    }
}
