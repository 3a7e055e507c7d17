use core::{
    fmt::{Binary, Display, LowerExp, LowerHex, Octal, Pointer, UpperExp, UpperHex},
    ops::Deref,
};
use std::path::PathBuf;

use anyhow::{ensure, Context as _, Result};
use jwt_simple::{
    algorithms::{HS256Key, MACLike as _},
    claims::Claims,
    prelude::Duration,
};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use static_assertions::assert_not_impl_any;
use thiserror::Error;
use zeroize::Zeroizing;

#[cfg(test)]
use derive_more::Debug;

const JWT_SECRET_SIZE_MIN_BYTES: usize = 32;
const JWT_VALIDITY: Duration = Duration::from_secs(60);

#[derive(Debug)]
#[cfg_attr(test, derive(Default))]
pub struct Options {
    pub secrets_path: Option<PathBuf>,
    pub id: Option<String>,
    pub version: Option<String>,
}

// Custom claims defined in the Engine API authentication document.
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct JwtClaims {
    id: Option<String>,
    clv: Option<String>,
}

/// Signs every request to the execution client with a fresh token.
#[derive(Default)]
#[cfg_attr(test, derive(Debug))]
pub struct Auth {
    secret: Option<Secret>,
    id: Option<String>,
    version: Option<String>,
}

// Neither `Auth` nor `Secret` may leak the key through cloning, formatting or serialization.
assert_not_impl_any! {
    Auth:

    Clone,
    Copy,
    Deref,
    ToOwned,

    Binary,
    Display,
    LowerExp,
    LowerHex,
    Octal,
    Pointer,
    UpperExp,
    UpperHex,

    Serialize,
}

impl Auth {
    pub fn new(options: Options) -> Result<Self> {
        let Options {
            secrets_path,
            id,
            version,
        } = options;

        let secret = secrets_path
            .map(|path| {
                let contents = fs_err::read(path).map(Zeroizing::new)?;
                Secret::from_hex(contents.as_slice())
            })
            .transpose()?;

        Ok(Self {
            secret,
            id,
            version,
        })
    }

    /// Returns the value of the `Authorization` header, or [`None`] if no secret is configured.
    pub fn authorization(&self) -> Result<Option<HeaderValue>> {
        let Some(secret) = &self.secret else {
            return Ok(None);
        };

        let claims = Claims::with_custom_claims(
            JwtClaims {
                id: self.id.clone(),
                clv: self.version.clone(),
            },
            JWT_VALIDITY,
        );

        let token = Zeroizing::new(secret.key.authenticate(claims)?);
        let bearer = Zeroizing::new(format!("Bearer {}", *token));

        let mut value = HeaderValue::from_str(bearer.as_str())?;
        value.set_sensitive(true);

        Ok(Some(value))
    }
}

#[cfg_attr(test, derive(Debug))]
#[cfg_attr(test, debug("[REDACTED]"))]
struct Secret {
    key: HS256Key,
}

assert_not_impl_any! {
    Secret:

    Clone,
    Copy,
    Deref,
    ToOwned,

    Binary,
    Display,
    LowerExp,
    LowerHex,
    Octal,
    Pointer,
    UpperExp,
    UpperHex,

    Serialize,
}

impl Secret {
    // Secret files are commonly written by hand or by `openssl rand -hex 32 > jwt.hex`.
    fn from_hex(contents: &[u8]) -> Result<Self> {
        let digits = contents.trim_ascii();
        let digits = digits.strip_prefix(b"0x").unwrap_or(digits);

        let bytes = const_hex::decode(digits)
            .map(Zeroizing::new)
            .context(JwtSecretError::InvalidSecret)?;

        ensure!(
            bytes.len() >= JWT_SECRET_SIZE_MIN_BYTES,
            JwtSecretError::IncorrectSize,
        );

        Ok(Self {
            key: HS256Key::from_bytes(bytes.as_slice()),
        })
    }
}

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
enum JwtSecretError {
    #[error("JWT secret must be at least {JWT_SECRET_SIZE_MIN_BYTES} bytes")]
    IncorrectSize,
    #[error("failed to parse JWT secret")]
    InvalidSecret,
}
