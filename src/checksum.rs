//! Streaming checksums
//!
//! `crc32` is built in; every other algorithm is a named digest resolved lazily, so an
//! unknown name is only reported when the first bytes arrive (or at finalisation).

use crate::error::FileError;
use md5::Md5;
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::fmt;

/// Name of the built-in 32-bit checksum
pub const CRC32: &str = "crc32";

/// Digest names accepted besides [`CRC32`]
pub const DIGESTS: &[&str] = &[
    "md5", "sha1", "sha224", "sha256", "sha384", "sha512", "blake3",
];

/// Result of a checksum computation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Checksum {
    /// Unsigned 32-bit CRC
    Crc32(u32),
    /// Lowercase hexadecimal digest
    Hex(String),
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checksum::Crc32(value) => write!(f, "{}", value),
            Checksum::Hex(digest) => f.write_str(digest),
        }
    }
}

enum Engine {
    Crc32(flate2::Crc),
    Md5(Md5),
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl Engine {
    fn resolve(algorithm: &str) -> Result<Self, FileError> {
        let engine = match algorithm.to_ascii_lowercase().as_str() {
            CRC32 => Engine::Crc32(flate2::Crc::new()),
            "md5" => Engine::Md5(Md5::new()),
            "sha1" => Engine::Sha1(Sha1::new()),
            "sha224" => Engine::Sha224(Sha224::new()),
            "sha256" => Engine::Sha256(Sha256::new()),
            "sha384" => Engine::Sha384(Sha384::new()),
            "sha512" => Engine::Sha512(Sha512::new()),
            "blake3" => Engine::Blake3(Box::new(blake3::Hasher::new())),
            _ => return Err(FileError::UnsupportedAlgorithm(algorithm.to_string())),
        };
        Ok(engine)
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Engine::Crc32(crc) => crc.update(data),
            Engine::Md5(digest) => digest.update(data),
            Engine::Sha1(digest) => digest.update(data),
            Engine::Sha224(digest) => digest.update(data),
            Engine::Sha256(digest) => digest.update(data),
            Engine::Sha384(digest) => digest.update(data),
            Engine::Sha512(digest) => digest.update(data),
            Engine::Blake3(hasher) => {
                hasher.update(data);
            }
        }
    }

    fn finalize(self) -> Checksum {
        match self {
            Engine::Crc32(crc) => Checksum::Crc32(crc.sum()),
            Engine::Md5(digest) => Checksum::Hex(hex::encode(digest.finalize())),
            Engine::Sha1(digest) => Checksum::Hex(hex::encode(digest.finalize())),
            Engine::Sha224(digest) => Checksum::Hex(hex::encode(digest.finalize())),
            Engine::Sha256(digest) => Checksum::Hex(hex::encode(digest.finalize())),
            Engine::Sha384(digest) => Checksum::Hex(hex::encode(digest.finalize())),
            Engine::Sha512(digest) => Checksum::Hex(hex::encode(digest.finalize())),
            Engine::Blake3(hasher) => Checksum::Hex(hasher.finalize().to_hex().to_string()),
        }
    }
}

/// An updatable checksum over one algorithm.
///
/// Construction never fails. The algorithm name is resolved on the first
/// [`Checksummer::update`] or on [`Checksummer::finalize`].
pub struct Checksummer {
    algorithm: String,
    engine: Option<Engine>,
}

impl Checksummer {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            engine: None,
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Feed more bytes
    pub fn update(&mut self, data: &[u8]) -> Result<(), FileError> {
        match &mut self.engine {
            Some(engine) => engine.update(data),
            None => {
                let mut engine = Engine::resolve(&self.algorithm)?;
                engine.update(data);
                self.engine = Some(engine);
            }
        }
        Ok(())
    }

    /// Consume the checksummer and produce the value
    pub fn finalize(self) -> Result<Checksum, FileError> {
        let engine = match self.engine {
            Some(engine) => engine,
            None => Engine::resolve(&self.algorithm)?,
        };
        Ok(engine.finalize())
    }
}

/// True when `algorithm` names a checksum this module can compute
pub fn is_supported(algorithm: &str) -> bool {
    Engine::resolve(algorithm).is_ok()
}

/// Checksum a byte slice in one go
pub fn checksum_bytes(algorithm: &str, data: &[u8]) -> Result<Checksum, FileError> {
    let mut checksummer = Checksummer::new(algorithm);
    checksummer.update(data)?;
    checksummer.finalize()
}
