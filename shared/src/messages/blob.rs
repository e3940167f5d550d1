use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// How a blob's byte payload is encoded on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlobEncoding {
    /// Bytes carried as-is.
    Raw,
    /// Bytes passed through zstd. Requires the `zstd_support` feature on
    /// the receiving side; a build without it reports the blob as
    /// undecodable rather than guessing.
    Zstd,
}

/// An opaque byte payload with a type tag identifying how to reinterpret it.
///
/// Observation payloads and shape descriptors travel as blobs so the message
/// schema never needs to know their internal layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub tag: String,
    pub encoding: BlobEncoding,
    pub bytes: Vec<u8>,
}

impl Blob {
    /// Tag used for serialized [`crate::space::Space`] descriptors.
    pub const SPACE_TAG: &'static str = "simlink/space";

    /// Wraps `bytes` into a blob, compressing when the encoding asks for it.
    pub fn pack(tag: &str, bytes: &[u8], encoding: BlobEncoding) -> Result<Self, CodecError> {
        let payload = match encoding {
            BlobEncoding::Raw => bytes.to_vec(),
            BlobEncoding::Zstd => compress(bytes)?,
        };
        Ok(Self {
            tag: tag.to_string(),
            encoding,
            bytes: payload,
        })
    }

    /// Recovers the original bytes.
    pub fn unpack(&self) -> Result<Vec<u8>, CodecError> {
        match self.encoding {
            BlobEncoding::Raw => Ok(self.bytes.clone()),
            BlobEncoding::Zstd => decompress(&self.bytes),
        }
    }
}

cfg_if! {
    if #[cfg(feature = "zstd_support")] {
        const COMPRESSION_LEVEL: i32 = 3;

        fn compress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
            zstd::bulk::compress(bytes, COMPRESSION_LEVEL)
                .map_err(|_| CodecError::CompressionFailed { payload_size: bytes.len() })
        }

        fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
            zstd::stream::decode_all(bytes)
                .map_err(|_| CodecError::DecompressionFailed { payload_size: bytes.len() })
        }
    } else {
        fn compress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
            let _ = bytes;
            Err(CodecError::UnsupportedEncoding { encoding: "zstd" })
        }

        fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
            let _ = bytes;
            Err(CodecError::UnsupportedEncoding { encoding: "zstd" })
        }
    }
}
