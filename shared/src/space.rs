use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::messages::{Blob, BlobEncoding};

/// Shape descriptor for an action or observation.
///
/// The wire carries spaces as opaque serialized blobs (see [`Space::to_blob`])
/// so the message schema stays independent of the descriptor vocabulary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// Fixed-length vector bounded per dimension. `low` and `high` have the
    /// same length, which is the expected action length.
    Continuous { low: Vec<f64>, high: Vec<f64> },
    /// A single choice out of `n` alternatives.
    Discrete { n: u64 },
    /// Named sub-spaces, each validated independently.
    Composite { fields: BTreeMap<String, Space> },
}

/// A concrete value submitted against a [`Space`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ActionValue {
    Continuous(Vec<f64>),
    Discrete(u64),
    Composite(BTreeMap<String, ActionValue>),
}

impl Space {
    /// Whether `value` satisfies this shape contract. Used on the server
    /// side before a requested action is applied; a failing value is dropped
    /// without being applied.
    pub fn contains(&self, value: &ActionValue) -> bool {
        match (self, value) {
            (Space::Continuous { low, high }, ActionValue::Continuous(values)) => {
                values.len() == low.len()
                    && values
                        .iter()
                        .zip(low.iter().zip(high.iter()))
                        .all(|(v, (lo, hi))| v.is_finite() && *v >= *lo && *v <= *hi)
            }
            (Space::Discrete { n }, ActionValue::Discrete(choice)) => choice < n,
            (Space::Composite { fields }, ActionValue::Composite(values)) => {
                fields.len() == values.len()
                    && fields.iter().all(|(name, sub)| {
                        values.get(name).is_some_and(|value| sub.contains(value))
                    })
            }
            _ => false,
        }
    }

    /// Serializes this descriptor into an opaque tagged blob.
    pub fn to_blob(&self, encoding: BlobEncoding) -> Result<Blob, CodecError> {
        let bytes = postcard::to_allocvec(self)
            .map_err(|err| CodecError::SerializeFailed(err.to_string()))?;
        Blob::pack(Blob::SPACE_TAG, &bytes, encoding)
    }

    /// Decodes a descriptor previously produced by [`Space::to_blob`].
    pub fn from_blob(blob: &Blob) -> Result<Self, CodecError> {
        let bytes = blob.unpack()?;
        postcard::from_bytes(&bytes).map_err(|_| CodecError::MalformedDescriptor)
    }
}
