//! Binary encoding for persistent containers.
//!
//! Every container in this crate can be written to and read back from a
//! compact, self-describing binary frame:
//!
//! ```text
//! +--------+---------+--------+-------------+---------------------------+
//! | "PSTA" | version | kind   | fingerprint | bincode payload           |
//! | 4 byte | 1 byte  | 1 byte | 8 byte (LE) | varint integers, no slack |
//! +--------+---------+--------+-------------+---------------------------+
//! ```
//!
//! The header names the container kind that wrote the frame and carries a
//! fingerprint of its element types (the key and value types for maps), so
//! a frame is only accepted by the type that produced it. The payload is the
//! container's serde representation (for ordered containers, the elements in
//! order). Decoding never panics on malformed input: a short frame, a
//! foreign header, an unknown version, a frame of another kind or element
//! type, a truncated or corrupt payload, and trailing bytes all surface as
//! [`CodecError`].
//!
//! Fingerprints are derived from Rust type names, so a frame is tied to the
//! element types' names as the compiler reports them.
//!
//! # Examples
//!
//! ```rust
//! use persista::codec::{self, FrameKind};
//! use persista::persistent::{OrderedIndexMap, PersistentSequence};
//!
//! let map: OrderedIndexMap<String, i32> = [("b".to_string(), 2), ("a".to_string(), 1)]
//!     .into_iter()
//!     .collect();
//!
//! let bytes = map.encode().unwrap();
//! assert_eq!(codec::inspect(&bytes).unwrap().kind, FrameKind::OrderedIndexMap);
//!
//! let restored = OrderedIndexMap::<String, i32>::decode(&bytes).unwrap();
//! assert_eq!(restored, map);
//!
//! assert!(PersistentSequence::<(String, i32)>::decode(&bytes).is_err());
//! assert!(OrderedIndexMap::<String, i32>::decode(b"garbage").is_err());
//! ```

use std::fmt;

use bincode::Options;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Magic bytes opening every frame.
pub const MAGIC: [u8; 4] = *b"PSTA";

/// Version of the frame layout written by [`encode`].
pub const FORMAT_VERSION: u8 = 1;

const FINGERPRINT_LENGTH: usize = 8;

/// Length of the frame header preceding the payload.
pub const HEADER_LENGTH: usize = MAGIC.len() + 2 + FINGERPRINT_LENGTH;

/// The kind of value a frame holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameKind {
    /// Any serializable value written through [`encode`].
    Value = 0,
    /// A [`PersistentSequence`](crate::persistent::PersistentSequence).
    Sequence = 1,
    /// An [`OrderedIndexMap`](crate::persistent::OrderedIndexMap).
    OrderedIndexMap = 2,
    /// A [`PersistentMap`](crate::persistent::PersistentMap).
    PersistentMap = 3,
}

impl FrameKind {
    #[inline]
    const fn tag(self) -> u8 {
        self as u8
    }

    const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Value),
            1 => Some(Self::Sequence),
            2 => Some(Self::OrderedIndexMap),
            3 => Some(Self::PersistentMap),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Value => "value",
            Self::Sequence => "sequence",
            Self::OrderedIndexMap => "ordered index map",
            Self::PersistentMap => "persistent map",
        };
        formatter.write_str(name)
    }
}

/// What a frame declares about its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHeader {
    /// The kind of value that wrote the frame.
    pub kind: FrameKind,
    /// Fingerprint of the element types, see [`fingerprint`].
    pub fingerprint: u64,
}

impl FrameHeader {
    /// The header of a `kind` frame whose elements are of type `T`.
    ///
    /// Maps use the tuple `(K, V)` as `T`.
    #[must_use]
    pub fn of<T: ?Sized>(kind: FrameKind) -> Self {
        Self {
            kind,
            fingerprint: fingerprint::<T>(),
        }
    }
}

/// Errors produced while encoding or decoding a frame.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value could not be serialized.
    #[error("failed to encode value: {0}")]
    Encode(#[source] bincode::Error),

    /// The payload was truncated, corrupt, or did not describe a valid value.
    #[error("failed to decode value: {0}")]
    Decode(#[source] bincode::Error),

    /// The input is too short to hold a frame header.
    #[error("frame of {length} bytes is shorter than the {header}-byte header", header = HEADER_LENGTH)]
    TruncatedFrame {
        /// Length of the rejected input.
        length: usize,
    },

    /// The input does not start with [`MAGIC`].
    #[error("invalid magic bytes {found:?}")]
    InvalidMagic {
        /// The first four bytes of the rejected input.
        found: [u8; 4],
    },

    /// The frame was written by an unknown format version.
    #[error("unsupported format version {found}, expected {expected}", expected = FORMAT_VERSION)]
    UnsupportedVersion {
        /// The version byte of the rejected input.
        found: u8,
    },

    /// The kind byte names no known [`FrameKind`].
    #[error("unknown frame kind {found}")]
    UnknownKind {
        /// The kind byte of the rejected input.
        found: u8,
    },

    /// The frame holds a different kind of value.
    #[error("frame holds a {found}, expected a {expected}")]
    KindMismatch {
        /// The kind the caller asked for.
        expected: FrameKind,
        /// The kind recorded in the frame.
        found: FrameKind,
    },

    /// The frame was written for different element types.
    #[error("frame element fingerprint {found:#018x} does not match {expected:#018x}")]
    TypeMismatch {
        /// Fingerprint of the element types the caller asked for.
        expected: u64,
        /// Fingerprint recorded in the frame.
        found: u64,
    },
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
}

/// Fingerprint of a type: the first eight bytes of the SHA-256 digest of
/// its name, read little-endian.
///
/// # Examples
///
/// ```rust
/// use persista::codec::fingerprint;
///
/// assert_eq!(fingerprint::<(String, u32)>(), fingerprint::<(String, u32)>());
/// assert_ne!(fingerprint::<(String, u32)>(), fingerprint::<(u32, u32)>());
/// ```
#[must_use]
pub fn fingerprint<T: ?Sized>() -> u64 {
    let digest = Sha256::digest(std::any::type_name::<T>().as_bytes());
    let mut bytes = [0u8; FINGERPRINT_LENGTH];
    bytes.copy_from_slice(&digest[..FINGERPRINT_LENGTH]);
    u64::from_le_bytes(bytes)
}

/// Serializes `value` without a frame header.
///
/// Used where two encodings are compared rather than stored.
pub(crate) fn payload<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    options().serialize(value).map_err(CodecError::Encode)
}

/// Encodes `value` into a framed byte vector tagged as a
/// [`FrameKind::Value`] of type `T`.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] when `value`'s `Serialize` implementation
/// fails.
///
/// # Examples
///
/// ```rust
/// use persista::codec::{self, MAGIC};
///
/// let bytes = codec::encode(&vec![1, 2, 3]).unwrap();
/// assert_eq!(&bytes[..4], &MAGIC);
/// ```
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    encode_framed(FrameHeader::of::<T>(FrameKind::Value), value)
}

/// Decodes a frame produced by [`encode`] for the same type `T`.
///
/// # Errors
///
/// Returns a [`CodecError`] describing why the frame was rejected.
///
/// # Examples
///
/// ```rust
/// use persista::codec::{self, CodecError};
///
/// let bytes = codec::encode(&vec![1, 2, 3]).unwrap();
/// let values: Vec<i32> = codec::decode(&bytes).unwrap();
/// assert_eq!(values, vec![1, 2, 3]);
///
/// let result: Result<Vec<i32>, CodecError> = codec::decode(&bytes[..3]);
/// assert!(matches!(result, Err(CodecError::TruncatedFrame { length: 3 })));
///
/// let result: Result<Vec<u8>, CodecError> = codec::decode(&bytes);
/// assert!(matches!(result, Err(CodecError::TypeMismatch { .. })));
/// ```
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    decode_framed(FrameHeader::of::<T>(FrameKind::Value), bytes)
}

/// Reads the header of a frame without decoding its payload.
///
/// # Errors
///
/// Returns a [`CodecError`] when the header is short, foreign, of an
/// unknown version, or names an unknown kind.
pub fn inspect(bytes: &[u8]) -> Result<FrameHeader, CodecError> {
    read_header(bytes).map(|(header, _)| header)
}

pub(crate) fn encode_framed<T: Serialize + ?Sized>(
    header: FrameHeader,
    value: &T,
) -> Result<Vec<u8>, CodecError> {
    let payload = payload(value)?;

    let mut frame = Vec::with_capacity(HEADER_LENGTH + payload.len());
    frame.extend_from_slice(&MAGIC);
    frame.push(FORMAT_VERSION);
    frame.push(header.kind.tag());
    frame.extend_from_slice(&header.fingerprint.to_le_bytes());
    frame.extend_from_slice(&payload);

    tracing::trace!(kind = %header.kind, payload_bytes = payload.len(), "encoded frame");
    Ok(frame)
}

pub(crate) fn decode_framed<T: DeserializeOwned>(
    expected: FrameHeader,
    bytes: &[u8],
) -> Result<T, CodecError> {
    let payload = read_header(bytes)
        .and_then(|(found, payload)| check_header(expected, found).map(|()| payload))
        .inspect_err(|error| tracing::debug!(%error, "rejected frame header"))?;

    let value = options().deserialize(payload).map_err(|error| {
        tracing::debug!(%error, "rejected frame payload");
        CodecError::Decode(error)
    })?;

    tracing::trace!(kind = %expected.kind, payload_bytes = payload.len(), "decoded frame");
    Ok(value)
}

fn check_header(expected: FrameHeader, found: FrameHeader) -> Result<(), CodecError> {
    if found.kind != expected.kind {
        return Err(CodecError::KindMismatch {
            expected: expected.kind,
            found: found.kind,
        });
    }
    if found.fingerprint != expected.fingerprint {
        return Err(CodecError::TypeMismatch {
            expected: expected.fingerprint,
            found: found.fingerprint,
        });
    }
    Ok(())
}

/// Validates the header and returns it with the payload that follows it.
fn read_header(bytes: &[u8]) -> Result<(FrameHeader, &[u8]), CodecError> {
    if bytes.len() < HEADER_LENGTH {
        return Err(CodecError::TruncatedFrame {
            length: bytes.len(),
        });
    }

    let (header, payload) = bytes.split_at(HEADER_LENGTH);
    let (magic, rest) = header.split_at(MAGIC.len());

    let mut found = [0u8; 4];
    found.copy_from_slice(magic);
    if found != MAGIC {
        return Err(CodecError::InvalidMagic { found });
    }

    let version = rest[0];
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion { found: version });
    }

    let kind = FrameKind::from_tag(rest[1]).ok_or(CodecError::UnknownKind { found: rest[1] })?;

    let mut fingerprint = [0u8; FINGERPRINT_LENGTH];
    fingerprint.copy_from_slice(&rest[2..]);

    Ok((
        FrameHeader {
            kind,
            fingerprint: u64::from_le_bytes(fingerprint),
        },
        payload,
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn frame_of(values: &[i32]) -> Vec<u8> {
        encode(&values.to_vec()).unwrap()
    }

    #[rstest]
    fn test_roundtrip_preserves_order() {
        let bytes = frame_of(&[3, 1, 2]);
        let decoded: Vec<i32> = decode(&bytes).unwrap();
        assert_eq!(decoded, vec![3, 1, 2]);
    }

    #[rstest]
    fn test_header_layout() {
        let bytes = frame_of(&[]);
        assert_eq!(&bytes[..4], b"PSTA");
        assert_eq!(bytes[4], FORMAT_VERSION);
        assert_eq!(bytes[5], FrameKind::Value.tag());
        assert_eq!(
            bytes[6..HEADER_LENGTH],
            fingerprint::<Vec<i32>>().to_le_bytes()
        );
    }

    #[rstest]
    fn test_inspect_reports_header() {
        let bytes = encode_framed(FrameHeader::of::<(u8, u8)>(FrameKind::PersistentMap), &[1]).unwrap();
        assert_eq!(
            inspect(&bytes).unwrap(),
            FrameHeader {
                kind: FrameKind::PersistentMap,
                fingerprint: fingerprint::<(u8, u8)>(),
            }
        );
    }

    #[rstest]
    #[case(FrameKind::Value)]
    #[case(FrameKind::Sequence)]
    #[case(FrameKind::OrderedIndexMap)]
    #[case(FrameKind::PersistentMap)]
    fn test_kind_tag_roundtrip(#[case] kind: FrameKind) {
        assert_eq!(FrameKind::from_tag(kind.tag()), Some(kind));
    }

    #[rstest]
    fn test_unknown_kind_is_rejected() {
        let mut bytes = frame_of(&[1]);
        bytes[5] = 0xEE;
        let result: Result<Vec<i32>, _> = decode(&bytes);
        assert!(matches!(result, Err(CodecError::UnknownKind { found: 0xEE })));
    }

    #[rstest]
    fn test_other_kind_is_rejected() {
        let bytes = encode_framed(FrameHeader::of::<i32>(FrameKind::Sequence), &[1, 2]).unwrap();
        let result: Result<Vec<i32>, _> =
            decode_framed(FrameHeader::of::<i32>(FrameKind::OrderedIndexMap), &bytes);
        assert!(matches!(
            result,
            Err(CodecError::KindMismatch {
                expected: FrameKind::OrderedIndexMap,
                found: FrameKind::Sequence,
            })
        ));
    }

    #[rstest]
    fn test_other_element_type_is_rejected() {
        let bytes = frame_of(&[1, 2]);
        let result: Result<Vec<u32>, _> = decode(&bytes);
        assert!(matches!(
            result,
            Err(CodecError::TypeMismatch { expected, found })
                if expected == fingerprint::<Vec<u32>>() && found == fingerprint::<Vec<i32>>()
        ));
    }

    #[rstest]
    fn test_fingerprint_distinguishes_types() {
        assert_eq!(fingerprint::<String>(), fingerprint::<String>());
        assert_ne!(fingerprint::<String>(), fingerprint::<&str>());
        assert_ne!(fingerprint::<(u32, u32)>(), fingerprint::<Vec<u32>>());
    }

    #[rstest]
    #[case(&[])]
    #[case(&[b'P', b'S'])]
    #[case(b"PSTA")]
    fn test_short_input_is_truncated_frame(#[case] bytes: &[u8]) {
        let result: Result<Vec<i32>, _> = decode(bytes);
        assert!(matches!(
            result,
            Err(CodecError::TruncatedFrame { length }) if length == bytes.len()
        ));
    }

    #[rstest]
    fn test_wrong_magic_is_rejected() {
        let mut bytes = frame_of(&[1]);
        bytes[0] = b'X';
        let result: Result<Vec<i32>, _> = decode(&bytes);
        assert!(matches!(result, Err(CodecError::InvalidMagic { found }) if found == *b"XSTA"));
    }

    #[rstest]
    fn test_unknown_version_is_rejected() {
        let mut bytes = frame_of(&[1]);
        bytes[4] = FORMAT_VERSION + 1;
        let result: Result<Vec<i32>, _> = decode(&bytes);
        assert!(matches!(
            result,
            Err(CodecError::UnsupportedVersion { found }) if found == FORMAT_VERSION + 1
        ));
    }

    #[rstest]
    fn test_truncated_payload_is_decode_error() {
        let bytes = frame_of(&[1, 2, 3, 4]);
        let result: Result<Vec<i32>, _> = decode(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[rstest]
    fn test_trailing_bytes_are_rejected() {
        let mut bytes = frame_of(&[1]);
        bytes.push(0);
        let result: Result<Vec<i32>, _> = decode(&bytes);
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[rstest]
    fn test_error_messages_mention_cause() {
        let error = decode::<Vec<i32>>(b"PS").unwrap_err();
        assert_eq!(
            error.to_string(),
            "frame of 2 bytes is shorter than the 14-byte header"
        );
    }
}
