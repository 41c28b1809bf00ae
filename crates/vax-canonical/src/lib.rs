//! Canonical byte-exact encoding for VAX action envelopes.
//!
//! This crate implements the VAX-JCS canonicalization profile: a deterministic
//! mapping from structured values to bytes. Identical logical values always
//! produce identical byte sequences, independent of input ordering, source
//! numeric literal form, or platform. The canonical bytes are the only form
//! that ever participates in hashing or chain verification.
//!
#![deny(missing_docs)]

/// SHA-256 content digest helpers.
pub mod digest;
/// Canonical byte emission for [`CanonicalValue`] trees.
pub mod encoder;
/// Normalized decimal number representation.
pub mod number;
/// Serde serializer targeting [`CanonicalValue`] directly.
mod ser;
/// Closed tagged-union value type accepted by the encoder.
pub mod value;

pub use digest::{content_digest, DIGEST_SIZE};
pub use encoder::{encode, encode_text, is_canonical, EncodingError};
pub use number::Number;
pub use value::CanonicalValue;
