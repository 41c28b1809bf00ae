/// Signs admitted envelope bytes with a key held elsewhere.
///
/// Signatures live outside the envelope: identifier computation covers the
/// unsigned canonical bytes, and a signature travels alongside them. This
/// keeps key custody (HSM, OS keystore, remote signer) out of the chain
/// crate; implementations decide transport and key lifetime.
pub trait EnvelopeSigner {
    /// Signer-specific failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Signs the canonical envelope bytes.
    fn sign(&self, envelope_bytes: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// Identifier of the key this signer signs with.
    fn key_id(&self) -> &str;
}
