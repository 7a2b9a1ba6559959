//! Signing credentials for controlled voter accounts.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An opaque signing credential (e.g. a posting key in WIF form).
///
/// The engine never inspects the contents; it only hands the credential to
/// the ledger client. `Debug` is redacted and the bytes are zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Expose the secret for signing.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
