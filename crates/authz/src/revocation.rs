use dashmap::DashSet;

/// Token ids invalidated before their natural expiry.
///
/// Membership is monotonic: entries are never removed while the process runs.
#[derive(Debug, Default)]
pub struct RevocationList {
    revoked: DashSet<String>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke `jti`. Returns `false` if it was already revoked.
    pub fn revoke(&self, jti: &str) -> bool {
        self.revoked.insert(jti.to_string())
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.contains(jti)
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}
