use serde::{Deserialize, Serialize};

/// Connection security state of the page displayed by a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SslState {
    /// No security information (plain http, internal pages, nothing loaded).
    #[default]
    None,
    /// A valid certificate chain.
    Valid,
    /// A broken or untrusted certificate chain.
    Invalid,
    /// Secure page loading insecure subresources.
    Mixed,
}

/// Peer certificate details shown in the SSL dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SslCertificateInfo {
    pub issued_to: String,
    pub issued_by: String,
}
