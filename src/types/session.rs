use serde::{Deserialize, Serialize};

/// The serialized remains of a tab, persisted across process death.
///
/// A frozen tab is not a running session; it holds just enough to rebuild
/// one through the restore initializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrozenTab {
    pub url: String,
    pub title: String,
}

/// Ciphertext plus the AES-GCM IV and authentication tag needed to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedData {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
    pub auth_tag: Vec<u8>,
}
