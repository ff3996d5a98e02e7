//! Method and account-type tags.
//!
//! The remote program identifies every instruction and every account layout
//! by the first 8 bytes of `SHA-256("<namespace>:<name>")`, where the
//! namespace is `global` for instructions and `account` for account types.

use sha2::{Digest, Sha256};

/// Length of a discriminator in bytes.
pub const DISCRIMINATOR_LEN: usize = 8;

pub type Discriminator = [u8; DISCRIMINATOR_LEN];

/// Discriminator for the instruction named `name` (snake_case, as declared
/// by the remote program).
pub fn instruction_discriminator(name: &str) -> Discriminator {
    namespaced("global", name)
}

/// Discriminator for the account type named `name` (the struct name, as
/// declared by the remote program).
pub fn account_discriminator(name: &str) -> Discriminator {
    namespaced("account", name)
}

fn namespaced(namespace: &str, name: &str) -> Discriminator {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());
    let hash = hasher.finalize();

    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    out
}
