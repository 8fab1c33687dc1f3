use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Fragment digest algorithm. Reporting only; never feeds back into carving
/// decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    Md5,
    Sha256,
}

pub trait Fingerprint: Send + Sync {
    fn fingerprint(&self, bytes: &[u8]) -> String;
}

pub struct Md5Fingerprint;

impl Fingerprint for Md5Fingerprint {
    fn fingerprint(&self, bytes: &[u8]) -> String {
        format!("{:x}", md5::compute(bytes))
    }
}

pub struct Sha256Fingerprint;

impl Fingerprint for Sha256Fingerprint {
    fn fingerprint(&self, bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }
}

pub fn build_fingerprint(kind: DigestKind) -> Box<dyn Fingerprint> {
    match kind {
        DigestKind::Md5 => Box::new(Md5Fingerprint),
        DigestKind::Sha256 => Box::new(Sha256Fingerprint),
    }
}
