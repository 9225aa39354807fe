use basalt_common::{BasaltError, Result};
use rand::RngCore;
use rsa::pkcs8::EncodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use uuid::Uuid;

pub const KEY_BITS: usize = 1024;
pub const VERIFY_TOKEN_LENGTH: usize = 4;
pub const SHARED_SECRET_LENGTH: usize = 16;

/// The server's login key pair. Generated once per process.
pub struct ServerKey {
    private_key: RsaPrivateKey,
    public_der: Vec<u8>,
}

impl ServerKey {
    pub fn generate() -> Result<Self> {
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), KEY_BITS)
            .map_err(|e| BasaltError::Crypto(e.to_string()))?;
        let public_der = RsaPublicKey::from(&private_key)
            .to_public_key_der()
            .map_err(|e| BasaltError::Crypto(e.to_string()))?
            .as_bytes()
            .to_vec();
        Ok(Self {
            private_key,
            public_der,
        })
    }

    /// SubjectPublicKeyInfo DER, as sent in Encryption Request.
    pub fn public_der(&self) -> &[u8] {
        &self.public_der
    }

    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.private_key
            .decrypt(Pkcs1v15Encrypt, data)
            .map_err(|e| BasaltError::Crypto(e.to_string()))
    }
}

impl std::fmt::Debug for ServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ServerKey({} bytes public)", self.public_der.len())
    }
}

pub fn verify_token() -> [u8; VERIFY_TOKEN_LENGTH] {
    let mut token = [0u8; VERIFY_TOKEN_LENGTH];
    rand::thread_rng().fill_bytes(&mut token);
    token
}

/// UUID the vanilla server assigns to `name` when running offline.
pub fn offline_uuid(name: &str) -> Uuid {
    Uuid::new_v3(
        &Uuid::NAMESPACE_DNS,
        format!("OfflinePlayer:{}", name).as_bytes(),
    )
}
