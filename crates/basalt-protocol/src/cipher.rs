use aes::Aes128;
use basalt_common::{BasaltError, Result};
use cfb8::cipher::{AsyncStreamCipher, NewCipher};
use cfb8::Cfb8;

type AesCfb8 = Cfb8<Aes128>;

/// AES-128-CFB8 state for both directions of a connection. The shared secret
/// is used as both key and IV.
pub struct CipherPair {
    encryptor: AesCfb8,
    decryptor: AesCfb8,
}

impl CipherPair {
    pub fn new(shared_secret: &[u8]) -> Result<Self> {
        let build = || {
            AesCfb8::new_from_slices(shared_secret, shared_secret).map_err(|_| {
                BasaltError::Crypto(format!(
                    "shared secret must be 16 bytes, got {}",
                    shared_secret.len()
                ))
            })
        };
        Ok(Self {
            encryptor: build()?,
            decryptor: build()?,
        })
    }

    pub fn encrypt(&mut self, data: &mut [u8]) {
        self.encryptor.encrypt(data);
    }

    pub fn decrypt(&mut self, data: &mut [u8]) {
        self.decryptor.decrypt(data);
    }
}

impl std::fmt::Debug for CipherPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CipherPair(AES-128-CFB8)")
    }
}
