//! Ephemeral credentials generated as request inputs.
//!
//! Failures of the secure random source are surfaced as
//! [`ProvisionerError::SecretGeneration`]; callers must abort instead of
//! falling back to a weaker or empty credential.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use ssh_key::private::{KeypairData, RsaKeypair};
use ssh_key::{LineEnding, PrivateKey};

use crate::error::ProvisionerError;

pub const SSH_KEY_BITS: usize = 2048;

/// URL-safe base64 encoding of `n` bytes from the OS random source.
pub fn generate_random_string(n: usize) -> Result<String, ProvisionerError> {
    generate_random_string_with(&mut OsRng, n)
}

/// Same as [`generate_random_string`] with an explicit random source.
pub fn generate_random_string_with<R: RngCore + CryptoRng>(
    rng: &mut R,
    n: usize,
) -> Result<String, ProvisionerError> {
    let mut bytes = vec![0u8; n];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| ProvisionerError::SecretGeneration {
            secret: "random string",
            message: e.to_string(),
        })?;
    Ok(URL_SAFE.encode(&bytes))
}

/// A freshly generated RSA keypair. Only the public half leaves the process.
pub struct SshKeyPair {
    private_key: PrivateKey,
}

impl SshKeyPair {
    pub fn generate() -> Result<Self, ProvisionerError> {
        Self::generate_with(&mut OsRng)
    }

    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, ProvisionerError> {
        let keypair = RsaKeypair::random(rng, SSH_KEY_BITS).map_err(ssh_error)?;
        let private_key =
            PrivateKey::new(KeypairData::from(keypair), "").map_err(ssh_error)?;
        Ok(Self { private_key })
    }

    /// Public key in `authorized_keys` format, e.g. `ssh-rsa AAAA...`.
    pub fn authorized_key(&self) -> Result<String, ProvisionerError> {
        self.private_key.public_key().to_openssh().map_err(ssh_error)
    }

    /// Private key in OpenSSH PEM format.
    pub fn private_key_pem(&self) -> Result<String, ProvisionerError> {
        self.private_key
            .to_openssh(LineEnding::LF)
            .map(|pem| pem.to_string())
            .map_err(ssh_error)
    }
}

/// Public key data for a new VM when the spec supplies none.
pub fn generate_ssh_public_key() -> Result<String, ProvisionerError> {
    SshKeyPair::generate()?.authorized_key()
}

fn ssh_error(err: ssh_key::Error) -> ProvisionerError {
    ProvisionerError::SecretGeneration {
        secret: "ssh key",
        message: err.to_string(),
    }
}
