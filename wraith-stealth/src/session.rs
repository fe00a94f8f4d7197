//! Key sessions.
//!
//! A [`KeySession`] owns the recipient's meta keys for as long as the user is
//! "unlocked". Keys are derived on demand by asking the connected wallet to
//! sign the chain's key message and mixing in the PIN; they leave memory at
//! [`KeySession::lock`] or when the session is dropped.

use tracing::{debug, info, instrument};

use wraith_core::error::{Result, WraithError};
use wraith_core::traits::ChainWallet;
use wraith_core::types::{Chain, MetaAddress, PublicKey};
use wraith_crypto::{MetaKeyPair, Registration};

/// Session-scoped holder of a recipient's meta keys.
pub struct KeySession {
    chain: Chain,
    owner: PublicKey,
    keys: Option<MetaKeyPair>,
}

impl KeySession {
    /// Derives meta keys through `wallet` and checks them against the registry.
    ///
    /// `registered` is what the indexer has on file for this wallet, if
    /// anything.
    ///
    /// # Errors
    /// - `InvalidPin` for a malformed PIN
    /// - `WrongPin` if a registration exists and the derived keys differ
    #[instrument(skip(wallet, pin, registered), fields(chain = %wallet.chain()))]
    pub async fn unlock(
        wallet: &dyn ChainWallet,
        pin: &str,
        registered: Option<&MetaAddress>,
    ) -> Result<(Self, Registration)> {
        wraith_crypto::validate_pin(pin)?;

        let chain = wallet.chain();
        let signature = wallet.sign_message(chain.key_message().as_bytes()).await?;
        debug!(signature_len = signature.len(), "wallet signed key message");

        let keys = MetaKeyPair::derive(&signature, pin)?;
        let registration = keys.check_registration(registered)?;

        info!(?registration, spend_pub = %keys.spend_pub(), "key session unlocked");

        Ok((
            Self {
                chain,
                owner: wallet.public_key(),
                keys: Some(keys),
            },
            registration,
        ))
    }

    /// Opens a session over already-derived keys.
    pub fn from_keys(chain: Chain, owner: PublicKey, keys: MetaKeyPair) -> Self {
        Self {
            chain,
            owner,
            keys: Some(keys),
        }
    }

    /// Chain the session was opened on.
    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Connected wallet the keys were derived from.
    pub fn owner(&self) -> PublicKey {
        self.owner
    }

    /// Returns the meta keys.
    ///
    /// # Errors
    /// `ValidationError` once the session is locked.
    pub fn keys(&self) -> Result<&MetaKeyPair> {
        self.keys
            .as_ref()
            .ok_or_else(|| WraithError::ValidationError("key session is locked".into()))
    }

    /// Returns the publishable meta-address.
    pub fn meta_address(&self) -> Result<MetaAddress> {
        Ok(self.keys()?.meta_address())
    }

    /// Returns true once the keys have been wiped.
    pub fn is_locked(&self) -> bool {
        self.keys.is_none()
    }

    /// Wipes the keys. Idempotent.
    pub fn lock(&mut self) {
        if self.keys.take().is_some() {
            debug!("key session locked");
        }
    }
}

impl Drop for KeySession {
    fn drop(&mut self) {
        self.lock();
    }
}

impl std::fmt::Debug for KeySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySession")
            .field("chain", &self.chain)
            .field("owner", &self.owner)
            .field("locked", &self.is_locked())
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wraith_core::types::{Transaction, TxRef, TxStatus};
    use wraith_crypto::hash::tagged_sha512;

    /// Wallet whose signature is a keyed hash of the message.
    struct HashWallet {
        chain: Chain,
        secret: [u8; 32],
    }

    #[async_trait]
    impl ChainWallet for HashWallet {
        fn chain(&self) -> Chain {
            self.chain
        }

        fn public_key(&self) -> PublicKey {
            PublicKey::from_array(self.secret)
        }

        async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
            Ok(tagged_sha512(&self.secret, &[message]).to_vec())
        }

        async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction> {
            Ok(tx)
        }

        async fn send_transaction(&self, _tx: &Transaction) -> Result<TxRef> {
            Ok(TxRef::from("unused"))
        }

        async fn confirm(&self, _tx: &TxRef) -> Result<TxStatus> {
            Ok(TxStatus::Confirmed)
        }
    }

    fn wallet(secret: u8) -> HashWallet {
        HashWallet {
            chain: Chain::Solana,
            secret: [secret; 32],
        }
    }

    #[tokio::test]
    async fn test_unlock_new_then_existing() {
        let wallet = wallet(1);
        let (session, registration) = KeySession::unlock(&wallet, "1234", None).await.unwrap();
        assert_eq!(registration, Registration::New);
        let meta = session.meta_address().unwrap();

        let (again, registration) = KeySession::unlock(&wallet, "1234", Some(&meta))
            .await
            .unwrap();
        assert_eq!(registration, Registration::Existing);
        assert_eq!(again.meta_address().unwrap(), meta);
    }

    #[tokio::test]
    async fn test_unlock_wrong_pin() {
        let wallet = wallet(2);
        let (session, _) = KeySession::unlock(&wallet, "1234", None).await.unwrap();
        let meta = session.meta_address().unwrap();

        let result = KeySession::unlock(&wallet, "9999", Some(&meta)).await;
        assert!(matches!(result, Err(WraithError::WrongPin)));
    }

    #[tokio::test]
    async fn test_unlock_rejects_bad_pin_before_signing() {
        let wallet = wallet(3);
        let result = KeySession::unlock(&wallet, "12", None).await;
        assert!(matches!(result, Err(WraithError::InvalidPin(_))));
    }

    #[tokio::test]
    async fn test_chains_give_different_keys() {
        let sol = wallet(4);
        let sui = HashWallet {
            chain: Chain::Sui,
            secret: [4; 32],
        };
        let (a, _) = KeySession::unlock(&sol, "1234", None).await.unwrap();
        let (b, _) = KeySession::unlock(&sui, "1234", None).await.unwrap();
        assert_ne!(a.meta_address().unwrap(), b.meta_address().unwrap());
    }

    #[tokio::test]
    async fn test_lock_wipes_keys() {
        let wallet = wallet(5);
        let (mut session, _) = KeySession::unlock(&wallet, "1234", None).await.unwrap();
        assert!(!session.is_locked());

        session.lock();
        assert!(session.is_locked());
        assert!(session.keys().is_err());
        session.lock();
        assert!(format!("{session:?}").contains("locked: true"));
    }
}
