use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use multibase::Base::Base64Url;

use super::traits::{CoreSign, Generate, KeyMaterial, BYTES_LENGTH_32};
use super::utils::generate_seed;
use super::{errors::Error, AsymmetricKey};
use crate::didcore::Jwk;

pub type Ed25519KeyPair = AsymmetricKey<VerifyingKey, SigningKey>;

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}", self.public_key))
    }
}

impl KeyMaterial for Ed25519KeyPair {
    fn public_key_bytes(&self) -> Result<[u8; BYTES_LENGTH_32], Error> {
        Ok(self.public_key.to_bytes())
    }

    fn private_key_bytes(&self) -> Result<[u8; BYTES_LENGTH_32], Error> {
        match &self.secret_key {
            Some(sk) => Ok(sk.to_bytes()),
            None => Err(Error::InvalidSecretKey),
        }
    }
}

impl Generate for Ed25519KeyPair {
    fn new() -> Result<Ed25519KeyPair, Error> {
        Self::new_with_seed(&[])
    }

    fn new_with_seed(seed: &[u8]) -> Result<Ed25519KeyPair, Error> {
        let secret_seed = generate_seed(seed)?;
        Self::from_secret_key(&secret_seed)
    }

    fn from_public_key(public_key: &[u8; BYTES_LENGTH_32]) -> Result<Ed25519KeyPair, Error> {
        let public_key = VerifyingKey::from_bytes(public_key).map_err(|_| Error::InvalidPublicKey)?;

        Ok(Ed25519KeyPair {
            public_key,
            secret_key: None,
        })
    }

    fn from_secret_key(secret_key: &[u8; BYTES_LENGTH_32]) -> Result<Ed25519KeyPair, Error> {
        let sk = SigningKey::from_bytes(secret_key);

        Ok(Ed25519KeyPair {
            public_key: sk.verifying_key(),
            secret_key: Some(sk),
        })
    }
}

impl CoreSign for Ed25519KeyPair {
    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let sk = self.secret_key.as_ref().ok_or(Error::InvalidSecretKey)?;
        let signature = sk.try_sign(payload).map_err(|_| Error::SignatureError)?;

        Ok(signature.to_bytes().to_vec())
    }

    fn verify(&self, payload: &[u8], signature: &[u8]) -> Result<(), Error> {
        let signature = Signature::try_from(signature).map_err(|_| Error::CanNotRetrieveSignature)?;

        self.public_key
            .verify(payload, &signature)
            .map_err(|_| Error::VerificationError)
    }
}

impl Ed25519KeyPair {
    /// Builds the public `OKP` JWK of this key pair.
    pub fn to_public_jwk(&self) -> Jwk {
        Jwk {
            key_id: None,
            key_type: String::from("OKP"),
            curve: String::from("Ed25519"),
            x: Some(Base64Url.encode(self.public_key.as_bytes())),
            y: None,
            d: None,
        }
    }
}

impl TryFrom<&Jwk> for Ed25519KeyPair {
    type Error = Error;

    /// Loads a key pair from an `OKP` JWK; the secret half is kept when `d` is present.
    fn try_from(jwk: &Jwk) -> Result<Self, Self::Error> {
        if jwk.key_type != "OKP" || jwk.curve != "Ed25519" {
            return Err(Error::InvalidCurve);
        }

        let decode = |value: &str| -> Result<[u8; BYTES_LENGTH_32], Error> {
            let bytes = Base64Url.decode(value).map_err(|_| Error::InvalidKeyLength)?;
            bytes.try_into().map_err(|_| Error::InvalidKeyLength)
        };

        match (&jwk.d, &jwk.x) {
            (Some(d), _) => Self::from_secret_key(&decode(d)?),
            (None, Some(x)) => Self::from_public_key(&decode(x)?),
            (None, None) => Err(Error::InvalidPublicKey),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    // Seed bytes of the string "Sample seed bytes of thirtytwo!b"
    const SEED: &[u8] = b"Sample seed bytes of thirtytwo!b";

    #[test]
    fn test_new() {
        let keypair = Ed25519KeyPair::new().unwrap();
        assert_eq!(keypair.public_key_bytes().unwrap().len(), BYTES_LENGTH_32);
        assert_eq!(keypair.private_key_bytes().unwrap().len(), BYTES_LENGTH_32);
    }

    #[test]
    fn test_new_with_seed() {
        let keypair = Ed25519KeyPair::new_with_seed(SEED).unwrap();
        let pub_key_hex = hex::encode(keypair.public_key_bytes().unwrap());
        let pri_key_hex = hex::encode(keypair.private_key_bytes().unwrap());
        assert_eq!(pub_key_hex, "412328b0201b71d0144a27d028057b6fdf58d22e0f3baaebaa5388140e57bbbd");
        assert_eq!(pri_key_hex, "53616d706c652073656564206279746573206f662074686972747974776f2162");
    }

    #[test]
    fn test_sign_verify() {
        let keypair = Ed25519KeyPair::new().unwrap();
        let payload = br#"{"credentialSubject":{"id":"did:example:ebfeb1f712ebc6f1c276e12ec21"}}"#;

        let signature = keypair.sign(payload).unwrap();
        assert!(keypair.verify(payload, &signature).is_ok());
        assert_eq!(keypair.verify(b"tampered", &signature), Err(Error::VerificationError));
        assert_eq!(keypair.verify(payload, &signature[..10]), Err(Error::CanNotRetrieveSignature));
    }

    #[test]
    fn test_public_only_key_cannot_sign() {
        let keypair = Ed25519KeyPair::new_with_seed(SEED).unwrap();
        let public_only = Ed25519KeyPair::from_public_key(&keypair.public_key_bytes().unwrap()).unwrap();

        assert_eq!(public_only.sign(b"payload"), Err(Error::InvalidSecretKey));

        let signature = keypair.sign(b"payload").unwrap();
        assert!(public_only.verify(b"payload", &signature).is_ok());
    }

    #[test]
    fn test_jwk_round_trip() {
        let keypair = Ed25519KeyPair::new_with_seed(SEED).unwrap();
        let jwk = keypair.to_public_jwk();
        assert_eq!(jwk.x.as_deref(), Some("QSMosCAbcdAUSifQKAV7b99Y0i4PO6rrqlOIFA5Xu70"));

        let restored = Ed25519KeyPair::try_from(&jwk).unwrap();
        assert_eq!(restored.public_key_bytes(), keypair.public_key_bytes());
        assert!(restored.secret_key.is_none());
    }

    #[test]
    fn test_jwk_with_wrong_curve_is_rejected() {
        let jwk = Jwk {
            key_type: String::from("EC"),
            curve: String::from("P-256"),
            ..Default::default()
        };
        assert_eq!(Ed25519KeyPair::try_from(&jwk).unwrap_err(), Error::InvalidCurve);
    }
}
