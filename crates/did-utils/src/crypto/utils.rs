use super::{errors::Error, traits::BYTES_LENGTH_32};

// Generate a seed from an optional initial seed.
// If the initial seed is empty or of the wrong size, generate a random seed.
pub(super) fn generate_seed(initial_seed: &[u8]) -> Result<[u8; BYTES_LENGTH_32], Error> {
    match <[u8; BYTES_LENGTH_32]>::try_from(initial_seed) {
        Ok(seed) => Ok(seed),
        Err(_) => {
            let mut seed = [0u8; BYTES_LENGTH_32];
            getrandom::getrandom(&mut seed).map_err(|_| Error::InvalidSeed)?;
            Ok(seed)
        }
    }
}
