//! Access key generation.

use keymint_types::AccessKey;
use rand::rngs::OsRng;
use rand::Rng;

/// Generates unpredictable access keys.
///
/// Draws every symbol from the OS random source, so keys carry no
/// structure that leaks role or sequence information. The generator is
/// stateless; collision with an existing record is detected by the
/// store on insert and handled by the caller's retry loop.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    length: usize,
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self {
            length: AccessKey::GENERATED_LEN,
        }
    }
}

impl KeyGenerator {
    /// Creates a generator with the default key length.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator with a custom length, clamped to the
    /// accepted `MIN_LEN..=MAX_LEN` range.
    #[must_use]
    pub fn with_length(length: usize) -> Self {
        Self {
            length: length.clamp(AccessKey::MIN_LEN, AccessKey::MAX_LEN),
        }
    }

    /// Produces a fresh key.
    #[must_use]
    pub fn generate(&self) -> AccessKey {
        let mut rng = OsRng;
        let raw: String = (0..self.length)
            .map(|_| {
                let idx = rng.gen_range(0..AccessKey::ALPHABET.len());
                AccessKey::ALPHABET[idx] as char
            })
            .collect();
        AccessKey::parse(&raw).expect("generated keys are canonical")
    }
}
