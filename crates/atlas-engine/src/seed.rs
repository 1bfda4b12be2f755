use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed of a session's random source.
///
/// The starting letter, every computer pick and the wording of every response
/// are drawn from one generator seeded with this value, so two sessions with
/// the same seed, catalog and inputs play out identically. This enables:
///
/// - Reproducible games for debugging
/// - Deterministic tests
///
/// Seeds are written as 32 hexadecimal digits, both by [`fmt::Display`] and
/// in serialized form.
///
/// # Example
///
/// ```
/// use atlas_engine::SessionSeed;
/// use rand::Rng as _;
///
/// let seed: SessionSeed = rand::rng().random();
/// let parsed: SessionSeed = seed.to_string().parse().unwrap();
/// assert_eq!(seed, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionSeed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed {input:?}: expected 32 hexadecimal digits")]
pub struct ParseSeedError {
    input: String,
}

impl SessionSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Expands a small number into a seed. Handy for tests and the command line.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }

    /// The generator this seed initializes.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl fmt::Display for SessionSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for SessionSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(error());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| error())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for SessionSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SessionSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `SessionSeed` values with `rng.random()`.
impl Distribution<SessionSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SessionSeed(seed)
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, RngCore as _};

    use super::*;

    #[test]
    fn test_roundtrip_random_seed() {
        let seed: SessionSeed = rand::rng().random();
        let serialized = serde_json::to_string(&seed).unwrap();
        let deserialized: SessionSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(seed, deserialized);
    }

    #[test]
    fn test_serialized_format() {
        let seed = SessionSeed::from_bytes([0u8; 16]);
        assert_eq!(
            serde_json::to_string(&seed).unwrap(),
            "\"00000000000000000000000000000000\""
        );

        let mut bytes = [0u8; 16];
        bytes[0] = 0xab;
        bytes[15] = 0x01;
        assert_eq!(
            SessionSeed::from_bytes(bytes).to_string(),
            "ab000000000000000000000000000001"
        );
        assert_eq!(
            SessionSeed::from_u64(0x2a).to_string(),
            "0000000000000000000000000000002a"
        );
    }

    #[test]
    fn test_invalid_strings_are_rejected() {
        let signed = format!("+{}", "0".repeat(31));
        for input in [
            "",
            "abc",
            "zz000000000000000000000000000000",
            "0".repeat(33).as_str(),
            signed.as_str(),
            " 0000000000000000000000000000000",
        ] {
            assert!(input.parse::<SessionSeed>().is_err(), "{input:?}");
        }
        assert!(serde_json::from_str::<SessionSeed>("\"1234\"").is_err());
        assert!(serde_json::from_str::<SessionSeed>("42").is_err());
    }

    #[test]
    fn test_same_seed_same_stream() {
        let seed = SessionSeed::from_u64(7);
        let mut a = seed.rng();
        let mut b = seed.rng();
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }
}
