use std::fmt;

use base64::Engine as _;
use rand::{CryptoRng, Rng, RngCore};

use crate::urange::CodepointRange;

/// Output length used when the command doesn't carry a `len` flag.
pub const DEFAULT_LENGTH: usize = 64;
/// Upper bound on the requested output length, in bytes or characters.
pub const MAX_LENGTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The `base` flag names an encoding we don't know.
    UnknownBase(String),
    /// Alphabet mode needs at least one character to draw from.
    EmptyAlphabet,
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::UnknownBase(base) => write!(f, "unknown base {base:?}"),
            GenerateError::EmptyAlphabet => write!(f, "alphabet is empty"),
        }
    }
}

impl std::error::Error for GenerateError {}

/// Draw `length` characters uniformly, with replacement, from `alphabet`.
pub fn sample_alphabet<R: Rng + CryptoRng>(
    alphabet: &str,
    length: usize,
    rng: &mut R,
) -> Result<String, GenerateError> {
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.is_empty() {
        return Err(GenerateError::EmptyAlphabet);
    }
    Ok((0..length)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect())
}

/// Produce a uniformly random permutation of `alphabet`.
pub fn shuffle_alphabet<R: Rng + CryptoRng>(alphabet: &str, rng: &mut R) -> String {
    use rand::seq::SliceRandom as _;

    let mut chars: Vec<char> = alphabet.chars().collect();
    chars.shuffle(rng);
    chars.into_iter().collect()
}

/// Draw `length` code points from the given ranges.
///
/// Each draw picks a range with probability proportional to its size, then a
/// code point uniformly within it: a prefix sum over the range weights is
/// binary-searched with a uniform value in `[0, total)`.
pub fn sample_ranges<R: Rng + CryptoRng>(
    ranges: &[CodepointRange],
    length: usize,
    rng: &mut R,
) -> String {
    let mut prefix = Vec::with_capacity(ranges.len());
    let mut total = 0u64;
    for range in ranges {
        total += u64::from(range.weight());
        prefix.push(total);
    }
    if total == 0 {
        return String::new();
    }

    (0..length)
        .map(|_| {
            let pick = rng.gen_range(0..total);
            let idx = prefix.partition_point(|&sum| sum <= pick);
            let range = &ranges[idx];
            let cp = rng.gen_range(range.start..range.end);
            // Surrogate-free by construction of the parsed ranges.
            char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}

/// Draw `length` bytes from a cryptographically secure source.
pub fn random_bytes<R: RngCore + CryptoRng>(length: usize, rng: &mut R) -> Vec<u8> {
    let mut bytes = vec![0u8; length];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// Encode a byte string per the `base` flag value.
///
/// `32` and `64` strip their padding; `raw` is the decimal byte list (e.g.
/// `[31, 65, 200]`), fixed here rather than inheriting any language's default
/// bytes-to-string conversion.
pub fn encode_bytes(base: &str, bytes: &[u8]) -> Result<String, GenerateError> {
    let encoded = match base {
        "raw" => format!("{bytes:?}"),
        "16" | "hex" => hex::encode_upper(bytes),
        "32" => base32::encode(base32::Alphabet::Rfc4648 { padding: false }, bytes),
        "64" => base64::engine::general_purpose::STANDARD_NO_PAD.encode(bytes),
        "85" => base85::encode(bytes),
        "65536" => base65536::encode(bytes, None),
        _ => return Err(GenerateError::UnknownBase(base.to_owned())),
    };
    Ok(encoded)
}

/// True if any character has the Unicode general category Cc.
pub fn contains_control(s: &str) -> bool {
    s.chars().any(char::is_control)
}
