//! # Engine Primitives
//!
//! Fixed constants for the tabgraph engine. Everything a run may tune lives
//! in [`crate::config`]; these values are compiled in.

/// Token substituted for a missing natural key under the placeholder policy.
///
/// Every row with a missing key collapses onto the same `<kind>_unknown`
/// node. This masks data-quality problems, which is why the policy is
/// configurable.
pub const PLACEHOLDER_KEY: &str = "unknown";

/// Separator placed between slug words and between prefix and slug.
pub const SLUG_SEPARATOR: char = '_';

/// Default number of hex characters kept from a composite digest.
///
/// 8 hex characters = 32 bits. With `n` relationship instances the chance of
/// any collision is roughly `n^2 / 2^33`, about 0.1% at 3,000 instances.
pub const DEFAULT_DIGEST_CHARS: usize = 8;

/// Smallest accepted composite digest length.
pub const MIN_DIGEST_CHARS: usize = 8;

/// Largest accepted composite digest length (full BLAKE3 hex output).
pub const MAX_DIGEST_CHARS: usize = 64;

/// Tokens that normalize to `true`, compared after lowercasing.
pub const TRUTHY_TOKENS: &[&str] = &["sí", "si", "yes", "true", "1"];

/// Tokens the strict boolean policy accepts as `false`.
pub const FALSY_TOKENS: &[&str] = &["no", "false", "0"];

/// Maximum accepted cell length; longer cells are treated as attribute errors.
pub const MAX_CELL_LENGTH: usize = 4096;
