//! Encoding Configuration
//!
//! Settings that bound the recursive EIP-712 data encoder:
//! - Maximum nesting depth for structs and arrays
//! - Whether fixed-size array lengths are enforced
//!
//! Presets cover the common cases; `from_env` lets deployments tighten
//! them without a rebuild.

/// Environment variable overriding `max_depth`
pub const MAX_DEPTH_ENV: &str = "EIP712_MAX_DEPTH";

/// Environment variable enabling strict fixed-array lengths
pub const STRICT_ARRAYS_ENV: &str = "EIP712_STRICT_ARRAYS";

/// Default maximum nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Upper bound above which `validate` warns about stack usage
const DEPTH_WARNING_THRESHOLD: usize = 1024;

/// Encoder settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingSettings {
    /// Preset these settings were derived from
    pub level: EncodingLevel,
    /// Maximum struct/array nesting depth before encoding aborts
    pub max_depth: usize,
    /// Require `T[N]` values to carry exactly N elements.
    /// Off by default: enforcing it changes which documents hash at all.
    pub strict_array_length: bool,
}

/// Encoding presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingLevel {
    /// Hash-compatible with existing signers
    Standard,
    /// Tighter limits, fixed array lengths enforced
    Strict,
    /// User-defined settings
    Custom,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self::standard()
    }
}

impl EncodingSettings {
    /// Standard preset
    pub fn standard() -> Self {
        Self {
            level: EncodingLevel::Standard,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_array_length: false,
        }
    }

    /// Strict preset
    pub fn strict() -> Self {
        Self {
            level: EncodingLevel::Strict,
            max_depth: 32,
            strict_array_length: true,
        }
    }

    /// Override the depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self.level = EncodingLevel::Custom;
        self
    }

    /// Standard preset with environment overrides applied
    pub fn from_env() -> Self {
        Self::standard().apply_overrides(
            std::env::var(MAX_DEPTH_ENV).ok().as_deref(),
            std::env::var(STRICT_ARRAYS_ENV).ok().as_deref(),
        )
    }

    fn apply_overrides(mut self, max_depth: Option<&str>, strict: Option<&str>) -> Self {
        if let Some(depth) = max_depth.and_then(|v| v.trim().parse::<usize>().ok()) {
            self.max_depth = depth;
            self.level = EncodingLevel::Custom;
        }
        if let Some(flag) = strict {
            let flag = flag.trim().to_ascii_lowercase();
            self.strict_array_length = matches!(flag.as_str(), "1" | "true" | "yes" | "on");
            self.level = EncodingLevel::Custom;
        }
        self
    }

    /// Validate settings consistency
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.max_depth == 0 {
            warnings.push("max_depth is 0: every struct encoding will fail".to_string());
        }
        if self.max_depth > DEPTH_WARNING_THRESHOLD {
            warnings.push(format!(
                "max_depth {} exceeds {}: deeply nested input may exhaust the stack",
                self.max_depth, DEPTH_WARNING_THRESHOLD
            ));
        }

        warnings
    }
}
