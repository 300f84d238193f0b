//! Structured Logging with Sensitive Data Redaction
//!
//! Log entries are written to stderr as
//! `[timestamp] LEVEL [module] message | key=value ...`.
//! Values whose key looks like key material are always redacted,
//! digests and hashes are shortened.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Minimum level that reaches stderr
static MIN_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set the minimum level that is written
pub fn set_min_level(level: LogLevel) {
    MIN_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Enable debug logging
pub fn enable_debug() {
    set_min_level(LogLevel::Debug);
}

pub fn is_enabled(level: LogLevel) -> bool {
    level as u8 >= MIN_LEVEL.load(Ordering::SeqCst)
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, redacted according to its key
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value = redact_if_sensitive(key, &value.to_string());
        self.fields.push((key, value));
        self
    }

    /// Render the entry without the timestamp
    pub fn render(&self) -> String {
        let mut line = format!("{} [{}] {}", self.level, self.module, self.message);
        for (i, (key, value)) in self.fields.iter().enumerate() {
            line.push_str(if i == 0 { " | " } else { " " });
            line.push_str(key);
            line.push('=');
            line.push_str(value);
        }
        line
    }

    /// Write the entry to stderr; level filtering happens in the `log_*!` macros
    pub fn log(self) {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        eprintln!("[{}] {}", timestamp, self.render());
    }
}

/// How a field value is rendered, decided by its key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Redaction {
    /// Key material: never shown
    Full,
    /// Digests: first and last characters only
    Hash,
    None,
}

/// Substrings marking key material
const SECRET_KEYS: &[&str] = &["private_key", "privatekey", "secret", "seed", "key_hex", "signing_key"];

/// Substrings marking digests
const HASH_KEYS: &[&str] = &["hash", "digest", "separator"];

fn classify(key: &str) -> Redaction {
    let key = key.to_lowercase();
    if SECRET_KEYS.iter().any(|k| key.contains(k)) {
        Redaction::Full
    } else if HASH_KEYS.iter().any(|k| key.contains(k)) {
        Redaction::Hash
    } else {
        Redaction::None
    }
}

/// Redact a value if the key suggests it's sensitive
fn redact_if_sensitive(key: &str, value: &str) -> String {
    match classify(key) {
        Redaction::Full => redact_value(value),
        Redaction::Hash => redact_hash(value),
        Redaction::None => value.to_string(),
    }
}

/// Fully redact a sensitive value, keeping only its length
fn redact_value(value: &str) -> String {
    match value.len() {
        0 => "[EMPTY]".to_string(),
        1..=4 => "[REDACTED]".to_string(),
        len => format!("[REDACTED:{}chars]", len),
    }
}

/// Shorten a hash to its first 10 hex digits and last 6
fn redact_hash(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }
    if trimmed.len() <= 20 || !trimmed.is_ascii() {
        return trimmed.to_string();
    }

    let prefix_len = if trimmed.starts_with("0x") { 12 } else { 10 };
    format!("{}...{}", &trimmed[..prefix_len], &trimmed[trimmed.len() - 6..])
}

/// Build and emit a log entry at the given level.
/// Field values are only evaluated when the level is enabled.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_at {
    ($level:ident, $module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        if $crate::utils::logging::is_enabled($crate::utils::logging::LogLevel::$level) {
            $crate::utils::logging::LogEntry::new(
                $crate::utils::logging::LogLevel::$level,
                $module,
                $msg,
            )
            $(.field(stringify!($key), &$value))*
            .log()
        }
    };
}

/// Debug-level entry; dropped unless debug logging is enabled
#[macro_export]
macro_rules! log_debug {
    ($($args:tt)*) => { $crate::__log_at!(Debug, $($args)*) };
}

#[macro_export]
macro_rules! log_info {
    ($($args:tt)*) => { $crate::__log_at!(Info, $($args)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($args:tt)*) => { $crate::__log_at!(Warn, $($args)*) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_value() {
        assert_eq!(redact_value(""), "[EMPTY]");
        assert_eq!(redact_value("abc"), "[REDACTED]");
        assert_eq!(redact_value("secret_key_12345"), "[REDACTED:16chars]");
    }

    #[test]
    fn test_redact_hash() {
        let hash = "0xbe609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2";
        let redacted = redact_hash(hash);
        assert_eq!(redacted, "0xbe609aee34...957bd2");
    }

    #[test]
    fn test_redact_if_sensitive() {
        assert!(redact_if_sensitive("private_key", "0x4c0883a6").contains("REDACTED"));
        assert!(redact_if_sensitive("domain_separator", &"ab".repeat(32)).contains("..."));
        assert_eq!(redact_if_sensitive("primary_type", "Mail"), "Mail");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("SIGNING_KEY"), Redaction::Full);
        assert_eq!(classify("struct_hash"), Redaction::Hash);
        assert_eq!(classify("field"), Redaction::None);
    }

    #[test]
    fn test_level_filter() {
        assert!(is_enabled(LogLevel::Error));
        assert!(LogLevel::Debug < LogLevel::Warn);
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
    }

    #[test]
    fn test_disabled_level_skips_field_evaluation() {
        let evaluated = std::cell::Cell::new(false);
        let expensive = || {
            evaluated.set(true);
            "value"
        };

        set_min_level(LogLevel::Warn);
        crate::log_info!("test", "skipped", detail = expensive());
        assert!(!evaluated.get());

        crate::log_warn!("test", "emitted", detail = expensive());
        assert!(evaluated.get());
        set_min_level(LogLevel::Info);
    }

    #[test]
    fn test_log_entry_render() {
        let entry = LogEntry::new(LogLevel::Info, "eip712", "signed payload")
            .field("primary_type", "Mail")
            .field("private_key", "c85ef7d79691fe79573b1a7064c19c1a");

        let rendered = entry.render();
        assert!(rendered.starts_with("INFO [eip712] signed payload | "));
        assert!(rendered.contains("primary_type=Mail"));
        assert!(rendered.contains("private_key=[REDACTED:32chars]"));
    }
}
