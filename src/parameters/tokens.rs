//! Conversion of raw configuration tokens into typed values.
//!
//! The configuration loader hands the binder plain strings; each bindable
//! type decides how to read one token. Conversion never trims more than
//! surrounding whitespace and never guesses units.

/// A type that can be read from a single configuration token.
pub trait FromToken: Sized {
    /// Human-readable name used in conversion error messages.
    const EXPECTED: &'static str;

    /// Parse one token, or `None` when it is not a valid value.
    fn from_token(token: &str) -> Option<Self>;
}

impl FromToken for f64 {
    const EXPECTED: &'static str = "a real number";

    fn from_token(token: &str) -> Option<Self> {
        token.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
    }
}

impl FromToken for u32 {
    const EXPECTED: &'static str = "a non-negative integer";

    fn from_token(token: &str) -> Option<Self> {
        token.trim().parse().ok()
    }
}

impl FromToken for usize {
    const EXPECTED: &'static str = "a non-negative integer";

    fn from_token(token: &str) -> Option<Self> {
        token.trim().parse().ok()
    }
}

impl FromToken for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_token(token: &str) -> Option<Self> {
        token.trim().parse().ok()
    }
}

impl FromToken for bool {
    const EXPECTED: &'static str = "a boolean (true/false, yes/no, t/f, y/n, 1/0)";

    fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" => Some(false),
            _ => None,
        }
    }
}

impl FromToken for String {
    const EXPECTED: &'static str = "a string";

    fn from_token(token: &str) -> Option<Self> {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reals_reject_nan_and_garbage() {
        assert_eq!(f64::from_token(" 0.25 "), Some(0.25));
        assert_eq!(f64::from_token("1e-3"), Some(1e-3));
        assert_eq!(f64::from_token("NaN"), None);
        assert_eq!(f64::from_token("zero"), None);
    }

    #[test]
    fn booleans_accept_common_spellings() {
        for yes in ["true", "T", "Yes", "y", "1"] {
            assert_eq!(bool::from_token(yes), Some(true), "{yes}");
        }
        for no in ["FALSE", "f", "no", "N", "0"] {
            assert_eq!(bool::from_token(no), Some(false), "{no}");
        }
        assert_eq!(bool::from_token("maybe"), None);
    }

    #[test]
    fn unsigned_integers_reject_negative_values() {
        assert_eq!(u32::from_token("1990"), Some(1990));
        assert_eq!(u32::from_token("-1"), None);
        assert_eq!(i64::from_token("-1"), Some(-1));
    }
}
