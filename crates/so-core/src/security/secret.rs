use std::fmt;
use std::ops::Deref;
use zeroize::Zeroize;

/// A password or access token that must never be logged, cloned, or serialized.
///
/// - not `Clone`
/// - not `Serialize` / `Deserialize`
/// - `Debug` / `Display` print a placeholder
/// - zeroed on drop
pub struct SecretString {
    inner: String,
}

impl SecretString {
    pub fn new(value: String) -> Self {
        Self { inner: value }
    }

    /// Borrow the inner secret as &str.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Character count, used by password length rules.
    pub fn char_len(&self) -> usize {
        self.inner.chars().count()
    }

    /// Makes an independent copy. Call sites are the only places a secret is duplicated.
    pub fn duplicate(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Deref for SecretString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.expose()
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_are_redacted() {
        let secret = SecretString::new("hunter22".to_string());
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(format!("{secret}"), "[REDACTED]");
        assert_eq!(secret.expose(), "hunter22");
        assert_eq!(secret.char_len(), 8);
    }
}
