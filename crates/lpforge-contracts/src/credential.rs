use std::fmt;

use zeroize::Zeroize;

/// An API key supplied by the user.
///
/// The value is only reachable through [`Credential::expose`]; `Debug` and
/// `Display` print a redacted placeholder so the key cannot leak into logs or
/// event files. The buffer is wiped when the credential is dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let mut raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            raw.zeroize();
            return None;
        }
        let value = trimmed.to_string();
        raw.zeroize();
        Some(Self(value))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Session-scoped holder for the active credential.
///
/// One holder lives for one session (a CLI process, or one HTTP request on the
/// server side) and is passed explicitly to every generation call. Nothing
/// here touches disk.
#[derive(Debug, Default, Clone)]
pub struct CredentialHolder {
    current: Option<Credential>,
}

impl CredentialHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(raw: impl Into<String>) -> Self {
        let mut holder = Self::new();
        holder.set(raw);
        holder
    }

    pub fn get(&self) -> Option<&Credential> {
        self.current.as_ref()
    }

    /// Setting an empty key is the same as [`CredentialHolder::clear`].
    pub fn set(&mut self, raw: impl Into<String>) {
        self.current = Credential::new(raw);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn has_key(&self) -> bool {
        self.current.is_some()
    }
}
