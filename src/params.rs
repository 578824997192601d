//! Request parameters and account credentials.

use std::collections::BTreeMap;
use std::fmt;

/// Parameter that asks for the call's fingerprint instead of the call itself
pub const JUST_HASH: &str = "just_hash";

/// Parameter that overrides the source (URL or file path) for a single call
pub const URL_OVERRIDE: &str = "url";

/// Which pair of authentication parameters a client sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// `userid` + `apikey`
    Legacy,
    /// `keyid` + `vcode`
    #[default]
    Key,
}

impl AuthMode {
    /// Parameter names for the (identity, secret) pair
    pub fn parameter_names(self) -> (&'static str, &'static str) {
        match self {
            AuthMode::Legacy => ("userid", "apikey"),
            AuthMode::Key => ("keyid", "vcode"),
        }
    }
}

/// Account credentials used to populate every outgoing request
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credentials {
    /// Key id (or legacy user id)
    pub key_id: String,
    /// Verification code (or legacy API key)
    pub verification_code: String,
    /// Character id sent when a call does not name one
    pub character_id: String,
    /// Parameter shape
    pub auth_mode: AuthMode,
}

impl Credentials {
    /// Key-based credentials (`keyid` + `vcode`)
    pub fn key(key_id: impl ToString, verification_code: impl Into<String>) -> Self {
        Self {
            key_id: key_id.to_string(),
            verification_code: verification_code.into(),
            character_id: String::new(),
            auth_mode: AuthMode::Key,
        }
    }

    /// Legacy credentials (`userid` + `apikey`)
    pub fn legacy(user_id: impl ToString, api_key: impl Into<String>) -> Self {
        Self {
            key_id: user_id.to_string(),
            verification_code: api_key.into(),
            character_id: String::new(),
            auth_mode: AuthMode::Legacy,
        }
    }

    /// Anonymous credentials for public endpoints
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Set the default character id
    pub fn with_character(mut self, character_id: impl ToString) -> Self {
        self.character_id = character_id.to_string();
        self
    }

    /// Parameters every request starts from
    pub fn default_params(&self) -> RequestParams {
        let (id_name, secret_name) = self.auth_mode.parameter_names();
        let mut params = RequestParams::new();
        params.insert("characterid", &self.character_id);
        params.insert(id_name, &self.key_id);
        params.insert(secret_name, &self.verification_code);
        params
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key_id", &self.key_id)
            .field("verification_code", &"<redacted>")
            .field("character_id", &self.character_id)
            .field("auth_mode", &self.auth_mode)
            .finish()
    }
}

/// Ordered request parameters.
///
/// Keys are stored lowercase and empty values are never stored, so an empty
/// value is indistinguishable from an absent key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestParams {
    entries: BTreeMap<String, String>,
}

impl RequestParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter. An empty value removes the key instead.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl ToString) -> &mut Self {
        let key = key.as_ref().to_lowercase();
        let value = value.to_string();
        if value.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value);
        }
        self
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, key: impl AsRef<str>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert only when a value is present
    pub fn with_opt<V: ToString>(mut self, key: impl AsRef<str>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Value for a key (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Check whether a key is present (case-insensitive)
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_lowercase())
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(&key.to_lowercase())
    }

    /// Mark this call as fingerprint-only
    pub fn just_hash(self) -> Self {
        self.with(JUST_HASH, "true")
    }

    /// Overlay `self` on top of `defaults`; values already in `self` win.
    pub fn merged_over(&self, defaults: &RequestParams) -> RequestParams {
        let mut merged = defaults.clone();
        for (key, value) in &self.entries {
            merged.entries.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Iterate in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate in key order, skipping the control parameters
    /// ([`JUST_HASH`] and [`URL_OVERRIDE`])
    pub fn payload(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(k, _)| *k != JUST_HASH && *k != URL_OVERRIDE)
    }

    /// Number of stored parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: ToString> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = RequestParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
