//! Request parameters and the declarative field-to-wire mapping.
//!
//! [`RequestParameters`] keeps its entries sorted by key, so its
//! URL-encoded form is canonical: the same parameter set always encodes to
//! the same string. That string is what gets signed and what gets sent.
//!
//! Request types describe their wire shape as a list of [`WireField`]s via
//! [`ToParameters`]. A field whose value is `None` is left off the wire.

use std::{collections::BTreeMap, fmt};

use url::form_urlencoded;

use crate::error::{GatewayError, Result};

/// Ordered mapping of parameter name to string value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RequestParameters {
    entries: BTreeMap<String, String>,
}

impl RequestParameters {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a parameter set from wire fields, skipping absent values.
    #[must_use]
    pub fn from_fields(fields: impl IntoIterator<Item = WireField>) -> Self {
        let mut params = Self::new();
        for field in fields {
            if let Some(value) = field.value {
                params.insert(field.name, value);
            }
        }
        params
    }

    /// Inserts a value, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Returns true if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlays `other` on top of `self`; entries already present win.
    pub fn fill_missing(&mut self, other: &Self) {
        for (name, value) in other.iter() {
            self.entries.entry(name.to_owned()).or_insert_with(|| value.to_owned());
        }
    }

    /// Encodes as `application/x-www-form-urlencoded`, keys sorted.
    ///
    /// Spaces become `+`; everything outside `A-Z a-z 0-9 * - . _` is
    /// percent-encoded.
    #[must_use]
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new()).extend_pairs(self.iter()).finish()
    }
}

// Values may carry credentials, so Debug lists names only.
impl fmt::Debug for RequestParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestParameters").field("names", &self.entries.keys()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// One wire field: a gateway parameter name and its value, if sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireField {
    /// Gateway parameter name.
    pub name: &'static str,
    /// Encoded value; `None` means the field is not sent.
    pub value: Option<String>,
}

impl WireField {
    /// Field that is always sent.
    #[must_use]
    pub fn required(name: &'static str, value: impl fmt::Display) -> Self {
        Self { name, value: Some(value.to_string()) }
    }

    /// Field that must carry a non-empty string.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if `value` is empty.
    pub fn mandatory(name: &'static str, value: &str) -> Result<Self> {
        if value.is_empty() {
            return Err(GatewayError::InvalidInput(format!("{name} is required")));
        }
        Ok(Self { name, value: Some(value.to_owned()) })
    }

    /// Field sent only when the string is non-empty.
    #[must_use]
    pub fn non_empty(name: &'static str, value: &str) -> Self {
        Self { name, value: (!value.is_empty()).then(|| value.to_owned()) }
    }

    /// Field sent only when a value is present.
    #[must_use]
    pub fn optional<T: fmt::Display>(name: &'static str, value: Option<T>) -> Self {
        Self { name, value: value.map(|v| v.to_string()) }
    }

    /// Field sent only when the optional string is present and non-empty.
    #[must_use]
    pub fn optional_str(name: &'static str, value: Option<&str>) -> Self {
        Self::non_empty(name, value.unwrap_or_default())
    }
}

/// Converts a request into its sparse gateway parameter set.
pub trait ToParameters {
    /// Lists every wire field of this request in gateway order.
    ///
    /// # Errors
    ///
    /// Returns an error when a field cannot be encoded, for example an amount
    /// in an unsupported currency.
    fn wire_fields(&self) -> Result<Vec<WireField>>;

    /// Builds the parameter set, omitting absent fields.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ToParameters::wire_fields`].
    fn to_parameters(&self) -> Result<RequestParameters> {
        Ok(RequestParameters::from_fields(self.wire_fields()?))
    }
}
