//! `XString`: an immutable text value bound to a tokenization, carrying the
//! `static`/`public` flags described in spec.md §3.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An immutable piece of text, with zero or more auxiliary variants used
/// when judging alternatives (e.g. a rewritten version of the primary
/// string). Equality and hashing are defined by the primary string alone.
///
/// Per spec.md §6, an `XString` serializes as its bare primary string in
/// result files — `aux_strings` and the round-scoped flags are working
/// state, not persisted history.
#[derive(Debug, Clone)]
pub struct XString {
    primary_string: String,
    aux_strings: Vec<String>,
    pub(crate) static_flag: bool,
    pub(crate) public_flag: bool,
}

impl Serialize for XString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.primary_string)
    }
}

impl<'de> Deserialize<'de> for XString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let primary = String::deserialize(deserializer)?;
        Ok(XString::new(primary))
    }
}

impl XString {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary_string: primary.into(),
            aux_strings: Vec::new(),
            static_flag: false,
            public_flag: false,
        }
    }

    pub fn with_aux(primary: impl Into<String>, aux: Vec<String>) -> Self {
        Self {
            primary_string: primary.into(),
            aux_strings: aux,
            static_flag: false,
            public_flag: false,
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary_string
    }

    pub fn aux(&self) -> &[String] {
        &self.aux_strings
    }

    pub fn is_static(&self) -> bool {
        self.static_flag
    }

    pub fn is_public(&self) -> bool {
        self.public_flag
    }

    /// Apply the attributes of the register this value is being bound to.
    /// Per spec.md §3: "once written to a register, the value's identity
    /// for the rest of the round is fixed by the register's attributes."
    pub fn bind_flags(&mut self, static_flag: bool, public_flag: bool) {
        self.static_flag = static_flag;
        self.public_flag = public_flag;
    }

    /// Concatenate two strings. The result carries neither flag until it is
    /// itself bound to a register.
    pub fn concat(&self, other: &XString) -> XString {
        XString::new(format!("{}{}", self.primary_string, other.primary_string))
    }

    pub fn len_chars(&self) -> usize {
        self.primary_string.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.primary_string.is_empty()
    }
}

impl PartialEq for XString {
    fn eq(&self, other: &Self) -> bool {
        self.primary_string == other.primary_string
    }
}

impl Eq for XString {}

impl std::fmt::Display for XString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.primary_string)
    }
}

impl From<&str> for XString {
    fn from(s: &str) -> Self {
        XString::new(s)
    }
}

impl From<String> for XString {
    fn from(s: String) -> Self {
        XString::new(s)
    }
}
