//! `XList`: an ordered sequence of `XString`s, mirroring `xent.common.x_list`.

use serde::{Deserialize, Serialize};

use crate::xstring::XString;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct XList {
    items: Vec<XString>,
    #[serde(default)]
    pub(crate) static_flag: bool,
    #[serde(default)]
    pub(crate) public_flag: bool,
    #[serde(default)]
    pub name: Option<String>,
}

impl XList {
    pub fn new(items: Vec<XString>) -> Self {
        Self {
            items,
            static_flag: false,
            public_flag: false,
            name: None,
        }
    }

    pub fn named(items: Vec<XString>, name: impl Into<String>) -> Self {
        Self {
            items,
            static_flag: false,
            public_flag: false,
            name: Some(name.into()),
        }
    }

    pub fn items(&self) -> &[XString] {
        &self.items
    }

    pub fn is_static(&self) -> bool {
        self.static_flag
    }

    pub fn is_public(&self) -> bool {
        self.public_flag
    }

    pub fn bind_flags(&mut self, static_flag: bool, public_flag: bool) {
        self.static_flag = static_flag;
        self.public_flag = public_flag;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Concatenate two lists. The `static`/`public` flags and `name` are
    /// inherited from `self`, matching the original `XList.__add__`.
    pub fn concat(&self, other: &XList) -> XList {
        let mut items = self.items.clone();
        items.extend(other.items.iter().cloned());
        XList {
            items,
            static_flag: self.static_flag,
            public_flag: self.public_flag,
            name: self.name.clone(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, XString> {
        self.items.iter()
    }

    pub fn contains(&self, item: &XString) -> bool {
        self.items.contains(item)
    }
}

impl<'a> IntoIterator for &'a XList {
    type Item = &'a XString;
    type IntoIter = std::slice::Iter<'a, XString>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
