//! The per-round register file: nine named slots (`a,b,c,l,s,t,x,y,p`) that
//! hold the working state of a DSL program. Mirrors `xent.common.registers`.

use std::collections::BTreeMap;

use crate::constants::{is_known_register, is_list_register, is_public_register, is_static_register};
use crate::error::XentError;
use crate::xlist::XList;
use crate::xstring::XString;

/// The value held by one register: either a scalar string or a list,
/// matching whichever of `LIST_REGISTERS` the register name falls in.
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterValue {
    Str(XString),
    List(XList),
}

impl RegisterValue {
    pub fn as_str(&self) -> Result<&XString, XentError> {
        match self {
            Self::Str(s) => Ok(s),
            Self::List(_) => Err(XentError::Type("expected a string value, found a list".into())),
        }
    }

    pub fn as_list(&self) -> Result<&XList, XentError> {
        match self {
            Self::List(l) => Ok(l),
            Self::Str(_) => Err(XentError::Type("expected a list value, found a string".into())),
        }
    }

    fn bind_flags(&mut self, static_flag: bool, public_flag: bool) {
        match self {
            Self::Str(s) => s.bind_flags(static_flag, public_flag),
            Self::List(l) => l.bind_flags(static_flag, public_flag),
        }
    }
}

impl From<XString> for RegisterValue {
    fn from(s: XString) -> Self {
        Self::Str(s)
    }
}

impl From<XList> for RegisterValue {
    fn from(l: XList) -> Self {
        Self::List(l)
    }
}

/// The live state of one round: a sparse map from register name to value.
/// Registers start unbound; reading an unbound register or writing twice to
/// a static register are both game-kind errors.
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    values: BTreeMap<char, RegisterValue>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` into register `name`, applying that register's fixed
    /// `static`/`public` attributes to the value. Per spec.md §3, writing
    /// twice to a static register is a game-kind error; non-static
    /// registers may be overwritten freely.
    pub fn write(&mut self, name: char, mut value: RegisterValue) -> Result<(), XentError> {
        if !is_known_register(name) {
            return Err(XentError::Internal(format!("unknown register '{name}'")));
        }
        if is_static_register(name) && self.values.contains_key(&name) {
            return Err(XentError::Game(format!("register '{name}' is static and already bound")));
        }
        if is_list_register(name) && !matches!(value, RegisterValue::List(_)) {
            return Err(XentError::Type(format!("register '{name}' holds a list, not a string")));
        }
        value.bind_flags(is_static_register(name), is_public_register(name));
        self.values.insert(name, value);
        Ok(())
    }

    pub fn read(&self, name: char) -> Result<&RegisterValue, XentError> {
        self.values
            .get(&name)
            .ok_or_else(|| XentError::Game(format!("register '{name}' read before being assigned")))
    }

    pub fn is_bound(&self, name: char) -> bool {
        self.values.contains_key(&name)
    }

    /// The snapshot a presentation function may see: every bound register
    /// whose name is in `PUBLIC_REGISTERS`.
    pub fn public_snapshot(&self) -> BTreeMap<char, RegisterValue> {
        self.values
            .iter()
            .filter(|(name, _)| is_public_register(**name))
            .map(|(name, value)| (*name, value.clone()))
            .collect()
    }

    /// The snapshot an omniscient player (the zero-sum adversaries, the
    /// narrator) may see: every bound register regardless of its public flag.
    pub fn full_snapshot(&self) -> BTreeMap<char, RegisterValue> {
        self.values.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writing_static_register_twice_is_a_game_error() {
        let mut rf = RegisterFile::new();
        rf.write('a', RegisterValue::Str(XString::new("x"))).unwrap();
        let err = rf.write('a', RegisterValue::Str(XString::new("y"))).unwrap_err();
        assert!(matches!(err, XentError::Game(_)));
    }

    #[test]
    fn non_static_register_may_be_overwritten() {
        let mut rf = RegisterFile::new();
        rf.write('x', RegisterValue::Str(XString::new("1"))).unwrap();
        rf.write('x', RegisterValue::Str(XString::new("2"))).unwrap();
        assert_eq!(rf.read('x').unwrap().as_str().unwrap().primary(), "2");
    }

    #[test]
    fn reading_unbound_register_is_a_game_error() {
        let rf = RegisterFile::new();
        assert!(matches!(rf.read('a').unwrap_err(), XentError::Game(_)));
    }

    #[test]
    fn write_binds_register_flags_onto_value() {
        let mut rf = RegisterFile::new();
        rf.write('a', RegisterValue::Str(XString::new("x"))).unwrap();
        let v = rf.read('a').unwrap().as_str().unwrap();
        assert!(v.is_static());
        assert!(v.is_public());
    }

    #[test]
    fn public_snapshot_excludes_non_public_registers() {
        let mut rf = RegisterFile::new();
        rf.write('a', RegisterValue::Str(XString::new("pub"))).unwrap();
        rf.write('s', RegisterValue::Str(XString::new("secret"))).unwrap();
        let snap = rf.public_snapshot();
        assert!(snap.contains_key(&'a'));
        assert!(!snap.contains_key(&'s'));
    }

    #[test]
    fn list_register_rejects_string_value() {
        let mut rf = RegisterFile::new();
        let err = rf.write('l', RegisterValue::Str(XString::new("x"))).unwrap_err();
        assert!(matches!(err, XentError::Type(_)));
    }
}
