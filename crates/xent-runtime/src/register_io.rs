//! Bridges `xent_core::RegisterFile` (which only knows about
//! `RegisterValue`) and the evaluator's richer `Value` type.

use xent_core::{RegisterFile, RegisterValue, XentError};

use crate::value::Value;

pub trait RegisterFileExt {
    fn read_value(&self, name: char) -> Result<Value, XentError>;
}

impl RegisterFileExt for RegisterFile {
    fn read_value(&self, name: char) -> Result<Value, XentError> {
        match self.read(name)? {
            RegisterValue::Str(s) => Ok(Value::Str(s.clone())),
            RegisterValue::List(l) => Ok(Value::List(l.clone())),
        }
    }
}
