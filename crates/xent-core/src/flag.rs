//! `XFlag`: a named location marker a DSL program can jump to. Mirrors
//! `xent.common.x_flag`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XFlag {
    pub name: String,
    pub line: usize,
}

impl XFlag {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self { name: name.into(), line }
    }
}
