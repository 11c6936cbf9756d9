//! The instruction and expression shapes a parsed program is made of.
//! Mirrors the line-indexed instruction stream described in spec.md §4.C.

use xent_core::{PlayerName, XFlag};

/// An expression, evaluated left-to-right with no short-circuiting. Per
/// spec.md §4.C, within one line all sub-expressions are evaluated before
/// any register write takes effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    StringLiteral(String),
    Register(char),
    /// `story()` — draw one text from the configured text generator.
    Story,
    /// `remove_common_words(x, y)` — `x` with tokens whose lowercased
    /// surface appears in `y` removed.
    RemoveCommonWords(Box<Expr>, Box<Expr>),
    /// `xed(ctx | target)` — judge cross-entropy of `target` given `ctx`.
    Xed(Box<Expr>, Box<Expr>),
    /// `+`. Dispatches on operand type at evaluation time: string/list
    /// operands concatenate, `TokenXentList` operands sum, number operands
    /// add arithmetically. A DSL author writes `+` the same way regardless
    /// of which case applies.
    Add(Box<Expr>, Box<Expr>),
    /// Unary `-` on a `TokenXentList`-valued operand.
    Neg(Box<Expr>),
    /// `first_n_tokens(text, n)`.
    FirstNTokens(Box<Expr>, Box<Expr>),
    /// `len(x)` — character length of a string-valued expression, used in
    /// `ensure` conditions.
    Len(Box<Expr>),
    /// A bare numeric literal, as used on either side of a `len(x) > 0`
    /// style comparison.
    Number(f64),
}

/// A comparison used as one `ensure` condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cond {
    pub left: Expr,
    pub op: CompareOp,
    pub right: Expr,
}

/// One instruction, tagged with the source line it came from for error
/// reporting and for `failed_ensure` jump targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `assign(r = expr)`.
    Assign { register: char, expr: Expr, line: usize },
    /// `reveal(r[, r...])`.
    Reveal { registers: Vec<char>, line: usize },
    /// `elicit([player,] r, max_tokens)`. `player` is `None` when the unit
    /// has exactly one non-`env` player and the assignment is unambiguous;
    /// multi-player games must name the player explicitly.
    Elicit {
        player: Option<PlayerName>,
        register: char,
        max_tokens: u32,
        line: usize,
    },
    /// `reward([player,] expr)`. Same player-omission rule as `Elicit`.
    Reward {
        player: Option<PlayerName>,
        expr: Expr,
        line: usize,
    },
    /// `ensure(cond[, cond...], beacon=label)`.
    Ensure {
        conditions: Vec<Cond>,
        beacon: String,
        line: usize,
    },
    /// `label:` — a no-op jump target.
    Label { flag: XFlag },
}

impl Instruction {
    pub fn line(&self) -> usize {
        match self {
            Self::Assign { line, .. }
            | Self::Reveal { line, .. }
            | Self::Elicit { line, .. }
            | Self::Reward { line, .. }
            | Self::Ensure { line, .. } => *line,
            Self::Label { flag } => flag.line,
        }
    }
}

/// A parsed program: the instruction sequence plus the label table needed
/// to resolve `ensure` beacons without a second pass at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// The 0-based instruction index a label points at, or `None` if no
    /// such label was declared.
    pub fn resolve_label(&self, name: &str) -> Option<usize> {
        self.instructions.iter().position(|ins| matches!(ins, Instruction::Label { flag } if flag.name == name))
    }
}
