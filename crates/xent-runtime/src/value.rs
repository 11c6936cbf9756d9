//! Expression evaluation: turns a parsed `Expr` into a concrete value given
//! the current register file, judge, and text generator. Evaluation itself
//! is synchronous — the only suspension point in a round is `elicit`,
//! handled directly by the runtime's instruction loop.

use xent_core::{RegisterValue, TokenXentList, XString, XentError};
use xent_dsl::{CompareOp, Cond, Expr};
use xent_judge::Judge;
use xent_textgen::TextGenerator;

use crate::register_io::RegisterFileExt;

/// The result of evaluating one expression. Distinct from `RegisterValue`
/// because an expression may produce a `TokenXentList` or bare number,
/// neither of which can be written to a register.
#[derive(Debug, Clone)]
pub enum Value {
    Str(XString),
    List(xent_core::XList),
    Xent(TokenXentList),
    Number(f64),
}

impl Value {
    pub fn into_register_value(self) -> Result<RegisterValue, XentError> {
        match self {
            Self::Str(s) => Ok(RegisterValue::Str(s)),
            Self::List(l) => Ok(RegisterValue::List(l)),
            Self::Xent(_) => Err(XentError::Type("cannot assign a token-xent list to a register".into())),
            Self::Number(_) => Err(XentError::Type("cannot assign a bare number to a register".into())),
        }
    }

    fn as_str(&self) -> Result<&str, XentError> {
        match self {
            Self::Str(s) => Ok(s.primary()),
            other => Err(XentError::Type(format!("expected a string value, found {other:?}"))),
        }
    }

    fn as_number(&self) -> Result<f64, XentError> {
        match self {
            Self::Number(n) => Ok(*n),
            other => Err(XentError::Type(format!("expected a number, found {other:?}"))),
        }
    }
}

pub fn eval_expr(
    expr: &Expr,
    registers: &xent_core::RegisterFile,
    judge: &dyn Judge,
    text_generator: &dyn TextGenerator,
) -> Result<Value, XentError> {
    match expr {
        Expr::StringLiteral(s) => Ok(Value::Str(XString::new(s.clone()))),
        Expr::Register(name) => registers.read_value(*name),
        Expr::Story => Ok(Value::Str(XString::new(text_generator.generate_text(None)))),
        Expr::RemoveCommonWords(x, y) => {
            let x_val = eval_expr(x, registers, judge, text_generator)?;
            let y_val = eval_expr(y, registers, judge, text_generator)?;
            let removed = remove_common_words(x_val.as_str()?, y_val.as_str()?);
            Ok(Value::Str(XString::new(removed)))
        },
        Expr::Xed(ctx, target) => {
            let ctx_val = eval_expr(ctx, registers, judge, text_generator)?;
            let target_val = eval_expr(target, registers, judge, text_generator)?;
            Ok(Value::Xent(judge.xent(ctx_val.as_str()?, target_val.as_str()?)))
        },
        Expr::FirstNTokens(text, n) => {
            let text_val = eval_expr(text, registers, judge, text_generator)?;
            let n_val = eval_expr(n, registers, judge, text_generator)?;
            let n = n_val.as_number()? as usize;
            Ok(Value::Str(XString::new(judge.first_n_tokens(text_val.as_str()?, n))))
        },
        Expr::Len(inner) => {
            let value = eval_expr(inner, registers, judge, text_generator)?;
            Ok(Value::Number(value.as_str()?.chars().count() as f64))
        },
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Add(left, right) => {
            let left_val = eval_expr(left, registers, judge, text_generator)?;
            let right_val = eval_expr(right, registers, judge, text_generator)?;
            add_values(left_val, right_val)
        },
        Expr::Neg(inner) => match eval_expr(inner, registers, judge, text_generator)? {
            Value::Xent(x) => Ok(Value::Xent(-x)),
            Value::Number(n) => Ok(Value::Number(-n)),
            other => Err(XentError::Type(format!("cannot negate {other:?}"))),
        },
    }
}

fn add_values(left: Value, right: Value) -> Result<Value, XentError> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a.concat(&b))),
        (Value::List(a), Value::List(b)) => Ok(Value::List(a.concat(&b))),
        (Value::Xent(a), Value::Xent(b)) => Ok(Value::Xent(a + b)),
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (a, b) => Err(XentError::Type(format!("cannot add {a:?} and {b:?}"))),
    }
}

fn remove_common_words(x: &str, y: &str) -> String {
    let common: std::collections::HashSet<String> = xent_judge::tokenizer::tokenize(y).into_iter().map(|t| t.trim().to_lowercase()).collect();
    xent_judge::tokenizer::tokenize(x)
        .into_iter()
        .filter(|t| !common.contains(&t.trim().to_lowercase()))
        .collect()
}

pub fn eval_cond(
    cond: &Cond,
    registers: &xent_core::RegisterFile,
    judge: &dyn Judge,
    text_generator: &dyn TextGenerator,
) -> Result<bool, XentError> {
    let left = eval_expr(&cond.left, registers, judge, text_generator)?.as_number()?;
    let right = eval_expr(&cond.right, registers, judge, text_generator)?.as_number()?;
    Ok(match cond.op {
        CompareOp::Lt => left < right,
        CompareOp::Le => left <= right,
        CompareOp::Gt => left > right,
        CompareOp::Ge => left >= right,
        CompareOp::Eq => left == right,
        CompareOp::Ne => left != right,
    })
}

#[cfg(test)]
mod tests {
    use xent_core::RegisterFile;
    use xent_judge::DeterministicJudge;
    use xent_textgen::{CorpusMode, CorpusTextGenerator};

    use super::*;

    fn env() -> (RegisterFile, DeterministicJudge, CorpusTextGenerator) {
        (
            RegisterFile::new(),
            DeterministicJudge::default(),
            CorpusTextGenerator::new(vec!["fixed story text".into()], CorpusMode::Sequential, 0),
        )
    }

    #[test]
    fn story_draws_from_the_text_generator() {
        let (regs, judge, r#gen) = env();
        let value = eval_expr(&Expr::Story, &regs, &judge, &r#gen).unwrap();
        assert_eq!(value.as_str().unwrap(), "fixed story text");
    }

    #[test]
    fn remove_common_words_strips_shared_surface_forms() {
        let (regs, judge, r#gen) = env();
        let x = Expr::StringLiteral("The Fox Jumps".into());
        let y = Expr::StringLiteral("the fox sleeps".into());
        let value = eval_expr(&Expr::RemoveCommonWords(Box::new(x), Box::new(y)), &regs, &judge, &r#gen).unwrap();
        assert_eq!(value.as_str().unwrap().trim(), "Jumps");
    }

    #[test]
    fn add_on_token_xent_lists_always_succeeds() {
        let (regs, judge, r#gen) = env();
        let a = Expr::Xed(Box::new(Expr::StringLiteral("c1".into())), Box::new(Expr::StringLiteral("t1".into())));
        let b = Expr::Xed(Box::new(Expr::StringLiteral("c2".into())), Box::new(Expr::StringLiteral("t2".into())));
        let result = eval_expr(&Expr::Add(Box::new(a), Box::new(b)), &regs, &judge, &r#gen).unwrap();
        assert!(matches!(result, Value::Xent(_)));
    }
}
