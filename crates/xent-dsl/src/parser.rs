//! A hand-written recursive-descent parser for the game DSL. No parser
//! combinator crate is used; the grammar is small enough that a direct
//! character-level scanner is both simpler and easier to attach line
//! numbers to for error reporting.

use std::collections::HashSet;

use xent_core::{PlayerName, XFlag, XentError};

use crate::ast::{CompareOp, Cond, Expr, Instruction, Program};

pub fn parse(source: &str) -> Result<Program, XentError> {
    let mut instructions = Vec::new();
    let mut seen_labels = HashSet::new();
    let mut assigned_registers: HashSet<char> = HashSet::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw_line);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let instruction = parse_line(line, line_no, &assigned_registers)?;
        match &instruction {
            Instruction::Label { flag } => {
                if !seen_labels.insert(flag.name.clone()) {
                    return Err(syntax(line_no, format!("duplicate label '{}'", flag.name)));
                }
            },
            Instruction::Assign { register, .. } => {
                assigned_registers.insert(*register);
            },
            Instruction::Elicit { register, .. } => {
                assigned_registers.insert(*register);
            },
            _ => {},
        }
        instructions.push(instruction);
    }

    for instruction in &instructions {
        if let Instruction::Ensure { beacon, line, .. } = instruction {
            if !seen_labels.contains(beacon) {
                return Err(syntax(*line, format!("ensure references unknown beacon '{beacon}'")));
            }
        }
    }

    Ok(Program { instructions })
}

fn syntax(line: usize, message: impl Into<String>) -> XentError {
    XentError::Syntax { message: message.into(), line }
}

/// Drops everything from the first `#` not inside a quoted string to the
/// end of the line. A line with no such `#` is returned unchanged.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {},
        }
    }
    line
}

fn parse_line(line: &str, line_no: usize, known_registers: &HashSet<char>) -> Result<Instruction, XentError> {
    if let Some(label) = line.strip_suffix(':') {
        return Ok(Instruction::Label {
            flag: XFlag::new(label.trim(), line_no),
        });
    }

    let (head, rest) = split_call(line, line_no)?;
    match head {
        "assign" => parse_assign(rest, line_no, known_registers),
        "reveal" => parse_reveal(rest, line_no, known_registers),
        "elicit" => parse_elicit(rest, line_no),
        "reward" => parse_reward(rest, line_no, known_registers),
        "ensure" => parse_ensure(rest, line_no, known_registers),
        other => Err(syntax(line_no, format!("unknown instruction '{other}'"))),
    }
}

/// Split `name(args)` into `(name, args)`, verifying balanced parens.
fn split_call(line: &str, line_no: usize) -> Result<(&str, &str), XentError> {
    let open = line.find('(').ok_or_else(|| syntax(line_no, "expected '(' after instruction name"))?;
    if !line.ends_with(')') {
        return Err(syntax(line_no, "missing closing ')'"));
    }
    let name = line[..open].trim();
    let args = &line[open + 1..line.len() - 1];
    if name.is_empty() {
        return Err(syntax(line_no, "missing instruction name"));
    }
    Ok((name, args))
}

/// Split a comma-separated argument list, respecting nested parens so that
/// `remove_common_words(x, s)` counts as one argument, not two.
fn split_args(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for ch in args.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            },
            ')' => {
                depth -= 1;
                current.push(ch);
            },
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            },
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() || !parts.is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn parse_register(token: &str, line_no: usize) -> Result<char, XentError> {
    let trimmed = token.trim();
    if trimmed.len() != 1 {
        return Err(syntax(line_no, format!("'{trimmed}' is not a single-character register name")));
    }
    let r = trimmed.chars().next().unwrap();
    if !xent_core::constants::is_known_register(r) {
        return Err(syntax(line_no, format!("unknown register '{r}'")));
    }
    Ok(r)
}

fn parse_player(token: &str, line_no: usize) -> Result<PlayerName, XentError> {
    match token.trim() {
        "black" => Ok(PlayerName::Black),
        "white" => Ok(PlayerName::White),
        "alice" => Ok(PlayerName::Alice),
        "bob" => Ok(PlayerName::Bob),
        "carol" => Ok(PlayerName::Carol),
        "env" => Ok(PlayerName::Env),
        other => Err(syntax(line_no, format!("unknown player '{other}'"))),
    }
}

fn parse_assign(args: &str, line_no: usize, known_registers: &HashSet<char>) -> Result<Instruction, XentError> {
    let eq = args.find('=').ok_or_else(|| syntax(line_no, "assign requires 'register = expr'"))?;
    let register = parse_register(&args[..eq], line_no)?;
    let expr = parse_expr(args[eq + 1..].trim(), line_no, known_registers)?;
    Ok(Instruction::Assign { register, expr, line: line_no })
}

fn parse_reveal(args: &str, line_no: usize, known_registers: &HashSet<char>) -> Result<Instruction, XentError> {
    let registers = split_args(args)
        .iter()
        .map(|a| parse_register(a, line_no))
        .collect::<Result<Vec<_>, _>>()?;
    if registers.is_empty() {
        return Err(syntax(line_no, "reveal requires at least one register"));
    }
    for r in &registers {
        require_assigned(*r, line_no, known_registers)?;
    }
    Ok(Instruction::Reveal { registers, line: line_no })
}

fn parse_elicit(args: &str, line_no: usize) -> Result<Instruction, XentError> {
    let parts = split_args(args);
    let (player, register_token, max_tokens_token) = match parts.as_slice() {
        [register, max_tokens] => (None, register.as_str(), max_tokens.as_str()),
        [player, register, max_tokens] => (Some(parse_player(player, line_no)?), register.as_str(), max_tokens.as_str()),
        _ => return Err(syntax(line_no, "elicit requires (register, max_tokens) or (player, register, max_tokens)")),
    };
    let register = parse_register(register_token, line_no)?;
    let max_tokens: i64 = max_tokens_token
        .trim()
        .parse()
        .map_err(|_| syntax(line_no, format!("'{max_tokens_token}' is not an integer token budget")))?;
    if max_tokens <= 0 {
        return Err(syntax(line_no, "elicit max_tokens must be greater than zero"));
    }
    Ok(Instruction::Elicit {
        player,
        register,
        max_tokens: max_tokens as u32,
        line: line_no,
    })
}

fn parse_reward(args: &str, line_no: usize, known_registers: &HashSet<char>) -> Result<Instruction, XentError> {
    let parts = split_args(args);
    let (player, expr_token) = match parts.as_slice() {
        [expr] => (None, expr.as_str()),
        [player, expr] if parse_player(player, line_no).is_ok() => (Some(parse_player(player, line_no)?), expr.as_str()),
        _ => (None, args.trim()),
    };
    let expr = parse_expr(expr_token, line_no, known_registers)?;
    Ok(Instruction::Reward { player, expr, line: line_no })
}

fn parse_ensure(args: &str, line_no: usize, known_registers: &HashSet<char>) -> Result<Instruction, XentError> {
    let parts = split_args(args);
    if parts.is_empty() {
        return Err(syntax(line_no, "ensure requires at least one condition and a beacon"));
    }
    let last = parts.last().unwrap();
    let beacon = last
        .strip_prefix("beacon=")
        .ok_or_else(|| syntax(line_no, "ensure's last argument must be 'beacon=<label>'"))?
        .trim()
        .to_string();
    if beacon.is_empty() {
        return Err(syntax(line_no, "ensure beacon name must not be empty"));
    }
    let conditions = parts[..parts.len() - 1]
        .iter()
        .map(|c| parse_cond(c, line_no, known_registers))
        .collect::<Result<Vec<_>, _>>()?;
    if conditions.is_empty() {
        return Err(syntax(line_no, "ensure requires at least one condition"));
    }
    Ok(Instruction::Ensure { conditions, beacon, line: line_no })
}

const COMPARE_OPS: &[(&str, CompareOp)] = &[
    (">=", CompareOp::Ge),
    ("<=", CompareOp::Le),
    ("==", CompareOp::Eq),
    ("!=", CompareOp::Ne),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
];

fn parse_cond(text: &str, line_no: usize, known_registers: &HashSet<char>) -> Result<Cond, XentError> {
    for (symbol, op) in COMPARE_OPS {
        if let Some(pos) = text.find(symbol) {
            let left = parse_expr(text[..pos].trim(), line_no, known_registers)?;
            let right = parse_expr(text[pos + symbol.len()..].trim(), line_no, known_registers)?;
            return Ok(Cond { left, op: *op, right });
        }
    }
    Err(syntax(line_no, format!("'{text}' is not a comparison condition")))
}

fn require_assigned(register: char, line_no: usize, known_registers: &HashSet<char>) -> Result<(), XentError> {
    if !known_registers.contains(&register) {
        return Err(syntax(line_no, format!("register '{register}' used before assignment")));
    }
    Ok(())
}

fn parse_expr(text: &str, line_no: usize, known_registers: &HashSet<char>) -> Result<Expr, XentError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(syntax(line_no, "expected an expression"));
    }

    // String/arithmetic concatenation with '+', left-associative, not nested
    // inside parens (those are handled by the recursive call on operands).
    if let Some(pos) = top_level_find(text, '+') {
        let left = parse_expr(text[..pos].trim(), line_no, known_registers)?;
        let right = parse_expr(text[pos + 1..].trim(), line_no, known_registers)?;
        return Ok(Expr::Add(Box::new(left), Box::new(right)));
    }
    if let Some(rest) = text.strip_prefix('-') {
        return Ok(Expr::Neg(Box::new(parse_expr(rest, line_no, known_registers)?)));
    }

    if let Some(inner) = text.strip_prefix("xed(") {
        let inner = inner.strip_suffix(')').ok_or_else(|| syntax(line_no, "missing closing ')' in xed(...)"))?;
        let bar = top_level_find(inner, '|').ok_or_else(|| syntax(line_no, "xed(...) requires 'context | target'"))?;
        let ctx = parse_expr(inner[..bar].trim(), line_no, known_registers)?;
        let target = parse_expr(inner[bar + 1..].trim(), line_no, known_registers)?;
        return Ok(Expr::Xed(Box::new(ctx), Box::new(target)));
    }

    if text == "story()" {
        return Ok(Expr::Story);
    }

    if let Some(args) = text.strip_prefix("remove_common_words(").and_then(|s| s.strip_suffix(')')) {
        let parts = split_args(args);
        let [x, y] = parts.as_slice() else {
            return Err(syntax(line_no, "remove_common_words requires exactly two arguments"));
        };
        return Ok(Expr::RemoveCommonWords(
            Box::new(parse_expr(x, line_no, known_registers)?),
            Box::new(parse_expr(y, line_no, known_registers)?),
        ));
    }

    if let Some(args) = text.strip_prefix("first_n_tokens(").and_then(|s| s.strip_suffix(')')) {
        let parts = split_args(args);
        let [text_arg, n] = parts.as_slice() else {
            return Err(syntax(line_no, "first_n_tokens requires exactly two arguments"));
        };
        return Ok(Expr::FirstNTokens(
            Box::new(parse_expr(text_arg, line_no, known_registers)?),
            Box::new(parse_expr(n, line_no, known_registers)?),
        ));
    }

    if let Some(inner) = text.strip_prefix("len(").and_then(|s| s.strip_suffix(')')) {
        return Ok(Expr::Len(Box::new(parse_expr(inner, line_no, known_registers)?)));
    }

    if let Some(literal) = text.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Ok(Expr::StringLiteral(literal.to_string()));
    }

    if let Ok(n) = text.parse::<f64>() {
        return Ok(Expr::Number(n));
    }

    if text.len() == 1 {
        let r = parse_register(text, line_no)?;
        require_assigned(r, line_no, known_registers)?;
        return Ok(Expr::Register(r));
    }

    Err(syntax(line_no, format!("unrecognized expression '{text}'")))
}

/// Find `needle` outside of any parenthesis nesting and outside any quoted
/// string literal.
fn top_level_find(text: &str, needle: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    for (i, ch) in text.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth -= 1,
            c if c == needle && depth == 0 && !in_string => return Some(i),
            _ => {},
        }
    }
    None
}
