use crate::cursor::Cursor;
use crate::error::{ErrorKind, EvalError, Span};
use crate::functions::Builtin;
use crate::resolve::{resolve_constant, resolve_variable};
use crate::store::VariableStore;
use log::debug;

pub const DEFAULT_MAX_DEPTH: usize = 256;

const ARITHMETIC_OPERATORS: [char; 5] = ['+', '-', '*', '/', '%'];
const RELATIONAL_OPERATORS: [char; 3] = ['<', '>', '='];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Deepest allowed nesting of groups, unary signs, calls and sub-conditions.
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// How a bare variable name is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reading {
    /// Top-level condition: a stored `true` is 1.0, anything else 0.0.
    Truth,
    /// Arithmetic and function arguments: the stored value as a float.
    Number,
}

/// Recursive-descent evaluator over a read-only variable store.
///
/// Every grammar rule takes a [`Cursor`] and returns the value together with
/// the cursor past what it consumed. `base` is the byte offset of the text
/// being parsed inside the top-level input, so spans of errors raised while
/// evaluating a function argument still point into the original string.
pub struct Evaluator<'v> {
    vars: &'v VariableStore,
    options: EvalOptions,
    depth: usize,
}

impl<'v> Evaluator<'v> {
    pub fn new(vars: &'v VariableStore) -> Self {
        Self::with_options(vars, EvalOptions::default())
    }

    pub fn with_options(vars: &'v VariableStore, options: EvalOptions) -> Self {
        Self {
            vars,
            options,
            depth: 0,
        }
    }

    pub fn evaluate_expression(&mut self, input: &str) -> Result<f64, EvalError> {
        debug!("evaluating expression '{}'", input);
        self.expression_text(input, 0)
    }

    /// Evaluates a condition; true is 1.0 and false is 0.0.
    pub fn evaluate_condition(&mut self, input: &str) -> Result<f64, EvalError> {
        debug!("evaluating condition '{}'", input);
        self.condition_text(input, 0, Reading::Truth)
    }

    /// Calls a built-in with its raw argument text, as in `name(arg_text)`.
    pub fn call_function(&mut self, name: &str, arg_text: &str) -> Result<f64, EvalError> {
        self.call(name, arg_text, 0, Span::new(0, arg_text.len()))
    }

    /// Function arguments go through the condition grammar with numeric
    /// variable reading, so `fibonacci(n-1)` and `sqrt(pow(2,2))` both work.
    pub(crate) fn argument(&mut self, text: &str, base: usize) -> Result<f64, EvalError> {
        self.condition_text(text, base, Reading::Number)
    }

    fn descend<T>(
        &mut self,
        span: Span,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        if self.depth >= self.options.max_depth {
            return Err(EvalError::recursion_limit(span, self.options.max_depth));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ── arithmetic ─────────────────────────────────────────────────────────

    fn expression_text(&mut self, text: &str, base: usize) -> Result<f64, EvalError> {
        let (value, cursor) = self.expression(Cursor::new(text), base)?;
        let cursor = cursor.skip_whitespace();
        let pos = base + cursor.pos();
        match cursor.peek() {
            None => Ok(value),
            Some(')') => Err(EvalError::new_with_help(
                ErrorKind::UnmatchedParenthesis,
                Span::single(pos),
                "Unmatched ')'".to_string(),
                "Remove the extra ')' or add a matching '(' before it.".to_string(),
            )),
            Some(c) => Err(EvalError::new(
                ErrorKind::UnexpectedToken,
                Span::new(pos, pos + c.len_utf8()),
                format!("Unexpected '{}' in expression", c),
            )),
        }
    }

    fn expression<'s>(&mut self, cursor: Cursor<'s>, base: usize) -> Result<(f64, Cursor<'s>), EvalError> {
        let (mut value, mut cursor) = self.term(cursor, base)?;

        loop {
            let (op, after) = match cursor.skip_whitespace().bump() {
                Some((op @ ('+' | '-'), after)) => (op, after),
                _ => break,
            };
            let (rhs, rest) = self.term(after, base)?;
            value = if op == '+' { value + rhs } else { value - rhs };
            cursor = rest;
        }

        Ok((value, cursor))
    }

    fn term<'s>(&mut self, cursor: Cursor<'s>, base: usize) -> Result<(f64, Cursor<'s>), EvalError> {
        let (mut value, mut cursor) = self.factor(cursor, base)?;

        loop {
            let (op, after) = match cursor.skip_whitespace().bump() {
                Some((op @ ('*' | '/' | '%'), after)) => (op, after),
                _ => break,
            };
            let operand_start = base + after.skip_whitespace().pos();
            let (rhs, rest) = self.factor(after, base)?;
            let span = Span::new(operand_start, base + rest.pos());

            value = match op {
                '*' => value * rhs,
                '/' if rhs == 0.0 => {
                    return Err(EvalError::new_with_help(
                        ErrorKind::DivisionByZero,
                        span,
                        "Division by zero".to_string(),
                        "The divisor evaluates to 0.".to_string(),
                    ))
                }
                '/' => value / rhs,
                _ if rhs == 0.0 => {
                    return Err(EvalError::new_with_help(
                        ErrorKind::ModuloByZero,
                        span,
                        "Modulo by zero".to_string(),
                        "The right-hand side of '%' evaluates to 0.".to_string(),
                    ))
                }
                _ => value % rhs,
            };
            cursor = rest;
        }

        Ok((value, cursor))
    }

    fn factor<'s>(&mut self, cursor: Cursor<'s>, base: usize) -> Result<(f64, Cursor<'s>), EvalError> {
        let cursor = cursor.skip_whitespace();
        let start = base + cursor.pos();

        match cursor.bump() {
            None => Err(EvalError::unexpected_end(start)),
            Some(('(', inner)) => self.descend(Span::single(start), |this| {
                let (value, after) = this.expression(inner, base)?;
                match after.skip_whitespace().eat(')') {
                    Some(rest) => Ok((value, rest)),
                    None => Err(EvalError::new_with_help(
                        ErrorKind::UnmatchedParenthesis,
                        Span::single(start),
                        "Unclosed '('".to_string(),
                        "Add a ')' to close this group.".to_string(),
                    )),
                }
            }),
            Some(('-', rest)) => self.descend(Span::single(start), |this| {
                let (value, rest) = this.factor(rest, base)?;
                Ok((-value, rest))
            }),
            Some(('+', rest)) => self.descend(Span::single(start), |this| this.factor(rest, base)),
            Some((c, _)) if c.is_ascii_digit() || c == '.' => self.number(cursor, base),
            Some((c, _)) if c.is_alphabetic() || c == '_' => self.identifier(cursor, base),
            Some((c, _)) => Err(EvalError::new(
                ErrorKind::UnexpectedToken,
                Span::new(start, start + c.len_utf8()),
                format!("Expected a number, found '{}'", c),
            )),
        }
    }

    fn number<'s>(&self, cursor: Cursor<'s>, base: usize) -> Result<(f64, Cursor<'s>), EvalError> {
        let (literal, rest) = cursor.take_while(|c| c.is_ascii_digit() || c == '.');
        let well_formed = literal.matches('.').count() <= 1 && literal.chars().any(|c| c.is_ascii_digit());

        match literal.parse::<f64>() {
            Ok(value) if well_formed => Ok((value, rest)),
            _ => Err(EvalError::new_with_help(
                ErrorKind::MalformedNumber,
                Span::new(base + cursor.pos(), base + rest.pos()),
                format!("Malformed number '{}'", literal),
                "Numbers are digits with at most one decimal point, e.g. 3.14".to_string(),
            )),
        }
    }

    fn identifier<'s>(&mut self, cursor: Cursor<'s>, base: usize) -> Result<(f64, Cursor<'s>), EvalError> {
        let start = base + cursor.pos();
        let (name, after_name) = match cursor.identifier() {
            Some(found) => found,
            None => return Err(EvalError::unexpected_end(start)),
        };

        let open = after_name.skip_whitespace();
        if open.peek() == Some('(') {
            return match open.balanced_group() {
                Some((args, rest)) => {
                    let span = Span::new(start, base + rest.pos());
                    let value = self.call(name, args, base + open.pos() + 1, span)?;
                    Ok((value, rest))
                }
                None => Err(unbalanced_call(name, Span::new(start, base + open.pos() + 1))),
            };
        }

        let span = Span::new(start, base + after_name.pos());
        let value = self.resolve_identifier(name, span, Reading::Number)?;
        Ok((value, after_name))
    }

    fn resolve_identifier(&self, name: &str, span: Span, reading: Reading) -> Result<f64, EvalError> {
        if let Some(value) = resolve_constant(name) {
            return Ok(value);
        }

        match resolve_variable(name, self.vars) {
            Some(value) => match reading {
                Reading::Truth => Ok(if value.is_true() { 1.0 } else { 0.0 }),
                Reading::Number => value.as_number().ok_or_else(|| {
                    EvalError::new_with_help(
                        ErrorKind::MalformedNumber,
                        span,
                        format!("Variable '{}' does not hold a number", name),
                        format!("'{}' holds a {}: {}", name, value.type_name(), value),
                    )
                }),
            },
            None => Err(EvalError::unknown_identifier(span, name)),
        }
    }

    fn call(&mut self, name: &str, args: &str, args_base: usize, span: Span) -> Result<f64, EvalError> {
        match Builtin::lookup(name) {
            Some(builtin) => {
                debug!("calling {}({})", name, args);
                self.descend(span, |this| this.apply_builtin(builtin, args, args_base, span))
            }
            None => Err(unknown_function(name, span)),
        }
    }

    // ── conditions ─────────────────────────────────────────────────────────

    fn condition_text(&mut self, text: &str, base: usize, reading: Reading) -> Result<f64, EvalError> {
        let span = Span::new(base, base + text.len().max(1));
        self.descend(span, |this| this.condition(text, base, reading))
    }

    fn condition(&mut self, text: &str, base: usize, reading: Reading) -> Result<f64, EvalError> {
        let base = base + (text.len() - text.trim_start().len());
        let text = text.trim();
        let span = Span::new(base, base + text.len());

        match text {
            "" => return Err(EvalError::unexpected_end(base)),
            "true" => return Ok(1.0),
            "false" => return Ok(0.0),
            _ => {}
        }

        if text.contains(ARITHMETIC_OPERATORS) {
            return self.expression_text(text, base);
        }

        if let Some(value) = resolve_constant(text) {
            return Ok(value);
        }

        let cursor = Cursor::new(text);
        let mut unknown_call = None;
        if let Some((name, after_name)) = cursor.identifier() {
            let open = after_name.skip_whitespace();
            if open.peek() == Some('(') {
                match open.balanced_group() {
                    None => return Err(unbalanced_call(name, span)),
                    Some((args, rest)) if rest.is_at_end() => {
                        if Builtin::lookup(name).is_some() {
                            return self.call(name, args, base + open.pos() + 1, span);
                        }
                        unknown_call = Some(name);
                    }
                    Some(_) => {}
                }
            }
        }

        if text.starts_with('(') {
            match cursor.balanced_group() {
                Some((inner, rest)) if rest.is_at_end() => {
                    return self.condition_text(inner, base + 1, reading);
                }
                Some(_) => {}
                None => {
                    return Err(EvalError::new_with_help(
                        ErrorKind::UnmatchedParenthesis,
                        Span::single(base),
                        "Unclosed '('".to_string(),
                        "Add a ')' to close this group.".to_string(),
                    ))
                }
            }
        }

        if text.contains(RELATIONAL_OPERATORS) {
            return self.comparison(text, base);
        }

        if resolve_variable(text, self.vars).is_some() {
            return self.resolve_identifier(text, span, reading);
        }

        if text.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return self.number(cursor, base).map(|(value, _)| value);
        }

        if let Some(name) = unknown_call {
            return Err(unknown_function(name, span));
        }

        match cursor.identifier() {
            Some((name, rest)) if rest.is_at_end() => Err(EvalError::unknown_identifier(span, name)),
            _ => Err(EvalError::new(
                ErrorKind::MalformedCondition,
                span,
                format!("Cannot evaluate '{}' as a condition", text),
            )),
        }
    }

    /// `left op right`, exactly three whitespace-separated words.
    fn comparison(&mut self, text: &str, base: usize) -> Result<f64, EvalError> {
        let span = Span::new(base, base + text.len());
        let words = words(text);
        let [(left_at, left), (op_at, op), (right_at, right)] = words.as_slice() else {
            return Err(EvalError::new_with_help(
                ErrorKind::MalformedCondition,
                span,
                format!("Expected 'left operator right', found {} word(s)", words.len()),
                "Separate the operands and the operator with spaces, e.g. 3 < 5".to_string(),
            ));
        };

        let lhs = self.argument(left, base + left_at)?;
        let rhs = self.argument(right, base + right_at)?;
        let holds = match *op {
            "<" => lhs < rhs,
            ">" => lhs > rhs,
            "=" | "==" => lhs == rhs,
            "<=" => lhs <= rhs,
            ">=" => lhs >= rhs,
            "!=" => lhs != rhs,
            other => {
                return Err(EvalError::new_with_help(
                    ErrorKind::MalformedCondition,
                    Span::new(base + op_at, base + op_at + other.len()),
                    format!("Unknown comparison operator '{}'", other),
                    "Use one of <, >, =, <=, >=, !=".to_string(),
                ))
            }
        };

        Ok(if holds { 1.0 } else { 0.0 })
    }
}

fn words(text: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut cursor = Cursor::new(text).skip_whitespace();
    while !cursor.is_at_end() {
        let start = cursor.pos();
        let (word, rest) = cursor.take_while(|c| !c.is_whitespace());
        words.push((start, word));
        cursor = rest.skip_whitespace();
    }
    words
}

fn unbalanced_call(name: &str, span: Span) -> EvalError {
    EvalError::new_with_help(
        ErrorKind::UnbalancedFunctionCall,
        span,
        format!("Call to '{}' is missing its closing ')'", name),
        format!("Close the argument list: {}(...)", name),
    )
}

fn unknown_function(name: &str, span: Span) -> EvalError {
    EvalError::new_with_help(
        ErrorKind::UnknownIdentifier,
        span,
        format!("Unknown function '{}'", name),
        format!("Available functions: {}", Builtin::names().join(", ")),
    )
}

pub fn evaluate_expression(input: &str, vars: &VariableStore) -> Result<f64, EvalError> {
    Evaluator::new(vars).evaluate_expression(input)
}

pub fn evaluate_condition(input: &str, vars: &VariableStore) -> Result<f64, EvalError> {
    Evaluator::new(vars).evaluate_condition(input)
}
