use crate::cursor::split_arguments;
use crate::error::{ErrorKind, EvalError, Span};
use crate::evaluator::Evaluator;
use crate::store::VariableStore;
use crate::value::format_number;

/// Largest n whose factorial is finite as an f64.
pub const FACTORIAL_LIMIT: u64 = 170;
/// Largest n whose Fibonacci number is finite as an f64.
pub const FIBONACCI_LIMIT: u64 = 1476;
/// 2^53: above this not every integer is representable.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sqrt,
    Cbrt,
    Ffrt,
    Sin,
    Cos,
    Tan,
    Csc,
    Sec,
    Cot,
    Gamma,
    Abs,
    Factorial,
    Fibonacci,
    Pow,
    Min,
    Max,
    Bindec,
}

const BUILTINS: &[(&str, Builtin)] = &[
    ("sqrt", Builtin::Sqrt),
    ("cbrt", Builtin::Cbrt),
    ("ffrt", Builtin::Ffrt),
    ("sin", Builtin::Sin),
    ("cos", Builtin::Cos),
    ("tan", Builtin::Tan),
    ("csc", Builtin::Csc),
    ("sec", Builtin::Sec),
    ("cot", Builtin::Cot),
    ("gamma", Builtin::Gamma),
    ("abs", Builtin::Abs),
    ("factorial", Builtin::Factorial),
    ("fibonacci", Builtin::Fibonacci),
    ("pow", Builtin::Pow),
    ("min", Builtin::Min),
    ("max", Builtin::Max),
    ("bindec", Builtin::Bindec),
];

impl Builtin {
    pub fn lookup(name: &str) -> Option<Self> {
        BUILTINS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, builtin)| *builtin)
    }

    pub fn names() -> Vec<&'static str> {
        BUILTINS.iter().map(|(name, _)| *name).collect()
    }

    pub fn name(&self) -> &'static str {
        BUILTINS
            .iter()
            .find(|(_, builtin)| builtin == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }

    pub fn arity(&self) -> usize {
        match self {
            Builtin::Pow | Builtin::Min | Builtin::Max => 2,
            _ => 1,
        }
    }
}

/// Evaluates `name(arg_text)` against `vars`.
pub fn dispatch_function(name: &str, arg_text: &str, vars: &VariableStore) -> Result<f64, EvalError> {
    Evaluator::new(vars).call_function(name, arg_text)
}

impl<'v> Evaluator<'v> {
    pub(crate) fn apply_builtin(
        &mut self,
        builtin: Builtin,
        arg_text: &str,
        base: usize,
        span: Span,
    ) -> Result<f64, EvalError> {
        // bindec takes a literal bit string, not an expression
        if builtin == Builtin::Bindec {
            return bindec(arg_text.trim(), span);
        }

        let pieces = split_arguments(arg_text);
        if pieces.len() != builtin.arity() {
            return Err(EvalError::new_with_help(
                ErrorKind::WrongArgumentCount,
                span,
                format!(
                    "{}() takes {} argument(s), got {}",
                    builtin.name(),
                    builtin.arity(),
                    pieces.len()
                ),
                match builtin.arity() {
                    1 => format!("Usage: {}(x)", builtin.name()),
                    _ => format!("Usage: {}(a, b)", builtin.name()),
                },
            ));
        }

        let mut args = Vec::with_capacity(pieces.len());
        for (offset, piece) in pieces {
            args.push(self.argument(piece, base + offset)?);
        }

        match (builtin, args.as_slice()) {
            (Builtin::Pow, [x, exponent]) => Ok(x.powf(*exponent)),
            (Builtin::Min, [a, b]) => Ok(a.min(*b)),
            (Builtin::Max, [a, b]) => Ok(a.max(*b)),
            (_, [x]) => apply_unary(builtin, *x, span),
            _ => Err(EvalError::new(
                ErrorKind::WrongArgumentCount,
                span,
                format!("{}() called with {} argument(s)", builtin.name(), args.len()),
            )),
        }
    }
}

fn apply_unary(builtin: Builtin, x: f64, span: Span) -> Result<f64, EvalError> {
    match builtin {
        Builtin::Sqrt if x < 0.0 => Err(EvalError::domain(
            span,
            "Square root of a negative number is not supported".to_string(),
        )),
        Builtin::Sqrt => Ok(x.sqrt()),
        Builtin::Cbrt => Ok(x.cbrt()),
        Builtin::Ffrt if x < 0.0 => Err(EvalError::domain(
            span,
            "Fourth root of a negative number is not supported".to_string(),
        )),
        Builtin::Ffrt => Ok(x.powf(0.25)),
        Builtin::Sin => Ok(x.sin()),
        Builtin::Cos => Ok(x.cos()),
        Builtin::Tan => Ok(x.tan()),
        Builtin::Csc => reciprocal(x.sin(), "csc", span),
        Builtin::Sec => reciprocal(x.cos(), "sec", span),
        Builtin::Cot if x.sin() == 0.0 => Err(EvalError::domain(
            span,
            format!("cot({}) is undefined", format_number(x)),
        )),
        Builtin::Cot => Ok(x.cos() / x.sin()),
        Builtin::Gamma if x <= 0.0 && x.fract() == 0.0 => Err(EvalError::domain(
            span,
            format!("gamma is undefined at {}", format_number(x)),
        )),
        Builtin::Gamma => Ok(libm::tgamma(x)),
        Builtin::Abs => Ok(x.abs()),
        Builtin::Factorial => factorial(x, span),
        Builtin::Fibonacci => fibonacci(x, span),
        Builtin::Pow | Builtin::Min | Builtin::Max | Builtin::Bindec => Err(EvalError::new(
            ErrorKind::WrongArgumentCount,
            span,
            format!("{}() called with 1 argument", builtin.name()),
        )),
    }
}

fn reciprocal(denominator: f64, name: &str, span: Span) -> Result<f64, EvalError> {
    if denominator == 0.0 {
        return Err(EvalError::domain(span, format!("{} is undefined here", name)));
    }
    Ok(1.0 / denominator)
}

/// Truncates `x` to a count, rejecting what cannot be one.
fn to_count(x: f64, what: &str, span: Span) -> Result<u64, EvalError> {
    if !x.is_finite() || x < 0.0 || x.fract() != 0.0 {
        return Err(EvalError::new_with_help(
            ErrorKind::DomainError,
            span,
            format!("{} needs a non-negative integer, got {}", what, format_number(x)),
            "Negative, fractional and infinite arguments are not supported.".to_string(),
        ));
    }
    if x > MAX_EXACT_INTEGER {
        return Err(EvalError::domain(
            span,
            format!("{} argument {} is too large", what, format_number(x)),
        ));
    }
    Ok(x as u64)
}

pub fn factorial(x: f64, span: Span) -> Result<f64, EvalError> {
    let n = to_count(x, "factorial", span)?;
    if n > FACTORIAL_LIMIT {
        return Err(EvalError::domain(
            span,
            format!("factorial({}) overflows; the largest supported argument is {}", n, FACTORIAL_LIMIT),
        ));
    }
    Ok((2..=n).fold(1.0, |acc, i| acc * i as f64))
}

pub fn fibonacci(x: f64, span: Span) -> Result<f64, EvalError> {
    let n = to_count(x, "fibonacci", span)?;
    if n > FIBONACCI_LIMIT {
        return Err(EvalError::domain(
            span,
            format!("fibonacci({}) overflows; the largest supported argument is {}", n, FIBONACCI_LIMIT),
        ));
    }
    let (mut current, mut next) = (0.0_f64, 1.0_f64);
    for _ in 0..n {
        (current, next) = (next, current + next);
    }
    Ok(current)
}

pub fn bindec(bits: &str, span: Span) -> Result<f64, EvalError> {
    if bits.is_empty() || !bits.chars().all(|c| c == '0' || c == '1') {
        return Err(EvalError::new_with_help(
            ErrorKind::MalformedNumber,
            span,
            format!("'{}' is not a binary number", bits),
            "bindec expects only 0 and 1 digits, e.g. bindec(1011)".to_string(),
        ));
    }
    i64::from_str_radix(bits, 2)
        .map(|n| n as f64)
        .map_err(|_| EvalError::domain(span, format!("binary number '{}' is too large", bits)))
}

/// Formats a non-negative integer in base 2.
pub fn decbin(x: f64, span: Span) -> Result<String, EvalError> {
    let n = to_count(x, "decbin", span)?;
    Ok(format!("{:b}", n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> Span {
        Span::new(0, 1)
    }

    #[test]
    fn factorial_is_iterative_and_bounded() {
        assert_eq!(factorial(0.0, span()).unwrap(), 1.0);
        assert_eq!(factorial(5.0, span()).unwrap(), 120.0);
        assert!(factorial(170.0, span()).unwrap().is_finite());
        assert_eq!(factorial(171.0, span()).unwrap_err().kind, ErrorKind::DomainError);
        assert_eq!(factorial(2.5, span()).unwrap_err().kind, ErrorKind::DomainError);
        assert_eq!(factorial(f64::NAN, span()).unwrap_err().kind, ErrorKind::DomainError);
    }

    #[test]
    fn fibonacci_sequence_start() {
        let values: Vec<f64> = (0..8).map(|n| fibonacci(n as f64, span()).unwrap()).collect();
        assert_eq!(values, vec![0.0, 1.0, 1.0, 2.0, 3.0, 5.0, 8.0, 13.0]);
        assert!(fibonacci(1476.0, span()).unwrap().is_finite());
        assert_eq!(fibonacci(-3.0, span()).unwrap_err().kind, ErrorKind::DomainError);
    }

    #[test]
    fn binary_conversions() {
        assert_eq!(bindec("1011", span()).unwrap(), 11.0);
        assert_eq!(bindec("0", span()).unwrap(), 0.0);
        assert_eq!(bindec("102", span()).unwrap_err().kind, ErrorKind::MalformedNumber);
        assert_eq!(decbin(10.0, span()).unwrap(), "1010");
        assert_eq!(decbin(0.0, span()).unwrap(), "0");
        assert_eq!(decbin(-1.0, span()).unwrap_err().kind, ErrorKind::DomainError);
    }

    #[test]
    fn builtin_table_round_trips_names() {
        for name in Builtin::names() {
            let builtin = Builtin::lookup(name).unwrap();
            assert_eq!(builtin.name(), name);
        }
        assert!(Builtin::lookup("print").is_none());
    }
}
