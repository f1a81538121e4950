use ariadne::{Color, Config, Fmt, IndexType, Label, Report, ReportKind, Source};
use std::fmt;
use std::io::{self, Write};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Moves the span by `offset` bytes, used when a sub-slice was evaluated
    /// on its own and the error must point into the enclosing text.
    pub fn shifted(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("malformed number")]
    MalformedNumber,
    #[error("unmatched parenthesis")]
    UnmatchedParenthesis,
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("domain error")]
    DomainError,
    #[error("unknown identifier")]
    UnknownIdentifier,
    #[error("malformed condition")]
    MalformedCondition,
    #[error("unbalanced function call")]
    UnbalancedFunctionCall,
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("wrong argument count")]
    WrongArgumentCount,
    #[error("invalid statement")]
    InvalidStatement,
    #[error("invalid declaration")]
    InvalidDeclaration,
    #[error("unterminated comment")]
    UnterminatedComment,
}

impl ErrorKind {
    fn color(&self) -> Color {
        match self {
            ErrorKind::MalformedNumber
            | ErrorKind::UnmatchedParenthesis
            | ErrorKind::UnbalancedFunctionCall
            | ErrorKind::MalformedCondition
            | ErrorKind::UnexpectedToken
            | ErrorKind::UnexpectedEnd => Color::Yellow,
            ErrorKind::InvalidStatement
            | ErrorKind::InvalidDeclaration
            | ErrorKind::UnterminatedComment => Color::Red,
            _ => Color::Magenta,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvalError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
}

impl EvalError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn new_with_help(kind: ErrorKind, span: Span, message: String, help: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: Some(help),
        }
    }

    pub fn unexpected_end(pos: usize) -> Self {
        Self::new_with_help(
            ErrorKind::UnexpectedEnd,
            Span::single(pos),
            "Expected a value but the input ended".to_string(),
            "Every operator needs an operand on both sides. Example: 2 + 3".to_string(),
        )
    }

    pub fn domain(span: Span, message: String) -> Self {
        Self::new(ErrorKind::DomainError, span, message)
    }

    pub fn unknown_identifier(span: Span, name: &str) -> Self {
        Self::new_with_help(
            ErrorKind::UnknownIdentifier,
            span,
            format!("Unknown identifier '{}'", name),
            "Declare it first with 'var name = value' or use a built-in constant such as pi.".to_string(),
        )
    }

    pub fn recursion_limit(span: Span, limit: usize) -> Self {
        Self::new_with_help(
            ErrorKind::RecursionLimitExceeded,
            span,
            format!("Expression nests deeper than {} levels", limit),
            "Reduce the nesting of parentheses and function calls, or raise --max-depth.".to_string(),
        )
    }

    /// Re-anchors the error from a sub-slice to the enclosing text.
    pub fn shifted(mut self, offset: usize) -> Self {
        self.span = self.span.shifted(offset);
        self
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        if let Err(error) = self.write_report(source, filename, true, io::stderr()) {
            eprintln!("{}: {}", self.kind, self.message);
            log::warn!("failed to render diagnostic: {}", error);
        }
    }

    /// Renders the diagnostic without colour, as it would appear on a terminal.
    pub fn render(&self, source: &str, filename: Option<&str>) -> String {
        let mut buffer = Vec::new();
        match self.write_report(source, filename, false, &mut buffer) {
            Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(_) => format!("{}: {}", self.kind, self.message),
        }
    }

    fn write_report<W: Write>(
        &self,
        source: &str,
        filename: Option<&str>,
        colored: bool,
        out: W,
    ) -> io::Result<()> {
        let filename = filename.unwrap_or("<repl>");
        let color = self.kind.color();
        // end-of-input errors sit one past the last byte
        let start = self.span.start.min(source.len());
        let end = self.span.end.min(source.len()).max(start);
        // spans are byte offsets; ariadne counts chars unless told otherwise
        let config = Config::default()
            .with_index_type(IndexType::Byte)
            .with_color(colored);

        let kind = if colored {
            self.kind.fg(color).to_string()
        } else {
            self.kind.to_string()
        };

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_config(config)
            .with_message(format!("{}: {}", kind, self.message))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            let help = if colored {
                "help".fg(Color::Cyan).to_string()
            } else {
                "help".to_string()
            };
            report_builder = report_builder.with_note(format!("{}: {}", help, help_text));
        }

        report_builder
            .finish()
            .write((filename, Source::from(source)), out)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}
