/// Immutable view of the unconsumed part of an input string.
///
/// A cursor is `Copy`; every matching method returns a new cursor positioned
/// past what it consumed and leaves the original untouched, so positions only
/// ever move forward.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn skip_whitespace(self) -> Self {
        let (_, cursor) = self.take_while(char::is_whitespace);
        cursor
    }

    /// Consumes one character, returning it with the advanced cursor.
    pub fn bump(self) -> Option<(char, Self)> {
        let c = self.peek()?;
        Some((
            c,
            Self {
                source: self.source,
                pos: self.pos + c.len_utf8(),
            },
        ))
    }

    /// Consumes `expected` if it is the next character.
    pub fn eat(self, expected: char) -> Option<Self> {
        match self.bump() {
            Some((c, next)) if c == expected => Some(next),
            _ => None,
        }
    }

    pub fn take_while(self, mut pred: impl FnMut(char) -> bool) -> (&'a str, Self) {
        let len = self
            .rest()
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(i, _)| i)
            .unwrap_or_else(|| self.rest().len());
        (
            &self.rest()[..len],
            Self {
                source: self.source,
                pos: self.pos + len,
            },
        )
    }

    /// Matches an identifier: a letter or `_`, then letters, digits, `_`,
    /// and `.` when it is followed by a letter (`speedOfLight.kmh`).
    pub fn identifier(self) -> Option<(&'a str, Self)> {
        let first = self.peek()?;
        if !(first.is_alphabetic() || first == '_') {
            return None;
        }

        let rest = self.rest();
        let mut end = first.len_utf8();
        let mut chars = rest[end..].char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            let continues = c.is_alphanumeric()
                || c == '_'
                || (c == '.' && matches!(chars.peek(), Some((_, n)) if n.is_alphabetic()));
            if !continues {
                break;
            }
            end = first.len_utf8() + i + c.len_utf8();
        }

        Some((
            &rest[..end],
            Self {
                source: self.source,
                pos: self.pos + end,
            },
        ))
    }

    /// With the cursor on `(`, returns the text up to the matching `)` and a
    /// cursor past it. Parentheses inside `"..."` or `'...'` do not count.
    /// `None` when the parentheses never balance.
    pub fn balanced_group(self) -> Option<(&'a str, Self)> {
        let inner = self.eat('(')?;
        let mut depth = 1usize;
        let mut quote: Option<char> = None;
        for (i, c) in inner.rest().char_indices() {
            if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((
                            &inner.rest()[..i],
                            Self {
                                source: self.source,
                                pos: inner.pos + i + 1,
                            },
                        ));
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// Splits an argument list on top-level commas. Each piece comes with its
/// byte offset inside `text`; commas inside nested parentheses do not split.
pub fn split_arguments(text: &str) -> Vec<(usize, &str)> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                pieces.push((start, &text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push((start, &text[start..]));
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_never_moves_the_original() {
        let cursor = Cursor::new("  42");
        let skipped = cursor.skip_whitespace();
        assert_eq!(cursor.pos(), 0);
        assert_eq!(skipped.pos(), 2);
        assert_eq!(skipped.rest(), "42");
    }

    #[test]
    fn identifier_accepts_dotted_constants() {
        let (name, rest) = Cursor::new("speedOfLight.kmh * 2").identifier().unwrap();
        assert_eq!(name, "speedOfLight.kmh");
        assert_eq!(rest.rest(), " * 2");

        let (name, _) = Cursor::new("x.5").identifier().unwrap();
        assert_eq!(name, "x");

        let (name, _) = Cursor::new("π").identifier().unwrap();
        assert_eq!(name, "π");

        assert!(Cursor::new("9abc").identifier().is_none());
    }

    #[test]
    fn balanced_group_skips_nested_parens() {
        let (inner, after) = Cursor::new("(pow(2,2)) + 1").balanced_group().unwrap();
        assert_eq!(inner, "pow(2,2)");
        assert_eq!(after.rest(), " + 1");
        assert!(Cursor::new("(1 + (2)").balanced_group().is_none());
    }

    #[test]
    fn balanced_group_ignores_quoted_parens() {
        let (inner, after) = Cursor::new("(\"a)b\") rest").balanced_group().unwrap();
        assert_eq!(inner, "\"a)b\"");
        assert_eq!(after.rest(), " rest");

        let (inner, _) = Cursor::new("(':(')").balanced_group().unwrap();
        assert_eq!(inner, "':('");
        assert!(Cursor::new("(\"unclosed)").balanced_group().is_none());
    }

    #[test]
    fn split_arguments_respects_nesting() {
        let pieces = split_arguments("pow(2, 3), 4");
        assert_eq!(pieces, vec![(0, "pow(2, 3)"), (10, " 4")]);
        assert_eq!(split_arguments(""), vec![(0, "")]);
    }
}
