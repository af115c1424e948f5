//! Event-based tokenizer for controller source files.
//!
//! Produces the flat token stream the extraction state machine consumes:
//! the punctuation it cares about (`@`, braces, parens, commas), quoted
//! string literals, and identifier words. Everything else is either skipped
//! (whitespace, comments, char literals) or surfaced as [`TokenKind::Other`]
//! so the machine can treat it as "present but uninteresting".
//!
//! The lexer never fails: malformed input degrades to fewer or shorter
//! tokens, not to an error.

/// Classification of a single lexical event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `@` - introduces an annotation.
    At,
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    Comma,
    /// A double-quoted string literal, delimiters stripped, escapes resolved.
    Str(String),
    /// A run of identifier characters. `.` and `$` are word characters, so a
    /// qualified constant like `RequestMethod.GET` arrives as one token.
    Word(String),
    /// Any other non-whitespace character (`=`, `;`, `<`, ...).
    Other(char),
}

impl TokenKind {
    /// The text carried by this token, if any.
    ///
    /// Only literals and words carry text; punctuation does not.
    pub fn text(&self) -> Option<&str> {
        match self {
            TokenKind::Str(s) | TokenKind::Word(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this token is a quote-delimited literal.
    pub fn is_str(&self) -> bool {
        matches!(self, TokenKind::Str(_))
    }
}

/// One lexical event: a classification plus the 1-based source line it
/// started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Self { kind, line }
    }
}

/// Streaming lexer over in-memory source text.
///
/// Implements `Iterator<Item = Token>`; end of stream is the iterator
/// ending.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    /// Skip a `//` line comment (the leading `//` is already consumed).
    fn skip_line_comment(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Skip a `/* ... */` block comment, counting embedded newlines.
    /// An unterminated comment swallows the rest of the input.
    fn skip_block_comment(&mut self) {
        while let Some(ch) = self.bump() {
            if ch == '*' {
                if let Some('/') = self.chars.peek() {
                    self.bump();
                    return;
                }
            }
        }
    }

    /// Consume a quoted literal after its opening delimiter.
    ///
    /// Stops at the matching delimiter, at end of line (these literals do
    /// not span lines), or at end of input, yielding whatever accumulated.
    fn take_quoted(&mut self, delim: char) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
            if ch == delim {
                break;
            }
            if ch == '\\' {
                if let Some(escaped) = self.bump() {
                    text.push(escaped);
                }
                continue;
            }
            text.push(ch);
        }
        text
    }

    fn take_word(&mut self, first: char) -> String {
        let mut word = String::new();
        word.push(first);
        while let Some(&ch) = self.chars.peek() {
            if is_word_char(ch) {
                word.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        word
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' || ch == '.'
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let line = self.line;
            let ch = self.bump()?;

            let kind = match ch {
                c if c.is_whitespace() => continue,
                '/' => match self.chars.peek() {
                    Some('/') => {
                        self.bump();
                        self.skip_line_comment();
                        continue;
                    }
                    Some('*') => {
                        self.bump();
                        self.skip_block_comment();
                        continue;
                    }
                    _ => TokenKind::Other('/'),
                },
                '@' => TokenKind::At,
                '{' => TokenKind::OpenBrace,
                '}' => TokenKind::CloseBrace,
                '(' => TokenKind::OpenParen,
                ')' => TokenKind::CloseParen,
                ',' => TokenKind::Comma,
                '"' => TokenKind::Str(self.take_quoted('"')),
                '\'' => {
                    // Char literals cannot name a route; drop them entirely
                    // rather than risk one being read as a path.
                    self.take_quoted('\'');
                    continue;
                }
                c if is_word_char(c) => TokenKind::Word(self.take_word(c)),
                c => TokenKind::Other(c),
            };

            return Some(Token::new(kind, line));
        }
    }
}

/// Tokenize a whole source string eagerly.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_punctuation_and_words() {
        let toks = kinds("@RequestMapping(\"/api\")");
        assert_eq!(
            toks,
            vec![
                TokenKind::At,
                TokenKind::Word("RequestMapping".to_string()),
                TokenKind::OpenParen,
                TokenKind::Str("/api".to_string()),
                TokenKind::CloseParen,
            ]
        );
    }

    #[test]
    fn test_qualified_constant_is_one_word() {
        let toks = kinds("method = RequestMethod.GET");
        assert_eq!(
            toks,
            vec![
                TokenKind::Word("method".to_string()),
                TokenKind::Other('='),
                TokenKind::Word("RequestMethod.GET".to_string()),
            ]
        );
    }

    #[test]
    fn test_line_numbers() {
        let toks = tokenize("@\n\n@Controller\n{");
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[1].line, 3);
        assert_eq!(toks[2].line, 3);
        assert_eq!(toks[3].line, 4);
    }

    #[test]
    fn test_comments_are_skipped() {
        let toks = kinds("foo // @RequestMapping\nbar /* { } */ baz");
        assert_eq!(
            toks,
            vec![
                TokenKind::Word("foo".to_string()),
                TokenKind::Word("bar".to_string()),
                TokenKind::Word("baz".to_string()),
            ]
        );
    }

    #[test]
    fn test_block_comment_counts_lines() {
        let toks = tokenize("/* line one\nline two */ x");
        assert_eq!(toks[0].kind, TokenKind::Word("x".to_string()));
        assert_eq!(toks[0].line, 2);
    }

    #[test]
    fn test_string_escapes() {
        let toks = kinds(r#""a\"b""#);
        assert_eq!(toks, vec![TokenKind::Str("a\"b".to_string())]);
    }

    #[test]
    fn test_unterminated_string_stops_at_line_end() {
        let toks = kinds("\"/users\nnext");
        assert_eq!(
            toks,
            vec![
                TokenKind::Str("/users".to_string()),
                TokenKind::Word("next".to_string()),
            ]
        );
    }

    #[test]
    fn test_char_literals_dropped() {
        let toks = kinds("if (c == '{') return;");
        assert!(!toks.iter().any(|k| k.is_str()));
        // The brace inside the char literal must not surface as a token.
        assert!(!toks.contains(&TokenKind::OpenBrace));
    }

    #[test]
    fn test_other_punctuation_surfaces() {
        let toks = kinds("a = b;");
        assert_eq!(
            toks,
            vec![
                TokenKind::Word("a".to_string()),
                TokenKind::Other('='),
                TokenKind::Word("b".to_string()),
                TokenKind::Other(';'),
            ]
        );
    }
}
