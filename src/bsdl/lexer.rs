//! Lexer (tokenizer) for the BSDL attribute subset.
//!
//! BSDL is VHDL underneath, so the lexer only needs to understand enough of
//! VHDL's lexical rules to find attribute boundaries reliably: `--` comments,
//! double-quoted string literals, identifiers, integers and punctuation.
//! Anything else becomes a single-character [`TokenKind::Symbol`].

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text (string literals without their quotes)
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Byte offset of the first character of the token in the input
    pub start: usize,
    /// Byte offset one past the last character of the token
    pub end: usize,
}

impl Token {
    /// Check whether this token is the given keyword (case-insensitive).
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text.eq_ignore_ascii_case(keyword)
    }
}

/// Token types in BSDL source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An identifier or keyword (`attribute`, `BOUNDARY_LENGTH`, `entity`, ...)
    Identifier,
    /// An unsigned decimal integer
    Number,
    /// A double-quoted string literal
    StringLit,
    /// Open parenthesis '('
    OpenParen,
    /// Close parenthesis ')'
    CloseParen,
    /// Comma ','
    Comma,
    /// Colon ':'
    Colon,
    /// Statement terminator ';'
    Semicolon,
    /// String concatenation '&'
    Ampersand,
    /// Any other single character
    Symbol,
    /// End of input
    Eof,
}

/// Lexer for tokenizing BSDL input.
pub struct Lexer<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token. Lexing never fails; unknown characters are
    /// returned as [`TokenKind::Symbol`] and an unterminated string ends at
    /// the end of its line.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.pos();
        let line = self.line;
        let column = self.column;

        let ch = match self.chars.peek() {
            Some(&(_, ch)) => ch,
            None => {
                return Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    line,
                    column,
                    start,
                    end: start,
                };
            }
        };

        let (kind, text) = match ch {
            '"' => {
                self.advance();
                (TokenKind::StringLit, self.read_string())
            }
            '(' | ')' | ',' | ':' | ';' | '&' => {
                self.advance();
                let kind = match ch {
                    '(' => TokenKind::OpenParen,
                    ')' => TokenKind::CloseParen,
                    ',' => TokenKind::Comma,
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    _ => TokenKind::Ampersand,
                };
                (kind, ch.to_string())
            }
            _ if ch.is_alphanumeric() || ch == '_' => {
                let text = self.read_word();
                let kind = if text.chars().all(|c| c.is_ascii_digit()) {
                    TokenKind::Number
                } else {
                    TokenKind::Identifier
                };
                (kind, text)
            }
            _ => {
                self.advance();
                (TokenKind::Symbol, ch.to_string())
            }
        };

        Token {
            kind,
            text,
            line,
            column,
            start,
            end: self.pos(),
        }
    }

    fn pos(&mut self) -> usize {
        self.chars.peek().map(|(pos, _)| *pos).unwrap_or(self.input.len())
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn at_comment(&self) -> bool {
        let mut probe = self.chars.clone();
        matches!(probe.next(), Some((_, '-'))) && matches!(probe.next(), Some((_, '-')))
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '-' && self.at_comment() {
                while let Some(&(_, c)) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self) -> String {
        let mut text = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            match ch {
                '"' => {
                    self.advance();
                    break;
                }
                '\n' => break,
                _ => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
        text
    }

    fn read_word(&mut self) -> String {
        let mut text = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Remove `--` line comments that sit outside string literals.
///
/// Line breaks are kept so that offsets into the result still map onto the
/// same lines as the original text.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_string = !in_string;
                out.push(ch);
            }
            '\n' => {
                in_string = false;
                out.push(ch);
            }
            '-' if !in_string && chars.peek() == Some(&'-') => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_attribute_header() {
        let input = "attribute BOUNDARY_LENGTH of XC7A100T : entity is 989;";
        let kinds: Vec<TokenKind> = Lexer::new(input).map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::Identifier,
                TokenKind::Number,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_lexer_string_hides_semicolon() {
        let input = "\"0 (BC_1; odd)\" & \"1\";";
        let tokens: Vec<Token> = Lexer::new(input).collect();
        assert_eq!(tokens[0].kind, TokenKind::StringLit);
        assert_eq!(tokens[0].text, "0 (BC_1; odd)");
        assert_eq!(tokens[1].kind, TokenKind::Ampersand);
        assert_eq!(tokens[3].kind, TokenKind::Semicolon);
    }

    #[test]
    fn test_lexer_skips_comments_and_tracks_lines() {
        let input = "-- header; with semicolon\n  entity TOP is";
        let mut lexer = Lexer::new(input);
        let tok = lexer.next_token();
        assert!(tok.is_keyword("ENTITY"));
        assert_eq!(tok.line, 2);
        assert_eq!(tok.column, 3);
        assert_eq!(&input[tok.start..tok.end], "entity");
    }

    #[test]
    fn test_single_dash_is_a_symbol() {
        let tokens: Vec<Token> = Lexer::new("a - b").collect();
        assert_eq!(tokens[1].kind, TokenKind::Symbol);
        assert_eq!(tokens[1].text, "-");
    }

    #[test]
    fn test_strip_comments_keeps_strings() {
        let text = "\"A -- not a comment\" & -- PAD177\n\"B\"";
        let stripped = strip_comments(text);
        assert_eq!(stripped, "\"A -- not a comment\" & \n\"B\"");
    }
}
