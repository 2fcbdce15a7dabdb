use super::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    LParen,
    RParen,
    Comma,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character of the token.
    pub pos: usize,
}

pub(crate) fn lex(src: &str) -> Result<Vec<Token>, ParseError> {
    Lexer { src, pos: 0 }.run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl Lexer<'_> {
    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(ch) = self.peek_char() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    pos: start,
                });
                return Ok(tokens);
            };

            let kind = if ch.is_ascii_digit() || ch == '.' {
                self.number()?
            } else if ch.is_ascii_alphabetic() || ch == '_' {
                self.ident()
            } else {
                self.bump(ch);
                match ch {
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    '*' if self.eat('*') => TokenKind::StarStar,
                    '*' => TokenKind::Star,
                    '/' => TokenKind::Slash,
                    '%' => TokenKind::Percent,
                    '<' if self.eat('=') => TokenKind::Le,
                    '<' => TokenKind::Lt,
                    '>' if self.eat('=') => TokenKind::Ge,
                    '>' => TokenKind::Gt,
                    '=' if self.eat('=') => TokenKind::EqEq,
                    '!' if self.eat('=') => TokenKind::NotEq,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    ',' => TokenKind::Comma,
                    other => {
                        return Err(ParseError::new(start, format!("unexpected character '{other}'")));
                    }
                }
            };
            tokens.push(Token { kind, pos: start });
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src.get(self.pos..)?.chars().next()
    }

    fn bump(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.bump(expected);
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek_char() {
            if !pred(ch) {
                break;
            }
            self.bump(ch);
        }
    }

    fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    fn number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        self.eat_while(|c| c.is_ascii_digit());
        if self.eat('.') {
            self.eat_while(|c| c.is_ascii_digit());
        }
        // An exponent needs digits; otherwise the `e` is left for the next token.
        let mark = self.pos;
        if self.eat('e') || self.eat('E') {
            if !self.eat('+') {
                self.eat('-');
            }
            if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.eat_while(|c| c.is_ascii_digit());
            } else {
                self.pos = mark;
            }
        }

        let text = self.src.get(start..self.pos).unwrap_or_default();
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::new(start, format!("invalid number '{text}'")))
    }

    fn ident(&mut self) -> TokenKind {
        let start = self.pos;
        self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        TokenKind::Ident(self.src.get(start..self.pos).unwrap_or_default().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src)
            .expect("lexes")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("x**2 <= 1e3"),
            vec![
                TokenKind::Ident("x".into()),
                TokenKind::StarStar,
                TokenKind::Number(2.0),
                TokenKind::Le,
                TokenKind::Number(1000.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(kinds(".5")[0], TokenKind::Number(0.5));
        assert_eq!(kinds("2.5E-1")[0], TokenKind::Number(0.25));
    }

    #[test]
    fn test_rejects_strings_and_attributes() {
        let err = lex("__import__('os')").expect_err("quote is not a token");
        assert_eq!(err.position, 11);
        assert!(lex("x.real").is_err());
        assert!(lex("x = 1").is_err());
    }
}
