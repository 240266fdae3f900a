use std::borrow::Cow;

use super::error::{PostScriptError, PostScriptResult};

pub(super) struct PostScriptFunctionLexer<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

#[derive(Debug, PartialEq)]
pub(super) enum PostScriptFunctionToken {
    Operator(PostScriptFunctionOperator),
    Real(f32),
    Integer(i32),
    OpenCurlyBrace,
    CloseCurlyBrace,
}

#[pdf_enum]
pub(super) enum PostScriptFunctionOperator {
    // Arithmetic
    Abs = "abs",
    Add = "add",
    Atan = "atan",
    Ceiling = "ceiling",
    Cos = "cos",
    Cvi = "cvi",
    Cvr = "cvr",
    Div = "div",
    Exp = "exp",
    Floor = "floor",
    Idiv = "idiv",
    Ln = "ln",
    Log = "log",
    Mod = "mod",
    Mul = "mul",
    Neg = "neg",
    Round = "round",
    Sin = "sin",
    Sqrt = "sqrt",
    Sub = "sub",
    Truncate = "truncate",

    // Relational, boolean, and bitwise
    And = "and",
    Bitshift = "bitshift",
    Eq = "eq",
    False = "false",
    Ge = "ge",
    Gt = "gt",
    Le = "le",
    Lt = "lt",
    Ne = "ne",
    Not = "not",
    Or = "or",
    True = "true",
    Xor = "xor",

    // Conditional
    If = "if",
    Ifelse = "ifelse",

    // Stack
    Copy = "copy",
    Dup = "dup",
    Exch = "exch",
    Index = "index",
    Pop = "pop",
    Roll = "roll",
}

impl<'a> PostScriptFunctionLexer<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    fn next_byte(&mut self) -> Option<u8> {
        let b = self.buffer.get(self.cursor)?;

        self.cursor += 1;

        Some(*b)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.buffer.get(self.cursor).copied()
    }

    fn consume_while(&mut self, pred: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek_byte() {
            if !pred(b) {
                break;
            }

            self.next_byte();
        }
    }

    fn consume_if_next_byte_is(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        match self.peek_byte() {
            Some(b) if pred(b) => {
                self.next_byte();
                true
            }
            _ => false,
        }
    }

    /// Whitespace and `%` comments
    fn skip_whitespace(&mut self) {
        loop {
            self.consume_while(|b| b.is_ascii_whitespace());

            if self.peek_byte() != Some(b'%') {
                break;
            }

            self.consume_while(|b| b != b'\n' && b != b'\r');
        }
    }

    fn lex_ident(&mut self) -> PostScriptResult<PostScriptFunctionToken> {
        let start = self.cursor;

        self.consume_while(|b| b.is_ascii_alphanumeric());

        let name = String::from_utf8_lossy(&self.buffer[start..self.cursor]);

        PostScriptFunctionOperator::from_str(&name)
            .map(PostScriptFunctionToken::Operator)
            .map_err(|_| PostScriptError::Undefined {
                name: name.into_owned(),
            })
    }

    fn lex_number(&mut self) -> PostScriptResult<PostScriptFunctionToken> {
        let start = self.cursor;
        let mut is_real = false;

        self.consume_if_next_byte_is(|b| b == b'-' || b == b'+');
        self.consume_while(|b| b.is_ascii_digit());

        if self.consume_if_next_byte_is(|b| b == b'.') {
            is_real = true;
            self.consume_while(|b| b.is_ascii_digit());
        }

        if self.consume_if_next_byte_is(|b| b == b'e' || b == b'E') {
            is_real = true;
            self.consume_if_next_byte_is(|b| b == b'-' || b == b'+');
            self.consume_while(|b| b.is_ascii_digit());
        }

        let bytes = &self.buffer[start..self.cursor];

        if !is_real {
            // integers too large for an `i32` become reals
            if let Some(i) = std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.parse::<i32>().ok())
            {
                return Ok(PostScriptFunctionToken::Integer(i));
            }
        }

        Ok(PostScriptFunctionToken::Real(fast_float::parse(bytes)?))
    }

    pub fn next_token(&mut self) -> PostScriptResult<Option<PostScriptFunctionToken>> {
        self.skip_whitespace();

        let Some(b) = self.peek_byte() else {
            return Ok(None);
        };

        let token = match b {
            b'0'..=b'9' | b'-' | b'+' | b'.' => self.lex_number()?,
            b'a'..=b'z' | b'A'..=b'Z' => self.lex_ident()?,
            b'{' => {
                self.next_byte();
                PostScriptFunctionToken::OpenCurlyBrace
            }
            b'}' => {
                self.next_byte();
                PostScriptFunctionToken::CloseCurlyBrace
            }
            b => {
                return Err(PostScriptError::SyntaxError(Cow::Owned(format!(
                    "unexpected byte {:?}",
                    b as char
                ))))
            }
        };

        Ok(Some(token))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(source: &[u8]) -> Vec<PostScriptFunctionToken> {
        let mut lexer = PostScriptFunctionLexer::new(source);
        let mut tokens = Vec::new();

        while let Some(token) = lexer.next_token().unwrap() {
            tokens.push(token);
        }

        tokens
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens(b"1 -2 +3 .5 -1.25 1e2 3000000000"),
            vec![
                PostScriptFunctionToken::Integer(1),
                PostScriptFunctionToken::Integer(-2),
                PostScriptFunctionToken::Integer(3),
                PostScriptFunctionToken::Real(0.5),
                PostScriptFunctionToken::Real(-1.25),
                PostScriptFunctionToken::Real(100.0),
                PostScriptFunctionToken::Real(3_000_000_000.0),
            ]
        );
    }

    #[test]
    fn braces_and_comments() {
        assert_eq!(
            tokens(b"{ dup % duplicate\n mul}"),
            vec![
                PostScriptFunctionToken::OpenCurlyBrace,
                PostScriptFunctionToken::Operator(PostScriptFunctionOperator::Dup),
                PostScriptFunctionToken::Operator(PostScriptFunctionOperator::Mul),
                PostScriptFunctionToken::CloseCurlyBrace,
            ]
        );
    }

    #[test]
    fn unknown_operator() {
        let mut lexer = PostScriptFunctionLexer::new(b"moveto");
        assert!(matches!(
            lexer.next_token(),
            Err(PostScriptError::Undefined { name }) if name == "moveto"
        ));
    }

    #[test]
    fn lone_sign_is_an_error() {
        let mut lexer = PostScriptFunctionLexer::new(b"- 1");
        assert!(lexer.next_token().is_err());
    }
}
