//! The small SQL surface the session executes.
//!
//! Supported statements (keywords are case-insensitive, a trailing `;` is
//! allowed):
//!
//! ```text
//! ALTER TABLE delta.`<path>` SET TBLPROPERTIES (key = value [, ...])
//! GENERATE <mode> FOR TABLE delta.`<path>`
//! ```
//!
//! Keys may be dotted (`delta.appendOnly`) or quoted; values may be bare
//! words, numbers or quoted strings. The `=` between key and value is
//! optional.
use crate::session::error::{SessionError, SqlParseSnafu, UnsupportedStatementSnafu};

/// A parsed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `ALTER TABLE ... SET TBLPROPERTIES`.
    SetTblProperties {
        /// Table path from the `delta.`<path>`` reference.
        table: String,
        /// Key/value pairs in statement order.
        properties: Vec<(String, String)>,
    },
    /// `GENERATE <mode> FOR TABLE ...`.
    Generate {
        /// Manifest mode as written.
        mode: String,
        /// Table path.
        table: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Backticked(String),
    Symbol(char),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{w}'"),
            Token::Quoted(s) => format!("string '{s}'"),
            Token::Backticked(s) => format!("`{s}`"),
            Token::Symbol(c) => format!("'{c}'"),
        }
    }
}

#[derive(Debug)]
struct TokenSpan {
    token: Token,
    start: usize,
}

const SYMBOLS: [char; 6] = ['(', ')', ',', '=', '.', ';'];

fn is_word_char(ch: char) -> bool {
    !ch.is_whitespace() && !SYMBOLS.contains(&ch) && !matches!(ch, '\'' | '"' | '`')
}

fn lex(input: &str) -> Result<Vec<TokenSpan>, SessionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if SYMBOLS.contains(&ch) {
            chars.next();
            tokens.push(TokenSpan {
                token: Token::Symbol(ch),
                start,
            });
            continue;
        }

        if ch == '\'' || ch == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                if c == ch {
                    closed = true;
                    break;
                }
                if c == '\\' {
                    let (_, esc) = chars.next().ok_or_else(|| SessionError::SqlParse {
                        position: start,
                        msg: "unterminated escape in quoted string".to_string(),
                    })?;
                    value.push(esc);
                    continue;
                }
                value.push(c);
            }
            if !closed {
                return SqlParseSnafu {
                    position: start,
                    msg: "unterminated quoted string",
                }
                .fail();
            }
            tokens.push(TokenSpan {
                token: Token::Quoted(value),
                start,
            });
            continue;
        }

        if ch == '`' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                if c == '`' {
                    // A doubled backtick is a literal backtick.
                    if chars.peek().is_some_and(|&(_, n)| n == '`') {
                        chars.next();
                        value.push('`');
                        continue;
                    }
                    closed = true;
                    break;
                }
                value.push(c);
            }
            if !closed {
                return SqlParseSnafu {
                    position: start,
                    msg: "unterminated backquoted identifier",
                }
                .fail();
            }
            tokens.push(TokenSpan {
                token: Token::Backticked(value),
                start,
            });
            continue;
        }

        let mut value = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if !is_word_char(c) {
                break;
            }
            value.push(c);
            chars.next();
        }
        tokens.push(TokenSpan {
            token: Token::Word(value),
            start,
        });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<TokenSpan>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.start)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error<T>(&self, msg: impl Into<String>) -> Result<T, SessionError> {
        SqlParseSnafu {
            position: self.position(),
            msg,
        }
        .fail()
    }

    fn found(&self) -> String {
        self.peek()
            .map_or_else(|| "end of statement".to_string(), Token::describe)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), SessionError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            self.error(format!("expected {keyword}, found {}", self.found()))
        }
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.peek() == Some(&Token::Symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), SessionError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            self.error(format!("expected '{symbol}', found {}", self.found()))
        }
    }

    fn expect_end(&self) -> Result<(), SessionError> {
        match self.peek() {
            None => Ok(()),
            Some(_) => self.error(format!("unexpected {} after statement", self.found())),
        }
    }

    /// `delta.`<path>``
    fn table_reference(&mut self) -> Result<String, SessionError> {
        if !self.eat_keyword("delta") {
            return self.error(format!(
                "expected a path-based table reference delta.`<path>`, found {}",
                self.found()
            ));
        }
        self.expect_symbol('.')?;
        match self.peek() {
            Some(Token::Backticked(path)) if !path.trim().is_empty() => {
                let path = path.clone();
                self.pos += 1;
                Ok(path)
            }
            _ => self.error("expected a backquoted, non-empty table path after delta."),
        }
    }

    /// Dotted word sequence or a quoted string.
    fn name_or_literal(&mut self, what: &str) -> Result<String, SessionError> {
        let mut name = match self.peek() {
            Some(Token::Quoted(s) | Token::Backticked(s)) => {
                let s = s.clone();
                self.pos += 1;
                return Ok(s);
            }
            Some(Token::Word(w)) => w.clone(),
            _ => return self.error(format!("expected {what}, found {}", self.found())),
        };
        self.pos += 1;

        while self.peek() == Some(&Token::Symbol('.')) {
            self.pos += 1;
            match self.peek() {
                Some(Token::Word(part)) => {
                    name.push('.');
                    name.push_str(part);
                }
                _ => return self.error(format!("expected {what} after '.'")),
            }
            self.pos += 1;
        }
        Ok(name)
    }

    fn property_list(&mut self) -> Result<Vec<(String, String)>, SessionError> {
        self.expect_symbol('(')?;
        let mut out = Vec::new();
        loop {
            let key = self.name_or_literal("a property key")?;
            self.eat_symbol('=');
            let value = self.name_or_literal("a property value")?;
            out.push((key, value));
            if !self.eat_symbol(',') {
                break;
            }
        }
        self.expect_symbol(')')?;
        Ok(out)
    }

    fn alter_table(&mut self) -> Result<Statement, SessionError> {
        self.expect_keyword("TABLE")?;
        let table = self.table_reference()?;

        if self.eat_keyword("SET") {
            self.expect_keyword("TBLPROPERTIES")?;
            let properties = self.property_list()?;
            return Ok(Statement::SetTblProperties { table, properties });
        }

        UnsupportedStatementSnafu {
            statement: format!("ALTER TABLE ... {}", self.found()),
        }
        .fail()
    }

    fn generate(&mut self) -> Result<Statement, SessionError> {
        let mode = match self.peek() {
            Some(Token::Word(mode)) => mode.clone(),
            _ => return self.error(format!("expected a manifest mode, found {}", self.found())),
        };
        self.pos += 1;
        self.expect_keyword("FOR")?;
        self.expect_keyword("TABLE")?;
        let table = self.table_reference()?;
        Ok(Statement::Generate { mode, table })
    }
}

/// Render `path` as a `delta.`<path>`` table reference, doubling any
/// backtick inside the path.
pub fn delta_table_reference(path: &str) -> String {
    format!("delta.`{}`", path.replace('`', "``"))
}

/// Parse one statement.
pub fn parse_statement(sql: &str) -> Result<Statement, SessionError> {
    let mut tokens = lex(sql)?;
    while tokens
        .last()
        .is_some_and(|t| t.token == Token::Symbol(';'))
    {
        tokens.pop();
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: sql.len(),
    };

    let statement = match parser.next() {
        None => return parser.error("empty statement"),
        Some(Token::Word(w)) if w.eq_ignore_ascii_case("ALTER") => parser.alter_table()?,
        Some(Token::Word(w)) if w.eq_ignore_ascii_case("GENERATE") => parser.generate()?,
        Some(Token::Word(w)) => {
            return UnsupportedStatementSnafu {
                statement: w.to_ascii_uppercase(),
            }
            .fail();
        }
        Some(other) => {
            parser.pos = 0;
            return parser.error(format!("expected a statement keyword, found {}", other.describe()));
        }
    };

    parser.expect_end()?;
    Ok(statement)
}
