use tracing::debug;

use crate::ast::Query;
use crate::error::{DbError, DbResult};
use crate::tokenizer::{Keyword, Token, Tokenizer};

/// Smallest accepted shape: `SELECT <col> FROM <table>`.
const MIN_TOKENS: usize = 4;

/// Positional parser for `SELECT a b FROM t [WHERE p] [ORDER BY c] [LIMIT n]`.
///
/// Tokens 1 and 2 are always the select list and the table follows them.
/// Everything after the table is scanned for clause keywords; anything
/// unrecognised is skipped.
///
/// When token 3 is `FROM` it is skipped and the table is token 4, so
/// `SELECT a b FROM` is rejected with [DbError::InvalidQuery] even though it
/// has four tokens.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse(&mut self) -> DbResult<Query> {
        if self.tokens.len() < MIN_TOKENS {
            return Err(DbError::InvalidQuery(format!(
                "expected at least {} tokens, found {}",
                MIN_TOKENS,
                self.tokens.len()
            )));
        }

        // token 0 is assumed to be SELECT and is not checked
        let select = self.tokens[1..3].iter().map(|t| t.text.clone()).collect();

        self.position = 3;
        if self.current_token().is_some_and(|t| t.is(Keyword::From)) {
            self.advance();
        }
        let from = self
            .consume_text()
            .ok_or_else(|| DbError::InvalidQuery("missing table name after FROM".into()))?;

        let mut query = Query {
            select,
            from,
            ..Default::default()
        };

        while let Some(keyword) = self.current_token().map(|t| t.keyword) {
            match keyword {
                Some(Keyword::Where) => {
                    self.advance();
                    if let Some(predicate) = self.consume_text() {
                        query.where_clause = Some(predicate);
                    }
                }
                Some(Keyword::Order) => {
                    self.advance();
                    // ORDER without BY is dropped, the next token is scanned as usual
                    if self.current_token().is_some_and(|t| t.is(Keyword::By)) {
                        self.advance();
                        if let Some(column) = self.consume_text() {
                            query.order_by = Some(column);
                        }
                    }
                }
                Some(Keyword::Limit) => {
                    self.advance();
                    if let Some(count) = self.consume_text() {
                        query.limit = count.parse().unwrap_or(0);
                    }
                }
                _ => self.advance(),
            }
        }

        Ok(query)
    }

    //helpers
    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn consume_text(&mut self) -> Option<String> {
        let text = self.current_token()?.text.clone();
        self.advance();
        Some(text)
    }
}

/// Tokenizes and parses a query string.
///
/// # Example
/// ```
/// use kiv::parser::parse_query;
///
/// let query = parse_query("SELECT a b FROM users WHERE x LIMIT 5").unwrap();
/// assert_eq!(query.select, vec!["a", "b"]);
/// assert_eq!(query.from, "users");
/// assert_eq!(query.where_clause.as_deref(), Some("x"));
/// assert_eq!(query.limit, 5);
/// ```
pub fn parse_query(text: &str) -> DbResult<Query> {
    let tokens = Tokenizer::new(text).tokenize();
    let query = Parser::new(tokens).parse()?;
    debug!(from = %query.from, select = ?query.select, "parsed query");
    Ok(query)
}
