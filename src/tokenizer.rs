/// Clause keywords recognised by the query grammar. The leading `SELECT`
/// is positional and never looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    From,
    Where,
    Order,
    By,
    Limit,
}

impl Keyword {
    /// Matches a word against the keyword list, case-insensitively.
    fn lookup(word: &str) -> Option<Self> {
        match word.to_uppercase().as_str() {
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "ORDER" => Some(Self::Order),
            "BY" => Some(Self::By),
            "LIMIT" => Some(Self::Limit),
            _ => None,
        }
    }
}

/// One whitespace-delimited word of a query.
///
/// The original text is always kept: the grammar is positional, so a word
/// that happens to spell a keyword can still land in the select list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub keyword: Option<Keyword>,
}

impl Token {
    pub fn is(&self, keyword: Keyword) -> bool {
        self.keyword == Some(keyword)
    }
}

/// Splits a raw query string into [Token]s.
///
/// There is no quoting or escaping: any run of non-whitespace characters is
/// one token.
pub struct Tokenizer<'a> {
    input: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// # Example
    /// ```
    /// # use kiv::tokenizer::{Keyword, Tokenizer};
    /// let tokens = Tokenizer::new("select a  b\tFROM t").tokenize();
    /// assert_eq!(tokens.len(), 5);
    /// assert_eq!(tokens[0].keyword, None);
    /// assert!(tokens[3].is(Keyword::From));
    /// ```
    pub fn tokenize(&self) -> Vec<Token> {
        self.input
            .split_whitespace()
            .map(|word| Token {
                text: word.to_string(),
                keyword: Keyword::lookup(word),
            })
            .collect()
    }
}
