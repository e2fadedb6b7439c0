/// A parsed `SELECT` query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    /// Selected column names, in the order they were written.
    pub select: Vec<String>,
    /// Source table name.
    pub from: String,
    /// Raw predicate text of the `WHERE` clause. Never parsed further.
    pub where_clause: Option<String>,
    /// Column named by `ORDER BY`.
    pub order_by: Option<String>,
    /// Maximum number of rows to return; `0` means unlimited.
    pub limit: usize,
}

impl Query {
    pub fn new<I, S>(select: I, from: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            select: select.into_iter().map(Into::into).collect(),
            from: from.into(),
            ..Default::default()
        }
    }

    pub fn with_where(mut self, predicate: impl Into<String>) -> Self {
        self.where_clause = Some(predicate.into());
        self
    }

    pub fn with_order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}
