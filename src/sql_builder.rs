//! Parameterized SQL construction for the DuckDB store.
//!
//! Values always travel as `?` parameters; only column and table names
//! (which come from [`PageRequest`](crate::store::PageRequest)s built inside
//! the crate) are interpolated. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use merchant_analytics::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("orders")
//!     .where_eq("tenant_id", "shop-1")
//!     .where_cast("created_at", ">=", "2024-01-01 00:00:00.000", "TIMESTAMP")
//!     .order_by(&["created_at ASC"])
//!     .limit(1000)
//!     .build();
//! ```

use crate::store::{Bound, Op, PageRequest};

pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
    offset_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
            offset_val: None,
        }
    }

    /// Translate a store-neutral request.
    pub fn from_request(request: &PageRequest) -> Self {
        let mut qb = SqlBuilder::new(&request.table);
        if !request.columns.is_empty() {
            let cols: Vec<&str> = request.columns.iter().map(String::as_str).collect();
            qb.select(&cols);
        }
        for cond in &request.conditions {
            let op = match cond.op {
                Op::Eq => "=",
                Op::Gte => ">=",
                Op::Lte => "<=",
            };
            let param = cond.value.to_sql_param();
            match &cond.value {
                Bound::Text(_) => {
                    qb.where_clause(&format!("{} {} ?", cond.column, op), &[param.as_str()])
                }
                Bound::Date(_) => qb.where_cast(&cond.column, op, &param, "DATE"),
                Bound::Timestamp(_) => qb.where_cast(&cond.column, op, &param, "TIMESTAMP"),
            };
        }
        let order: Vec<String> = request
            .order_by
            .iter()
            .map(|(col, asc)| format!("{} {}", col, if *asc { "ASC" } else { "DESC" }))
            .collect();
        let order_refs: Vec<&str> = order.iter().map(String::as_str).collect();
        qb.order_by(&order_refs);
        if let Some(n) = request.limit {
            qb.limit(n);
        }
        if let Some(n) = request.offset {
            qb.offset(n);
        }
        qb
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clause(&format!("{} = ?", column), &[value])
    }

    /// Compare against a parameter cast to `sql_type`:
    /// `{column} {op} CAST(? AS {sql_type})`.
    pub fn where_cast(&mut self, column: &str, op: &str, value: &str, sql_type: &str) -> &mut Self {
        self.where_clause(&format!("{} {} CAST(? AS {})", column, op, sql_type), &[value])
    }

    /// Add ORDER BY clauses (e.g. `"created_at ASC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols.extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        if let Some(n) = self.offset_val {
            parts.push(format!("OFFSET {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
