//! SQL query builder for paged listings.
//!
//! A listing is described by a [`PagedQuery`]: a fixed projection and source,
//! an ordered list of [`Predicate`]s and an ORDER BY expression. Predicates
//! carry their own bound values and refer to them through local placeholders
//! (`{0}`, `{1}`, ...). A single renderer renumbers those into positional
//! `$n` parameters, so the COUNT and the page SELECT are always produced from
//! the very same filter list.

mod bind;
pub(crate) mod clauses;

pub use bind::{bind_query_as, bind_scalar};

use super::pagination::PageRequest;
use uuid::Uuid;

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Int(i32),
    BigInt(i64),
    Float(f64),
    Bool(bool),
    Uuid(Uuid),
}

/// One AND-ed condition with the values it binds.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    fragment: String,
    binds: Vec<BindValue>,
}

impl Predicate {
    pub fn new(fragment: impl Into<String>, binds: Vec<BindValue>) -> Self {
        Self {
            fragment: fragment.into(),
            binds,
        }
    }

    /// A condition without bound values.
    pub fn fixed(fragment: impl Into<String>) -> Self {
        Self::new(fragment, Vec::new())
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }
}

/// Rewrite local `{i}` placeholders into `$n` where `n = offset + i + 1`.
fn render_fragment(fragment: &str, offset: usize) -> String {
    let mut out = String::with_capacity(fragment.len() + 8);
    let mut chars = fragment.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }

        let mut digits = String::new();
        while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(d);
            chars.next();
        }

        match (digits.parse::<usize>(), chars.peek()) {
            (Ok(index), Some('}')) => {
                chars.next();
                out.push('$');
                out.push_str(&(offset + index + 1).to_string());
            }
            _ => {
                out.push('{');
                out.push_str(&digits);
            }
        }
    }

    out
}

/// Ordered list of predicates, rendered as one `WHERE` clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    predicates: Vec<Predicate>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render into SQL text (empty when there are no predicates) and the
    /// flattened bind list, whose order matches the `$n` numbering.
    pub fn render(&self) -> (String, Vec<BindValue>) {
        if self.predicates.is_empty() {
            return (String::new(), Vec::new());
        }

        let mut binds = Vec::new();
        let mut parts = Vec::with_capacity(self.predicates.len());
        for predicate in &self.predicates {
            parts.push(render_fragment(&predicate.fragment, binds.len()));
            binds.extend(predicate.binds.iter().cloned());
        }

        (format!(" WHERE {}", parts.join(" AND ")), binds)
    }
}

/// A filtered, ordered and paged listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedQuery {
    pub select: &'static str,
    pub from: &'static str,
    pub filters: WhereClause,
    pub order_by: &'static str,
}

impl PagedQuery {
    pub fn build_count_sql(&self) -> (String, Vec<BindValue>) {
        let (where_sql, binds) = self.filters.render();
        (format!("SELECT COUNT(*) FROM {}{}", self.from, where_sql), binds)
    }

    pub fn build_page_sql(&self, page: &PageRequest) -> (String, Vec<BindValue>) {
        let (where_sql, mut binds) = self.filters.render();
        let limit_idx = binds.len() + 1;
        binds.push(BindValue::BigInt(page.limit as i64));
        binds.push(BindValue::BigInt(page.offset() as i64));

        let sql = format!(
            "SELECT {} FROM {}{} ORDER BY {} LIMIT ${} OFFSET ${}",
            self.select,
            self.from,
            where_sql,
            self.order_by,
            limit_idx,
            limit_idx + 1
        );
        (sql, binds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_local_placeholders_with_offset() {
        assert_eq!(render_fragment("a = {0} OR b = {0}", 3), "a = $4 OR b = $4");
        assert_eq!(render_fragment("x BETWEEN {0} AND {1}", 0), "x BETWEEN $1 AND $2");
        assert_eq!(render_fragment("no placeholders", 5), "no placeholders");
    }

    #[test]
    fn leaves_unrelated_braces_alone() {
        assert_eq!(render_fragment("'{x}'", 0), "'{x}'");
        assert_eq!(render_fragment("{12", 0), "{12");
    }

    #[test]
    fn where_clause_numbers_binds_across_predicates() {
        let mut filters = WhereClause::new();
        filters.push(Predicate::fixed("ip.profile_completed = true"));
        filters.push(Predicate::new(
            "ip.business_name ILIKE {0}",
            vec![BindValue::Text("%x%".into())],
        ));
        filters.push(Predicate::new("s.id = {0}", vec![BindValue::Int(3)]));

        let (sql, binds) = filters.render();
        assert_eq!(
            sql,
            " WHERE ip.profile_completed = true AND ip.business_name ILIKE $1 AND s.id = $2"
        );
        assert_eq!(
            binds,
            vec![BindValue::Text("%x%".into()), BindValue::Int(3)]
        );
    }

    #[test]
    fn empty_where_clause_renders_nothing() {
        let (sql, binds) = WhereClause::new().render();
        assert!(sql.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn count_and_page_share_filters() {
        let mut filters = WhereClause::new();
        filters.push(Predicate::new("t.a = {0}", vec![BindValue::Bool(true)]));
        let query = PagedQuery {
            select: "t.id",
            from: "things t",
            filters,
            order_by: "t.id ASC",
        };

        let (count_sql, count_binds) = query.build_count_sql();
        let (page_sql, page_binds) = query.build_page_sql(&PageRequest { page: 3, limit: 10 });

        assert_eq!(count_sql, "SELECT COUNT(*) FROM things t WHERE t.a = $1");
        assert_eq!(
            page_sql,
            "SELECT t.id FROM things t WHERE t.a = $1 ORDER BY t.id ASC LIMIT $2 OFFSET $3"
        );
        assert_eq!(&page_binds[..count_binds.len()], &count_binds[..]);
        assert_eq!(
            &page_binds[count_binds.len()..],
            &[BindValue::BigInt(10), BindValue::BigInt(20)]
        );
    }
}
