use crate::error::UsageError;
use crate::parsed_query::{ParsedQuery, variable_name};
use spargebra::term::Variable;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: usize = 2000;

/// The result window requested by one page query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// The window directly following this one.
    pub fn next(&self) -> Self {
        Self::new(self.offset + self.limit, self.limit)
    }

    /// A page shorter than the window is the last one.
    pub fn is_last_page(&self, page_len: usize) -> bool {
        page_len < self.limit
    }
}

/// A query rewritten for pagination plus the window currently requested.
///
/// The limit is fixed when the plan is created; the offset only moves
/// forward, by exactly one limit per filled page.
#[derive(Debug, Clone)]
pub struct PagingPlan {
    query: ParsedQuery,
    window: PageWindow,
}

impl PagingPlan {
    pub fn window(&self) -> PageWindow {
        self.window
    }

    pub fn limit(&self) -> usize {
        self.window.limit
    }

    pub fn offset(&self) -> usize {
        self.window.offset
    }

    pub fn ordering(&self) -> &[Variable] {
        self.query.order()
    }

    pub fn query(&self) -> &ParsedQuery {
        &self.query
    }

    /// Move to the next window.
    pub fn advance(&mut self) {
        self.window = self.window.next();
        self.query.set_window(self.window.limit, self.window.offset);
    }

    /// Query text for the current window.
    pub fn render(&self) -> String {
        self.query.to_sparql()
    }
}

/// Imposes a deterministic total order on a query and windows it.
#[derive(Debug, Clone, Copy)]
pub struct QueryRewriter {
    page_size: usize,
}

impl Default for QueryRewriter {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryRewriter {
    pub fn new(page_size: usize) -> Result<Self, UsageError> {
        if page_size == 0 {
            return Err(UsageError::ZeroPageSize);
        }
        Ok(Self { page_size })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Variables of the query's triple patterns, first occurrence first.
    pub fn ordering(query: &ParsedQuery) -> Vec<Variable> {
        let mut order: Vec<Variable> = Vec::new();
        for triple in query.triples() {
            for name in triple.terms().into_iter().filter_map(variable_name) {
                if !order.iter().any(|v| v.as_str() == name) {
                    order.push(Variable::new_unchecked(name));
                }
            }
        }
        order
    }

    /// Build the initial plan: ordering over every variable, offset 0.
    pub fn rewrite(&self, mut query: ParsedQuery) -> PagingPlan {
        let order = Self::ordering(&query);
        query.set_order(order);

        let window = PageWindow::new(0, self.page_size);
        query.set_window(window.limit, window.offset);

        PagingPlan { query, window }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(vars: &[Variable]) -> Vec<&str> {
        vars.iter().map(Variable::as_str).collect()
    }

    #[test]
    fn test_ordering_drops_duplicates_in_first_occurrence_order() {
        let query = ParsedQuery::parse(
            r#"
            PREFIX ex: <http://example.org/>
            SELECT * WHERE {
                ?s ?p ?o .
                ?s ?p ex:thing .
            }
        "#,
        )
        .unwrap();

        assert_eq!(names(&QueryRewriter::ordering(&query)), vec!["s", "p", "o"]);
    }

    #[test]
    fn test_ordering_follows_pattern_order_not_projection() {
        let query = ParsedQuery::parse(
            r#"
            PREFIX ex: <http://example.org/>
            SELECT ?name ?person WHERE {
                ?person ex:name ?name .
                ?person ex:knows ?friend .
            }
        "#,
        )
        .unwrap();

        assert_eq!(
            names(&QueryRewriter::ordering(&query)),
            vec!["person", "name", "friend"]
        );
    }

    #[test]
    fn test_rewrite_sets_window() {
        let query = ParsedQuery::parse("SELECT * WHERE { ?s ?p ?o } LIMIT 7 OFFSET 3").unwrap();
        let plan = QueryRewriter::new(2).unwrap().rewrite(query);

        assert_eq!(plan.window(), PageWindow::new(0, 2));
        assert_eq!(names(plan.ordering()), vec!["s", "p", "o"]);

        let rendered = ParsedQuery::parse(&plan.render()).unwrap();
        assert_eq!(rendered.limit(), Some(2));
        assert_eq!(rendered.offset().unwrap_or(0), 0);
        assert_eq!(names(rendered.order()), vec!["s", "p", "o"]);
    }

    #[test]
    fn test_advance_moves_offset_by_limit() {
        let query = ParsedQuery::parse("SELECT * WHERE { ?s ?p ?o }").unwrap();
        let mut plan = QueryRewriter::new(25).unwrap().rewrite(query);

        plan.advance();
        plan.advance();
        assert_eq!(plan.offset(), 50);
        assert_eq!(plan.limit(), 25);

        let rendered = ParsedQuery::parse(&plan.render()).unwrap();
        assert_eq!(rendered.offset(), Some(50));
        assert_eq!(rendered.limit(), Some(25));
    }

    #[test]
    fn test_query_without_variables() {
        let query = ParsedQuery::parse(
            r#"
            PREFIX ex: <http://example.org/>
            SELECT * WHERE { ex:a ex:b ex:c }
        "#,
        )
        .unwrap();
        let plan = QueryRewriter::default().rewrite(query);

        assert!(plan.ordering().is_empty());
        assert_eq!(plan.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(plan.offset(), 0);
        assert!(!plan.render().contains("ORDER BY"));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        assert!(matches!(
            QueryRewriter::new(0),
            Err(UsageError::ZeroPageSize)
        ));
    }

    #[test]
    fn test_last_page_detection() {
        let window = PageWindow::new(0, 2);
        assert!(!window.is_last_page(2));
        assert!(window.is_last_page(1));
        assert!(window.is_last_page(0));
    }
}
