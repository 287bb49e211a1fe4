use crate::error::UsageError;
use spargebra::{Query, SparqlParser};
use spargebra::algebra::{Expression, GraphPattern, OrderExpression};
use spargebra::term::{TriplePattern, Variable};
use std::fmt;

/// Marker that starts the surface form of every query variable.
pub const VARIABLE_MARKER: char = '?';

/// Surface forms of the three terms of a triple pattern, as the query
/// renderer prints them (`?s`, `<http://...>`, `"literal"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplePatternTerms {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl TriplePatternTerms {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Terms in subject, predicate, object order.
    pub fn terms(&self) -> [&str; 3] {
        [&self.subject, &self.predicate, &self.object]
    }
}

impl From<&TriplePattern> for TriplePatternTerms {
    fn from(pattern: &TriplePattern) -> Self {
        Self::new(
            pattern.subject.to_string(),
            pattern.predicate.to_string(),
            pattern.object.to_string(),
        )
    }
}

/// Returns the variable name if `term` is syntactically a variable.
pub fn variable_name(term: &str) -> Option<&str> {
    term.strip_prefix(VARIABLE_MARKER).filter(|name| !name.is_empty())
}

/// A parsed SELECT query together with the solution modifiers the
/// paginator controls (ordering, limit, offset).
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    query: Query,
    triples: Vec<TriplePatternTerms>,
    order: Vec<Variable>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl ParsedQuery {
    /// Parse SPARQL query text. Only SELECT queries are accepted.
    pub fn parse(text: &str) -> Result<Self, UsageError> {
        let query = SparqlParser::new()
            .parse_query(text)
            .map_err(|e| UsageError::Syntax(e.to_string()))?;

        let pattern = match &query {
            Query::Select { pattern, .. } => pattern,
            Query::Construct { .. } => return Err(UsageError::NotSelect("CONSTRUCT")),
            Query::Describe { .. } => return Err(UsageError::NotSelect("DESCRIBE")),
            Query::Ask { .. } => return Err(UsageError::NotSelect("ASK")),
        };

        let mut triples = Vec::new();
        collect_triples(pattern, &mut triples);
        let (order, limit, offset) = read_modifiers(pattern);

        Ok(Self {
            query,
            triples,
            order,
            limit,
            offset,
        })
    }

    /// Triple patterns of the WHERE clause in syntactic order.
    pub fn triples(&self) -> &[TriplePatternTerms] {
        &self.triples
    }

    pub fn order(&self) -> &[Variable] {
        &self.order
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub(crate) fn set_order(&mut self, order: Vec<Variable>) {
        self.order = order;
    }

    pub(crate) fn set_window(&mut self, limit: usize, offset: usize) {
        self.limit = Some(limit);
        self.offset = Some(offset);
    }

    /// Render the query with its current ordering, limit and offset.
    ///
    /// Ordering, limit and offset carried by the original text are replaced,
    /// never merged.
    pub fn to_sparql(&self) -> String {
        let mut query = self.query.clone();
        if let Query::Select { pattern, .. } = &mut query {
            let mut rewritten = with_order(pattern, &self.order);
            if self.limit.is_some() || self.offset.is_some() {
                rewritten = GraphPattern::Slice {
                    inner: Box::new(rewritten),
                    start: self.offset.unwrap_or(0),
                    length: self.limit,
                };
            }
            *pattern = rewritten;
        }
        query.to_string()
    }
}

impl fmt::Display for ParsedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sparql())
    }
}

/// Walk the pattern tree left to right and record every triple pattern.
fn collect_triples(pattern: &GraphPattern, out: &mut Vec<TriplePatternTerms>) {
    match pattern {
        GraphPattern::Bgp { patterns } => out.extend(patterns.iter().map(TriplePatternTerms::from)),
        GraphPattern::Path {
            subject,
            path,
            object,
        } => out.push(TriplePatternTerms::new(
            subject.to_string(),
            path.to_string(),
            object.to_string(),
        )),
        GraphPattern::Join { left, right }
        | GraphPattern::Union { left, right }
        | GraphPattern::LeftJoin { left, right, .. } => {
            collect_triples(left, out);
            collect_triples(right, out);
        }
        // Only the left side of MINUS contributes solutions.
        GraphPattern::Minus { left, .. } => collect_triples(left, out),
        GraphPattern::Filter { inner, .. }
        | GraphPattern::Graph { inner, .. }
        | GraphPattern::Extend { inner, .. }
        | GraphPattern::OrderBy { inner, .. }
        | GraphPattern::Project { inner, .. }
        | GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::Group { inner, .. }
        | GraphPattern::Service { inner, .. } => collect_triples(inner, out),
        #[allow(unreachable_patterns)]
        _ => {}
    }
}

/// Read the ORDER BY variables, LIMIT and OFFSET from the outer modifier
/// chain of a SELECT pattern.
///
/// The walk ends at the outer projection: anything below it belongs to the
/// WHERE clause, sub-selects included.
fn read_modifiers(pattern: &GraphPattern) -> (Vec<Variable>, Option<usize>, Option<usize>) {
    let mut order = Vec::new();
    let mut limit = None;
    let mut offset = None;
    let mut current = pattern;
    loop {
        match current {
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => {
                limit = *length;
                offset = Some(*start);
                current = inner;
            }
            GraphPattern::Distinct { inner } | GraphPattern::Reduced { inner } => current = inner,
            GraphPattern::Project { inner, .. } => {
                if let GraphPattern::OrderBy { expression, .. } = inner.as_ref() {
                    order = expression
                        .iter()
                        .filter_map(|e| match e {
                            OrderExpression::Asc(Expression::Variable(v))
                            | OrderExpression::Desc(Expression::Variable(v)) => Some(v.clone()),
                            _ => None,
                        })
                        .collect();
                }
                break;
            }
            _ => break,
        }
    }
    (order, limit, offset)
}

/// Rebuild the outer modifier chain without its slice, placing `order`
/// directly below the outer projection. The WHERE pattern is left untouched.
fn with_order(pattern: &GraphPattern, order: &[Variable]) -> GraphPattern {
    match pattern {
        GraphPattern::Slice { inner, .. } => with_order(inner, order),
        GraphPattern::Distinct { inner } => GraphPattern::Distinct {
            inner: Box::new(with_order(inner, order)),
        },
        GraphPattern::Reduced { inner } => GraphPattern::Reduced {
            inner: Box::new(with_order(inner, order)),
        },
        GraphPattern::Project { inner, variables } => {
            let unordered = match inner.as_ref() {
                GraphPattern::OrderBy { inner, .. } => inner.as_ref().clone(),
                other => other.clone(),
            };
            GraphPattern::Project {
                inner: Box::new(ordered(unordered, order)),
                variables: variables.clone(),
            }
        }
        other => ordered(other.clone(), order),
    }
}

fn ordered(inner: GraphPattern, order: &[Variable]) -> GraphPattern {
    if order.is_empty() {
        return inner;
    }
    GraphPattern::OrderBy {
        inner: Box::new(inner),
        expression: order
            .iter()
            .map(|v| OrderExpression::Asc(Expression::Variable(v.clone())))
            .collect(),
    }
}
