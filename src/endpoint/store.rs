use super::Endpoint;
use crate::error::{FetchError, StoreError};
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::vocab::xsd;
use oxigraph::model::{Quad, Term};
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;
use serde_json::{Map, Value, json};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// In-process endpoint evaluating page queries over an oxigraph store.
///
/// Answers with the same SPARQL JSON results body a remote endpoint would,
/// so the whole fetch path runs unchanged against local data.
#[derive(Clone)]
pub struct StoreEndpoint {
    store: Store,
}

impl StoreEndpoint {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create an endpoint over an empty in-memory store.
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Store::new().map_err(|e| StoreError::Load(e.to_string()))?;
        Ok(Self::new(store))
    }

    /// Load Turtle data from a reader into a fresh in-memory store.
    pub fn from_turtle(reader: impl Read) -> Result<Self, StoreError> {
        let endpoint = Self::in_memory()?;
        for quad in RdfParser::from_format(RdfFormat::Turtle).for_reader(reader) {
            let quad = quad.map_err(|e| StoreError::Load(e.to_string()))?;
            endpoint.insert(&quad)?;
        }
        Ok(endpoint)
    }

    pub fn from_turtle_file(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_turtle(BufReader::new(file))
    }

    pub fn insert(&self, quad: &Quad) -> Result<(), StoreError> {
        self.store
            .insert(quad)
            .map_err(|e| StoreError::Load(e.to_string()))?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        self.store.len().map_err(|e| StoreError::Load(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl Endpoint for StoreEndpoint {
    fn request(&self, query: &str) -> Result<String, FetchError> {
        let results = SparqlEvaluator::new()
            .parse_query(query)
            .map_err(|e| FetchError::Endpoint(e.to_string()))?
            .on_store(&self.store)
            .execute()
            .map_err(|e| FetchError::Endpoint(e.to_string()))?;

        let QueryResults::Solutions(solutions) = results else {
            return Err(FetchError::Endpoint(
                "query did not produce solutions".to_string(),
            ));
        };

        let vars: Vec<String> = solutions
            .variables()
            .iter()
            .map(|v| v.as_str().to_string())
            .collect();

        let mut bindings = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| FetchError::Endpoint(e.to_string()))?;
            let mut binding = Map::new();
            for (variable, term) in solution.iter() {
                binding.insert(variable.as_str().to_string(), term_to_json(term));
            }
            bindings.push(Value::Object(binding));
        }

        let body = json!({
            "head": { "vars": vars },
            "results": { "bindings": bindings },
        });
        Ok(body.to_string())
    }
}

/// Encode a term the way the SPARQL 1.1 JSON results format does.
fn term_to_json(term: &Term) -> Value {
    match term {
        Term::NamedNode(node) => json!({ "type": "uri", "value": node.as_str() }),
        Term::BlankNode(node) => json!({ "type": "bnode", "value": node.as_str() }),
        Term::Literal(literal) => {
            let mut value = Map::new();
            value.insert("type".into(), "literal".into());
            value.insert("value".into(), literal.value().into());
            if let Some(language) = literal.language() {
                value.insert("xml:lang".into(), language.into());
            } else if literal.datatype() != xsd::STRING {
                value.insert("datatype".into(), literal.datatype().as_str().into());
            }
            Value::Object(value)
        }
        #[allow(unreachable_patterns)]
        other => json!({ "type": "triple", "value": other.to_string() }),
    }
}
