use crate::error::UsageError;
use std::path::Path;

/// Resolve the query text: an inline query wins over a query file.
pub fn resolve_query(query: Option<&str>, file: Option<&Path>) -> Result<String, UsageError> {
    if let Some(query) = query {
        return Ok(query.to_string());
    }
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|source| UsageError::UnreadableFile {
            path: path.to_path_buf(),
            source,
        }),
        None => Err(UsageError::NoQuery),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_inline_query_takes_precedence() {
        let query = resolve_query(Some("SELECT * WHERE { ?s ?p ?o }"), Some(Path::new("missing.rq")));
        assert_eq!(query.unwrap(), "SELECT * WHERE { ?s ?p ?o }");
    }

    #[test]
    fn test_query_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "SELECT ?s WHERE {{ ?s ?p ?o }}").unwrap();

        let query = resolve_query(None, Some(file.path())).unwrap();
        assert_eq!(query, "SELECT ?s WHERE { ?s ?p ?o }");
    }

    #[test]
    fn test_missing_query() {
        assert!(matches!(resolve_query(None, None), Err(UsageError::NoQuery)));
        assert!(matches!(
            resolve_query(None, Some(Path::new("/nonexistent/query.rq"))),
            Err(UsageError::UnreadableFile { .. })
        ));
    }
}
