//! Graph documents: the instance placements a session is built from.

use crate::config::SessionConfig;
use parkmyst_core::InstanceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Failed to read graph file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse graph document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A serialised puzzle graph.
///
/// ```json
/// {
///   "session": { "reentry": "coalesce" },
///   "components": [
///     { "id": 1, "type": "StartNode", "nextComponents": [2] },
///     { "id": 2, "type": "EndNode" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub session: SessionConfig,
    pub components: Vec<InstanceConfig>,
}

impl GraphDocument {
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkmyst_core::InstanceId;

    #[test]
    fn test_parse_document() {
        let doc = GraphDocument::from_json_str(
            r#"{
                "components": [
                    { "id": 1, "type": "StartNode", "nextComponents": [2, -1] },
                    { "id": 2, "type": "HtmlMessage", "nextComponents": 3, "data": { "message": "hi" } },
                    { "id": 3, "type": "EndNode" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.components.len(), 3);
        assert_eq!(doc.session, SessionConfig::default());
        assert_eq!(
            doc.components[0].next_components.targets().collect::<Vec<_>>(),
            vec![InstanceId::new(2)]
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            GraphDocument::from_json_str(r#"{"components": [{"id": -3, "type": "X"}]}"#),
            Err(GraphError::Json(_))
        ));
        assert!(matches!(
            GraphDocument::from_path("/nonexistent/graph.json"),
            Err(GraphError::Io { .. })
        ));
    }
}
