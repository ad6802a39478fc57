//! Schema description and its prompt rendering
//!
//! The operator supplies the schema as JSON:
//!
//! ```json
//! {"tables": {"users": {"columns": {"id": "integer"}, "relationships": ["..."]}}}
//! ```
//!
//! Table and column order follow the document.

use crate::error::{Result, SqlGenError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Returned in place of a schema block when the document cannot be read.
/// Generation still proceeds with it.
pub const SCHEMA_FORMAT_ERROR: &str = "Schema format error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescription {
    pub columns: IndexMap<String, String>,
    #[serde(default)]
    pub relationships: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub tables: IndexMap<String, TableDescription>,
}

impl SchemaDescription {
    pub fn parse(raw: &str) -> Result<Self> {
        let schema: SchemaDescription = serde_json::from_str(raw)?;
        schema.check_names()?;
        Ok(schema)
    }

    fn check_names(&self) -> Result<()> {
        for (table, info) in &self.tables {
            if table.trim().is_empty() {
                return Err(SqlGenError::Input("table name must not be empty".to_string()));
            }
            if info.columns.keys().any(|c| c.trim().is_empty()) {
                return Err(SqlGenError::Input(format!(
                    "table '{}' has a column with an empty name",
                    table
                )));
            }
        }
        Ok(())
    }

    pub fn to_prompt_text(&self) -> String {
        let mut out = String::new();
        for (table, info) in &self.tables {
            out.push_str(&format!("\nTable: {}\n", table));
            out.push_str("Columns:\n");
            for (column, ty) in &info.columns {
                out.push_str(&format!("  - {}: {}\n", column, ty));
            }
            if !info.relationships.is_empty() {
                out.push_str("Relationships:\n");
                for rel in &info.relationships {
                    out.push_str(&format!("  - {}\n", rel));
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Render a raw schema document for a prompt. Never fails: unreadable input
/// becomes [`SCHEMA_FORMAT_ERROR`].
pub fn format_schema(raw: &str) -> String {
    match SchemaDescription::parse(raw) {
        Ok(schema) => schema.to_prompt_text(),
        Err(e) => {
            error!(error = %e, "Error formatting schema");
            SCHEMA_FORMAT_ERROR.to_string()
        }
    }
}
