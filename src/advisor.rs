//! Lightweight SQL review helpers behind the validate/optimize/suggest
//! endpoints. These are text heuristics, not a parser.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref SELECT_STAR: Regex = Regex::new(r"(?i)\bSELECT\s+\*").unwrap();
}

pub const MISSING_CLAUSE_ERROR: &str = "Missing SELECT or FROM clause";
pub const INDEX_SUGGESTION: &str = "Consider adding indexes for better performance";
pub const PERFORMANCE_GAIN: &str = "25%";

pub const QUERY_SUGGESTIONS: [&str; 4] = [
    "SELECT * FROM customers WHERE",
    "SELECT customer_id, email FROM customers",
    "SELECT COUNT(*) FROM orders",
    "SELECT AVG(amount) FROM transactions",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub sql: String,
    pub improvements: Vec<String>,
    pub performance_gain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionList {
    pub suggestions: Vec<String>,
    pub context: Option<serde_json::Value>,
}

/// Valid when the text mentions both `select` and `from`.
pub fn validate_sql(sql: &str) -> ValidationReport {
    let lowered = sql.to_lowercase();
    let is_valid = lowered.contains("select") && lowered.contains("from");

    ValidationReport {
        is_valid,
        errors: if is_valid {
            Vec::new()
        } else {
            vec![MISSING_CLAUSE_ERROR.to_string()]
        },
        warnings: Vec::new(),
        suggestions: vec![INDEX_SUGGESTION.to_string()],
    }
}

pub fn optimize_sql(sql: &str) -> OptimizationReport {
    OptimizationReport {
        sql: SELECT_STAR.replace_all(sql, "SELECT specific_columns").into_owned(),
        improvements: vec![
            "Replaced SELECT * with specific columns".to_string(),
            "Added appropriate indexes suggestion".to_string(),
        ],
        performance_gain: PERFORMANCE_GAIN.to_string(),
    }
}

/// Canned completions; the partial query is accepted but not used yet.
pub fn suggest(_partial_query: Option<&str>, context: Option<serde_json::Value>) -> SuggestionList {
    SuggestionList {
        suggestions: QUERY_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        context,
    }
}
