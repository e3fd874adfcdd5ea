#![warn(missing_docs)]
//! # threat-scope-contract-tests
//!
//! Validates report contract fixtures against the frozen JSON schemas under
//! the workspace `contracts/` directory. Helpers live here; the assertions
//! live in `tests/`.

use jsonschema::JSONSchema;
use serde_json::Value;

/// Loads and parses a JSON document from disk.
///
/// # Panics
/// Panics on unreadable or invalid files; contract fixtures are repo-owned.
pub fn load_json(path: &str) -> Value {
    let raw = std::fs::read_to_string(path).expect("json file should be readable");
    serde_json::from_str(&raw).expect("json file should be valid")
}

/// Compiles a frozen schema into a validator.
///
/// # Panics
/// Panics when the schema itself does not compile.
pub fn compile_validator(schema_path: &str) -> JSONSchema {
    let schema = load_json(schema_path);
    JSONSchema::compile(&schema).expect("schema should compile")
}
