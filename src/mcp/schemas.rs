//! JSON schema builders for MCP tools.

use crate::mcp::handlers::summarize::SummarizePdfToolRequest;
use schemars::schema_for;
use serde_json::{Map, Value};

/// Schema describing the `summarize-pdf` tool input, derived from the request type.
pub(crate) fn summarize_pdf_input_schema() -> Map<String, Value> {
    match serde_json::to_value(schema_for!(SummarizePdfToolRequest)) {
        Ok(Value::Object(mut schema)) => {
            schema.remove("$schema");
            schema.remove("title");
            schema
        }
        _ => {
            let mut properties = Map::new();
            properties.insert("path".into(), string_schema("Path to a PDF on the server"));
            properties.insert(
                "source".into(),
                string_schema("Optional label for the report; defaults to the file name"),
            );
            finalize_object_schema(properties, &["path"])
        }
    }
}

/// Schema for tools without arguments.
pub(crate) fn empty_object_schema() -> Map<String, Value> {
    finalize_object_schema(Map::new(), &[])
}

fn string_schema(description: &str) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("string".into()));
    schema.insert("description".into(), Value::String(description.into()));
    Value::Object(schema)
}

fn finalize_object_schema(properties: Map<String, Value>, required: &[&str]) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert(
            "required".into(),
            Value::Array(
                required
                    .iter()
                    .map(|&key| Value::String(key.into()))
                    .collect(),
            ),
        );
    }
    schema.insert("additionalProperties".into(), Value::Bool(false));
    schema
}
