//! Building blocks for the hand-written OpenAPI fragments modules return.

use serde_json::{json, Value};

fn schema_ref(schema: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{schema}") })
}

pub fn doc_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": schema_ref(schema) } }
    })
}

pub fn doc_response(description: &str, schema: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema_ref(schema) } }
    })
}

/// Array of `schema` items.
pub fn doc_list(description: &str, schema: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "type": "array", "items": schema_ref(schema) }
            }
        }
    })
}

pub fn doc_error(description: &str) -> Value {
    doc_response(description, "ErrorResponse")
}

/// Required string path parameter.
pub fn doc_path_param(name: &str) -> Value {
    json!({
        "name": name,
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_responses_point_at_shared_schema() {
        let doc = doc_error("Book not found");
        assert_eq!(doc["description"], "Book not found");
        assert_eq!(
            doc["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/ErrorResponse"
        );
    }

    #[test]
    fn lists_wrap_items() {
        let doc = doc_list("Books", "Book");
        let schema = &doc["content"]["application/json"]["schema"];
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["items"]["$ref"], "#/components/schemas/Book");
    }
}
