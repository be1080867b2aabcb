use crate::error::{AnalysisError, Result};
use crate::schema::FinancialAnalysisResult;
use async_trait::async_trait;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{Map, Value};

/// A language model that can answer a prompt with JSON constrained to a schema.
///
/// Implementations are shared across concurrent analyses and must not keep
/// per-request state.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    async fn generate(&self, prompt: &str, response_schema: &Value) -> Result<String>;
}

// Keywords the Gemini `responseSchema` dialect rejects.
const UNSUPPORTED_KEYWORDS: [&str; 6] = [
    "$schema",
    "title",
    "definitions",
    "$defs",
    "additionalProperties",
    "default",
];

/// Builds a self-contained response schema for `T`, with every subschema
/// inlined.
pub fn response_schema_for<T: JsonSchema>() -> Result<Value> {
    let settings = SchemaSettings::openapi3().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let root = settings.into_generator().into_root_schema_for::<T>();

    let mut schema = serde_json::to_value(&root.schema)?;
    sanitize_schema(&mut schema);
    Ok(schema)
}

pub fn analysis_response_schema() -> Result<Value> {
    response_schema_for::<FinancialAnalysisResult>()
}

fn sanitize_schema(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for keyword in UNSUPPORTED_KEYWORDS {
                map.remove(keyword);
            }
            flatten_single_all_of(map);

            for (key, child) in map.iter_mut() {
                if key == "properties" {
                    if let Value::Object(properties) = child {
                        properties.values_mut().for_each(sanitize_schema);
                    }
                } else {
                    sanitize_schema(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sanitize_schema),
        _ => {}
    }
}

fn flatten_single_all_of(map: &mut Map<String, Value>) {
    let single = match map.get("allOf") {
        Some(Value::Array(items)) if items.len() == 1 => items[0].clone(),
        _ => return,
    };
    map.remove("allOf");
    if let Value::Object(inner) = single {
        for (key, value) in inner {
            map.entry(key).or_insert(value);
        }
    }
}

/// Parses model output and validates it strictly against
/// [`FinancialAnalysisResult`].
pub fn parse_analysis_response(text: &str) -> Result<FinancialAnalysisResult> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| AnalysisError::InvalidResponse(format!("response is not JSON: {}", e)))?;

    serde_json::from_value(value)
        .map_err(|e| AnalysisError::InvalidResponse(format!("schema validation failed: {}", e)))
}
