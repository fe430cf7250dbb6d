//! Schema validation of `langspec.json`.

use crate::error::MarError;

/// The JSON schema every `langspec.json` must satisfy. Its `formatVersion`
/// const is the version this crate reads and writes.
pub const LANGSPEC_SCHEMA: &str = include_str!("langspec.schema.json");

pub(crate) fn validate(document: &serde_json::Value) -> Result<(), MarError> {
    let schema: serde_json::Value =
        serde_json::from_str(LANGSPEC_SCHEMA).map_err(|_| MarError::SchemaCompile)?;
    let validator = jsonschema::options()
        .build(&schema)
        .map_err(|_| MarError::SchemaCompile)?;
    if validator.is_valid(document) {
        Ok(())
    } else {
        Err(MarError::LangspecValidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_version_matches_the_emitted_one() {
        let schema: serde_json::Value = serde_json::from_str(LANGSPEC_SCHEMA).unwrap();
        assert_eq!(
            schema["properties"]["formatVersion"]["const"],
            serde_json::json!(mal_langspec::doc::FORMAT_VERSION)
        );
    }

    #[test]
    fn minimal_document_validates() {
        let document = serde_json::json!({
            "formatVersion": "1.0.0",
            "defines": {"id": "org.example.empty", "version": "0.0.1"},
            "categories": [],
            "assets": [],
            "associations": [],
        });
        validate(&document).unwrap();
    }

    #[test]
    fn missing_defines_are_rejected() {
        let document = serde_json::json!({
            "formatVersion": "1.0.0",
            "defines": {"id": "org.example.empty"},
            "categories": [],
            "assets": [],
            "associations": [],
        });
        assert!(matches!(
            validate(&document),
            Err(MarError::LangspecValidate)
        ));
    }

    #[test]
    fn wrong_format_version_is_rejected() {
        let document = serde_json::json!({
            "formatVersion": "2.0.0",
            "defines": {"id": "org.example.empty", "version": "0.0.1"},
            "categories": [],
            "assets": [],
            "associations": [],
        });
        assert!(matches!(
            validate(&document),
            Err(MarError::LangspecValidate)
        ));
    }
}
