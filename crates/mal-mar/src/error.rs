//! Errors from reading and writing `.mar` archives.

use mal_langspec::LangError;

#[derive(Debug, thiserror::Error)]
pub enum MarError {
    /// The archive carries no `langspec.json` entry. Unreadable or non-zip
    /// input surfaces here too, as it yields no entries at all.
    #[error("File \"langspec.json\" not found")]
    LangspecNotFound,

    #[error("Failed to parse \"langspec.json\"")]
    LangspecParse,

    #[error("Failed to validate \"langspec.json\"")]
    LangspecValidate,

    #[error("Failed to compile \"langspec.schema.json\"")]
    SchemaCompile,

    /// A one-shot method was called twice, or after `close`.
    #[error("{method} method is already called")]
    Sequencing { method: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Lang(#[from] LangError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_archive_member() {
        assert_eq!(
            MarError::LangspecNotFound.to_string(),
            "File \"langspec.json\" not found"
        );
        assert_eq!(
            MarError::Sequencing { method: "read" }.to_string(),
            "read method is already called"
        );
    }
}
