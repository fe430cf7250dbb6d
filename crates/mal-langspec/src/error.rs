//! Error types for the language specification model.

use crate::ttc::TtcError;

/// Errors from lookups, builder resolution, and document conversion.
///
/// Lookup variants (`*NotFound`) are caller-preventable: every keyed getter
/// has a matching `has_*` predicate. The remaining variants are construction
/// errors raised while resolving a builder graph; they abort the whole
/// resolution rather than producing a partially linked specification.
#[derive(Debug, thiserror::Error)]
pub enum LangError {
    #[error("Define \"{0}\" not found")]
    DefineNotFound(String),

    #[error("Category \"{0}\" not found")]
    CategoryNotFound(String),

    #[error("Asset \"{0}\" not found")]
    AssetNotFound(String),

    #[error("Local field \"{0}\" not found")]
    LocalFieldNotFound(String),

    #[error("Field \"{0}\" not found")]
    FieldNotFound(String),

    #[error("Local variable \"{0}\" not found")]
    LocalVariableNotFound(String),

    #[error("Variable \"{0}\" not found")]
    VariableNotFound(String),

    #[error("Local attack step \"{0}\" not found")]
    LocalAttackStepNotFound(String),

    #[error("Attack step \"{0}\" not found")]
    AttackStepNotFound(String),

    #[error("Entry \"{0}\" not found")]
    EntryNotFound(String),

    #[error("\"{0}\" is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("Invalid multiplicity {{min = {min}, max = {max}}}")]
    InvalidMultiplicity { min: u64, max: String },

    #[error("Assets \"{lhs}\" and \"{rhs}\" have no common ancestor")]
    NoCommonAncestor { lhs: String, rhs: String },

    #[error("Variable \"{asset}.{name}\" is cyclically defined")]
    CyclicVariable { asset: String, name: String },

    #[error("Asset \"{0}\" is part of an inheritance cycle")]
    CyclicInheritance(String),

    #[error("Attack step type \"{0}\" not found")]
    AttackStepTypeNotFound(String),

    #[error("TTC distribution \"{0}\" not found")]
    TtcDistributionNotFound(String),

    #[error(transparent)]
    Ttc(#[from] TtcError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_messages_are_exact() {
        assert_eq!(
            LangError::AssetNotFound("Host".into()).to_string(),
            "Asset \"Host\" not found"
        );
        assert_eq!(
            LangError::LocalAttackStepNotFound("compromise".into()).to_string(),
            "Local attack step \"compromise\" not found"
        );
        assert_eq!(
            LangError::InvalidIdentifier("3kemal".into()).to_string(),
            "\"3kemal\" is not a valid identifier"
        );
    }

    #[test]
    fn link_messages_are_exact() {
        assert_eq!(
            LangError::InvalidMultiplicity {
                min: 2,
                max: "1".into()
            }
            .to_string(),
            "Invalid multiplicity {min = 2, max = 1}"
        );
        assert_eq!(
            LangError::CyclicVariable {
                asset: "Host".into(),
                name: "others".into()
            }
            .to_string(),
            "Variable \"Host.others\" is cyclically defined"
        );
    }
}
