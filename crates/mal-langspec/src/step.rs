//! Resolved step expressions.
//!
//! A step expression describes how an attack traverses the model: along
//! fields, into attack steps, through set operators. Every node is resolved
//! against the asset hierarchy when the specification is built, so each node
//! knows both the asset it is evaluated from and the asset type its result
//! is guaranteed to be an instance of.

use crate::asset::AssetId;
use crate::association::FieldId;

/// A step expression node, annotated with its source and target assets.
#[derive(Debug, Clone)]
pub struct StepExpression {
    pub(crate) source: AssetId,
    pub(crate) target: AssetId,
    pub(crate) kind: StepKind,
}

impl StepExpression {
    /// The asset this expression is evaluated from.
    pub fn source_asset(&self) -> AssetId {
        self.source
    }

    /// The statically inferred type of the expression's result set.
    pub fn target_asset(&self) -> AssetId {
        self.target
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }
}

/// The shape of a [`StepExpression`] node.
#[derive(Debug, Clone)]
pub enum StepKind {
    /// Navigation along an association field of the source asset.
    Field(FieldId),
    /// Reference to an attack step visible on the source asset. `asset` is
    /// the asset the step was looked up on.
    AttackStep { asset: AssetId, name: String },
    /// Reference to a variable visible on the source asset. `asset` is the
    /// asset the variable was looked up on; the expression's target is the
    /// variable's own pre-computed target.
    Variable { asset: AssetId, name: String },
    /// Set union of two branches sharing a source. The target is the least
    /// upper bound of the branch targets.
    Union {
        lhs: Box<StepExpression>,
        rhs: Box<StepExpression>,
    },
    Intersection {
        lhs: Box<StepExpression>,
        rhs: Box<StepExpression>,
    },
    Difference {
        lhs: Box<StepExpression>,
        rhs: Box<StepExpression>,
    },
    /// Chained navigation: `rhs` is evaluated with `lhs`'s target as its
    /// source, and supplies the overall target.
    Collect {
        lhs: Box<StepExpression>,
        rhs: Box<StepExpression>,
    },
    /// Zero-or-more repetitions of an expression whose source and target
    /// types coincide; the result stays typed at the source asset.
    Transitive(Box<StepExpression>),
    /// Narrows the operand's result set to instances of `sub_type`.
    SubType {
        sub_type: AssetId,
        operand: Box<StepExpression>,
    },
}
