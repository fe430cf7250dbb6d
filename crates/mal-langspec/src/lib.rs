//! Data model for compiled MAL (Meta Attack Language) language
//! specifications.
//!
//! A specification is assembled through the builder layer ([`LangBuilder`]
//! and friends), where everything is referenced by name, and then resolved
//! in one shot into an immutable [`Lang`] whose cross-references are typed
//! handles. Resolution links the asset hierarchy, pairs association fields,
//! infers the target type of every step expression, and rejects dangling
//! names, invalid identifiers, and cyclic definitions.
//!
//! The [`doc`] module holds the serialized document form; the `.mar`
//! archive container around it lives in the `mal-mar` crate.

pub mod doc;

mod asset;
mod association;
mod attack_step;
mod builder;
mod category;
mod error;
mod ident;
mod lang;
mod meta;
mod resolve;
mod step;
mod ttc;

pub use asset::{Asset, AssetId, Variable};
pub use association::{Association, AssociationId, Field, FieldId, Multiplicity};
pub use attack_step::{AttackStep, AttackStepType, Risk, Steps};
pub use builder::{
    AssetBuilder, AssociationBuilder, AttackStepBuilder, CategoryBuilder, LangBuilder,
    StepExprBuilder, StepsBuilder, VariableBuilder,
};
pub use category::{Category, CategoryId};
pub use error::LangError;
pub use ident::is_identifier;
pub use lang::Lang;
pub use meta::Meta;
pub use step::{StepExpression, StepKind};
pub use ttc::{TtcDistribution, TtcError, TtcExpression, MEAN_TTC_INFINITY};
