//! The serialized document form of a specification.
//!
//! These types mirror the `langspec.json` layout exactly; field order here
//! is emission order. A [`Lang`] flattens into a [`LangDoc`] by writing each
//! asset's local declarations, and a document converts back into a
//! [`LangBuilder`] that resolution re-links, so a build/serialize/rebuild
//! cycle is lossless.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::asset::Variable;
use crate::association::Multiplicity;
use crate::attack_step::{AttackStep, AttackStepType, Risk, Steps};
use crate::builder::{
    AssetBuilder, AssociationBuilder, AttackStepBuilder, CategoryBuilder, LangBuilder,
    StepExprBuilder, StepsBuilder, VariableBuilder,
};
use crate::error::LangError;
use crate::lang::Lang;
use crate::step::{StepExpression, StepKind};
use crate::ttc::TtcExpression;

/// The document format version emitted by [`Lang::to_doc`].
pub const FORMAT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LangDoc {
    pub format_version: String,
    pub defines: IndexMap<String, String>,
    pub categories: Vec<CategoryDoc>,
    pub assets: Vec<AssetDoc>,
    pub associations: Vec<AssociationDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDoc {
    pub name: String,
    pub meta: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDoc {
    pub name: String,
    pub meta: IndexMap<String, String>,
    pub category: String,
    pub is_abstract: bool,
    pub super_asset: Option<String>,
    pub variables: Vec<VariableDoc>,
    pub attack_steps: Vec<AttackStepDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDoc {
    pub name: String,
    pub step_expression: StepExprBuilder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackStepDoc {
    pub name: String,
    pub meta: IndexMap<String, String>,
    #[serde(rename = "type")]
    pub step_type: AttackStepType,
    pub tags: Vec<String>,
    pub risk: Option<Risk>,
    pub ttc: Option<TtcExpression>,
    pub requires: Option<StepsDoc>,
    pub reaches: Option<StepsDoc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepsDoc {
    pub overrides: bool,
    pub step_expressions: Vec<StepExprBuilder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplicityDoc {
    pub min: u64,
    pub max: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationDoc {
    pub name: String,
    pub meta: IndexMap<String, String>,
    pub left_asset: String,
    pub left_field: String,
    pub left_multiplicity: MultiplicityDoc,
    pub right_asset: String,
    pub right_field: String,
    pub right_multiplicity: MultiplicityDoc,
}

impl From<Multiplicity> for MultiplicityDoc {
    fn from(multiplicity: Multiplicity) -> Self {
        MultiplicityDoc {
            min: multiplicity.min(),
            max: multiplicity.max(),
        }
    }
}

impl TryFrom<MultiplicityDoc> for Multiplicity {
    type Error = LangError;

    fn try_from(doc: MultiplicityDoc) -> Result<Self, Self::Error> {
        Multiplicity::from_min_max(doc.min, doc.max)
    }
}

impl Lang {
    /// Flattens this specification into its document form.
    pub fn to_doc(&self) -> LangDoc {
        LangDoc {
            format_version: FORMAT_VERSION.to_owned(),
            defines: self.defines.clone(),
            categories: self
                .categories
                .iter()
                .map(|category| CategoryDoc {
                    name: category.name().to_owned(),
                    meta: category.meta().entries().clone(),
                })
                .collect(),
            assets: self.assets.iter().map(|asset| self.asset_doc(asset.id())).collect(),
            associations: self
                .associations
                .iter()
                .map(|association| {
                    let left_field = self.field(association.left_field());
                    let right_field = self.field(association.right_field());
                    AssociationDoc {
                        name: association.name().to_owned(),
                        meta: association.meta().entries().clone(),
                        left_asset: self.asset(right_field.asset()).name().to_owned(),
                        left_field: left_field.name().to_owned(),
                        left_multiplicity: left_field.multiplicity().into(),
                        right_asset: self.asset(left_field.asset()).name().to_owned(),
                        right_field: right_field.name().to_owned(),
                        right_multiplicity: right_field.multiplicity().into(),
                    }
                })
                .collect(),
        }
    }

    fn asset_doc(&self, id: crate::asset::AssetId) -> AssetDoc {
        let asset = self.asset(id);
        AssetDoc {
            name: asset.name().to_owned(),
            meta: asset.meta().entries().clone(),
            category: self.category(asset.category()).name().to_owned(),
            is_abstract: asset.is_abstract(),
            super_asset: asset
                .super_asset()
                .map(|super_asset| self.asset(super_asset).name().to_owned()),
            variables: asset
                .local_variables()
                .iter()
                .map(|variable| self.variable_doc(variable))
                .collect(),
            attack_steps: asset
                .local_attack_steps()
                .iter()
                .map(|step| self.attack_step_doc(step))
                .collect(),
        }
    }

    fn variable_doc(&self, variable: &Variable) -> VariableDoc {
        VariableDoc {
            name: variable.name().to_owned(),
            step_expression: self.step_doc(variable.step_expression()),
        }
    }

    fn attack_step_doc(&self, step: &AttackStep) -> AttackStepDoc {
        AttackStepDoc {
            name: step.name().to_owned(),
            meta: step.meta().entries().clone(),
            step_type: step.step_type(),
            tags: step.local_tags().map(str::to_owned).collect(),
            risk: step.local_risk().copied(),
            ttc: step.local_ttc().cloned(),
            requires: step.local_requires().map(|steps| self.steps_doc(steps)),
            reaches: step.local_reaches().map(|steps| self.steps_doc(steps)),
        }
    }

    fn steps_doc(&self, steps: &Steps) -> StepsDoc {
        StepsDoc {
            overrides: steps.overrides(),
            step_expressions: steps
                .step_expressions()
                .iter()
                .map(|expression| self.step_doc(expression))
                .collect(),
        }
    }

    fn step_doc(&self, expression: &StepExpression) -> StepExprBuilder {
        match expression.kind() {
            StepKind::Field(field) => StepExprBuilder::field(self.field(*field).name()),
            StepKind::AttackStep { name, .. } => StepExprBuilder::attack_step(name.clone()),
            StepKind::Variable { name, .. } => StepExprBuilder::variable(name.clone()),
            StepKind::Union { lhs, rhs } => {
                StepExprBuilder::union(self.step_doc(lhs), self.step_doc(rhs))
            }
            StepKind::Intersection { lhs, rhs } => {
                StepExprBuilder::intersection(self.step_doc(lhs), self.step_doc(rhs))
            }
            StepKind::Difference { lhs, rhs } => {
                StepExprBuilder::difference(self.step_doc(lhs), self.step_doc(rhs))
            }
            StepKind::Collect { lhs, rhs } => {
                StepExprBuilder::collect(self.step_doc(lhs), self.step_doc(rhs))
            }
            StepKind::Transitive(operand) => StepExprBuilder::transitive(self.step_doc(operand)),
            StepKind::SubType { sub_type, operand } => StepExprBuilder::sub_type(
                self.asset(*sub_type).name(),
                self.step_doc(operand),
            ),
        }
    }
}

impl LangBuilder {
    /// Converts a document back into builders, attaching any icons found in
    /// the given maps by asset name. Nothing is resolved yet; pass the
    /// result to [`Lang::from_builder`].
    pub fn from_doc(
        doc: LangDoc,
        svg_icons: &HashMap<String, Vec<u8>>,
        png_icons: &HashMap<String, Vec<u8>>,
    ) -> Result<Self, LangError> {
        let mut builder = LangBuilder::new();
        builder.defines = doc.defines;
        for category in doc.categories {
            let mut category_builder = CategoryBuilder::new(category.name);
            category_builder.meta = category.meta;
            builder = builder.category(category_builder);
        }
        for asset in doc.assets {
            let mut asset_builder = AssetBuilder::new(asset.name, asset.category)
                .abstract_asset(asset.is_abstract);
            asset_builder.meta = asset.meta;
            if let Some(super_asset) = asset.super_asset {
                asset_builder = asset_builder.super_asset(super_asset);
            }
            for variable in asset.variables {
                asset_builder = asset_builder
                    .variable(VariableBuilder::new(variable.name, variable.step_expression));
            }
            for step in asset.attack_steps {
                let mut step_builder = AttackStepBuilder::new(step.name, step.step_type);
                step_builder.meta = step.meta;
                step_builder.tags = step.tags.into_iter().collect();
                step_builder.risk = step.risk;
                step_builder.ttc = step.ttc;
                step_builder.requires = step.requires.map(steps_builder);
                step_builder.reaches = step.reaches.map(steps_builder);
                asset_builder = asset_builder.attack_step(step_builder);
            }
            if let Some(icon) = svg_icons.get(asset_builder.name()) {
                asset_builder = asset_builder.svg_icon(icon.clone());
            }
            if let Some(icon) = png_icons.get(asset_builder.name()) {
                asset_builder = asset_builder.png_icon(icon.clone());
            }
            builder = builder.asset(asset_builder);
        }
        for association in doc.associations {
            let mut association_builder = AssociationBuilder::new(
                association.name,
                association.left_asset,
                association.left_field,
                association.left_multiplicity.try_into()?,
                association.right_asset,
                association.right_field,
                association.right_multiplicity.try_into()?,
            );
            association_builder.meta = association.meta;
            builder = builder.association(association_builder);
        }
        Ok(builder)
    }
}

fn steps_builder(doc: StepsDoc) -> StepsBuilder {
    let mut builder = StepsBuilder::new(doc.overrides);
    builder.step_expressions = doc.step_expressions;
    builder
}
