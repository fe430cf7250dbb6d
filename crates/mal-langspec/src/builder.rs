//! Mutable builders for assembling a specification.
//!
//! Builders reference everything by name; nothing is checked until
//! [`Lang::from_builder`](crate::Lang::from_builder) links the whole graph.
//! Adding a named item with a name that is already taken silently replaces
//! the previous item, keeping its position in declaration order.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::association::Multiplicity;
use crate::attack_step::{AttackStepType, Risk};
use crate::ttc::TtcExpression;

/// An unresolved step expression.
///
/// This is also the wire form: the serialized representation of a resolved
/// [`StepExpression`](crate::StepExpression) carries names only, so reading
/// a document yields these and resolution re-links them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StepExprBuilder {
    Field {
        name: String,
    },
    AttackStep {
        name: String,
    },
    Variable {
        name: String,
    },
    Union {
        lhs: Box<StepExprBuilder>,
        rhs: Box<StepExprBuilder>,
    },
    Intersection {
        lhs: Box<StepExprBuilder>,
        rhs: Box<StepExprBuilder>,
    },
    Difference {
        lhs: Box<StepExprBuilder>,
        rhs: Box<StepExprBuilder>,
    },
    Collect {
        lhs: Box<StepExprBuilder>,
        rhs: Box<StepExprBuilder>,
    },
    Transitive {
        step_expression: Box<StepExprBuilder>,
    },
    SubType {
        sub_type: String,
        step_expression: Box<StepExprBuilder>,
    },
}

impl StepExprBuilder {
    pub fn field(name: impl Into<String>) -> Self {
        StepExprBuilder::Field { name: name.into() }
    }

    pub fn attack_step(name: impl Into<String>) -> Self {
        StepExprBuilder::AttackStep { name: name.into() }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        StepExprBuilder::Variable { name: name.into() }
    }

    pub fn union(lhs: StepExprBuilder, rhs: StepExprBuilder) -> Self {
        StepExprBuilder::Union {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn intersection(lhs: StepExprBuilder, rhs: StepExprBuilder) -> Self {
        StepExprBuilder::Intersection {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn difference(lhs: StepExprBuilder, rhs: StepExprBuilder) -> Self {
        StepExprBuilder::Difference {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn collect(lhs: StepExprBuilder, rhs: StepExprBuilder) -> Self {
        StepExprBuilder::Collect {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn transitive(step_expression: StepExprBuilder) -> Self {
        StepExprBuilder::Transitive {
            step_expression: Box::new(step_expression),
        }
    }

    pub fn sub_type(sub_type: impl Into<String>, step_expression: StepExprBuilder) -> Self {
        StepExprBuilder::SubType {
            sub_type: sub_type.into(),
            step_expression: Box::new(step_expression),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryBuilder {
    pub(crate) name: String,
    pub(crate) meta: IndexMap<String, String>,
}

impl CategoryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        CategoryBuilder {
            name: name.into(),
            meta: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct VariableBuilder {
    pub(crate) name: String,
    pub(crate) step_expression: StepExprBuilder,
}

impl VariableBuilder {
    pub fn new(name: impl Into<String>, step_expression: StepExprBuilder) -> Self {
        VariableBuilder {
            name: name.into(),
            step_expression,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn step_expression(&self) -> &StepExprBuilder {
        &self.step_expression
    }
}

/// Builder for a `requires` or `reaches` clause.
#[derive(Debug, Clone)]
pub struct StepsBuilder {
    pub(crate) overrides: bool,
    pub(crate) step_expressions: Vec<StepExprBuilder>,
}

impl StepsBuilder {
    pub fn new(overrides: bool) -> Self {
        StepsBuilder {
            overrides,
            step_expressions: Vec::new(),
        }
    }

    pub fn overrides(&self) -> bool {
        self.overrides
    }

    pub fn step(mut self, step_expression: StepExprBuilder) -> Self {
        self.step_expressions.push(step_expression);
        self
    }
}

#[derive(Debug, Clone)]
pub struct AttackStepBuilder {
    pub(crate) name: String,
    pub(crate) meta: IndexMap<String, String>,
    pub(crate) step_type: AttackStepType,
    pub(crate) tags: IndexSet<String>,
    pub(crate) risk: Option<Risk>,
    pub(crate) ttc: Option<TtcExpression>,
    pub(crate) requires: Option<StepsBuilder>,
    pub(crate) reaches: Option<StepsBuilder>,
}

impl AttackStepBuilder {
    pub fn new(name: impl Into<String>, step_type: AttackStepType) -> Self {
        AttackStepBuilder {
            name: name.into(),
            meta: IndexMap::new(),
            step_type,
            tags: IndexSet::new(),
            risk: None,
            ttc: None,
            requires: None,
            reaches: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn risk(mut self, risk: Risk) -> Self {
        self.risk = Some(risk);
        self
    }

    pub fn ttc(mut self, ttc: TtcExpression) -> Self {
        self.ttc = Some(ttc);
        self
    }

    pub fn requires(mut self, requires: StepsBuilder) -> Self {
        self.requires = Some(requires);
        self
    }

    pub fn reaches(mut self, reaches: StepsBuilder) -> Self {
        self.reaches = Some(reaches);
        self
    }
}

#[derive(Debug, Clone)]
pub struct AssetBuilder {
    pub(crate) name: String,
    pub(crate) meta: IndexMap<String, String>,
    pub(crate) category: String,
    pub(crate) is_abstract: bool,
    pub(crate) super_asset: Option<String>,
    pub(crate) variables: IndexMap<String, VariableBuilder>,
    pub(crate) attack_steps: IndexMap<String, AttackStepBuilder>,
    pub(crate) svg_icon: Option<Vec<u8>>,
    pub(crate) png_icon: Option<Vec<u8>>,
}

impl AssetBuilder {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        AssetBuilder {
            name: name.into(),
            meta: IndexMap::new(),
            category: category.into(),
            is_abstract: false,
            super_asset: None,
            variables: IndexMap::new(),
            attack_steps: IndexMap::new(),
            svg_icon: None,
            png_icon: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn abstract_asset(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn super_asset(mut self, super_asset: impl Into<String>) -> Self {
        self.super_asset = Some(super_asset.into());
        self
    }

    pub fn variable(mut self, variable: VariableBuilder) -> Self {
        self.variables.insert(variable.name.clone(), variable);
        self
    }

    pub fn attack_step(mut self, attack_step: AttackStepBuilder) -> Self {
        self.attack_steps.insert(attack_step.name.clone(), attack_step);
        self
    }

    pub fn svg_icon(mut self, icon: Vec<u8>) -> Self {
        self.svg_icon = Some(icon);
        self
    }

    pub fn png_icon(mut self, icon: Vec<u8>) -> Self {
        self.png_icon = Some(icon);
        self
    }
}

#[derive(Debug, Clone)]
pub struct AssociationBuilder {
    pub(crate) name: String,
    pub(crate) meta: IndexMap<String, String>,
    pub(crate) left_asset: String,
    pub(crate) left_field: String,
    pub(crate) left_multiplicity: Multiplicity,
    pub(crate) right_asset: String,
    pub(crate) right_field: String,
    pub(crate) right_multiplicity: Multiplicity,
}

impl AssociationBuilder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        left_asset: impl Into<String>,
        left_field: impl Into<String>,
        left_multiplicity: Multiplicity,
        right_asset: impl Into<String>,
        right_field: impl Into<String>,
        right_multiplicity: Multiplicity,
    ) -> Self {
        AssociationBuilder {
            name: name.into(),
            meta: IndexMap::new(),
            left_asset: left_asset.into(),
            left_field: left_field.into(),
            left_multiplicity,
            right_asset: right_asset.into(),
            right_field: right_field.into(),
            right_multiplicity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Top-level builder for a whole specification.
#[derive(Debug, Clone, Default)]
pub struct LangBuilder {
    pub(crate) defines: IndexMap<String, String>,
    pub(crate) categories: IndexMap<String, CategoryBuilder>,
    pub(crate) assets: IndexMap<String, AssetBuilder>,
    pub(crate) associations: Vec<AssociationBuilder>,
    pub(crate) license: Option<String>,
    pub(crate) notice: Option<String>,
}

impl LangBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.insert(key.into(), value.into());
        self
    }

    pub fn category(mut self, category: CategoryBuilder) -> Self {
        self.categories.insert(category.name.clone(), category);
        self
    }

    pub fn asset(mut self, asset: AssetBuilder) -> Self {
        self.assets.insert(asset.name.clone(), asset);
        self
    }

    pub fn association(mut self, association: AssociationBuilder) -> Self {
        self.associations.push(association);
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_a_duplicate_name_replaces_in_place() {
        let builder = LangBuilder::new()
            .category(CategoryBuilder::new("System").meta("en", "first"))
            .category(CategoryBuilder::new("Networking"))
            .category(CategoryBuilder::new("System").meta("en", "second"));

        let names: Vec<&str> = builder.categories.keys().map(String::as_str).collect();
        assert_eq!(names, ["System", "Networking"]);
        assert_eq!(builder.categories["System"].meta["en"], "second");
    }

    #[test]
    fn step_expr_wire_form_uses_camel_case_tags() {
        let expr = StepExprBuilder::collect(
            StepExprBuilder::field("hosts"),
            StepExprBuilder::sub_type(
                "Server",
                StepExprBuilder::transitive(StepExprBuilder::field("peers")),
            ),
        );
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "collect",
                "lhs": {"type": "field", "name": "hosts"},
                "rhs": {
                    "type": "subType",
                    "subType": "Server",
                    "stepExpression": {
                        "type": "transitive",
                        "stepExpression": {"type": "field", "name": "peers"},
                    },
                },
            })
        );
        let back: StepExprBuilder = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }
}
