//! Builder resolution.
//!
//! Linking happens in passes: categories first, then asset shells and super
//! links, then association fields, then variable targets, and finally the
//! step expressions of variables and attack steps. Later passes only depend
//! on structures the earlier passes completed, so every name lookup during
//! materialization sees the whole hierarchy.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::asset::{Asset, AssetId, Variable};
use crate::association::{Association, AssociationId, Field, FieldId};
use crate::attack_step::{AttackStep, Steps};
use crate::builder::{
    AssetBuilder, AttackStepBuilder, LangBuilder, StepExprBuilder, StepsBuilder, VariableBuilder,
};
use crate::category::{Category, CategoryId};
use crate::error::LangError;
use crate::ident::require_identifier;
use crate::lang::Lang;
use crate::meta::Meta;
use crate::step::{StepExpression, StepKind};

pub(crate) fn resolve(builder: &LangBuilder) -> Result<Lang, LangError> {
    validate_identifiers(builder)?;

    let mut resolver = Resolver::new(builder);
    resolver.link_categories()?;
    resolver.link_shells()?;
    resolver.link_fields()?;
    resolver.compute_variable_targets()?;
    resolver.materialize()
}

fn validate_identifiers(builder: &LangBuilder) -> Result<(), LangError> {
    for key in builder.defines.keys() {
        require_identifier(key)?;
    }
    for category in builder.categories.values() {
        require_identifier(&category.name)?;
        require_meta_keys(&category.meta)?;
    }
    for asset in builder.assets.values() {
        require_identifier(&asset.name)?;
        require_meta_keys(&asset.meta)?;
        for variable in asset.variables.values() {
            require_identifier(&variable.name)?;
        }
        for step in asset.attack_steps.values() {
            require_identifier(&step.name)?;
            require_meta_keys(&step.meta)?;
            for tag in &step.tags {
                require_identifier(tag)?;
            }
        }
    }
    for association in &builder.associations {
        require_identifier(&association.name)?;
        require_identifier(&association.left_field)?;
        require_identifier(&association.right_field)?;
        require_meta_keys(&association.meta)?;
    }
    Ok(())
}

fn require_meta_keys(meta: &IndexMap<String, String>) -> Result<(), LangError> {
    for key in meta.keys() {
        require_identifier(key)?;
    }
    Ok(())
}

/// An asset under construction: links resolved, contents not yet built.
struct Shell {
    name: String,
    category: CategoryId,
    super_asset: Option<AssetId>,
    fields: Vec<FieldId>,
}

#[derive(Clone, Copy)]
enum VarTarget {
    InProgress,
    Done(AssetId),
}

struct Resolver<'a> {
    builder: &'a LangBuilder,
    categories: Vec<Category>,
    category_ids: HashMap<String, CategoryId>,
    shells: Vec<Shell>,
    asset_builders: Vec<&'a AssetBuilder>,
    asset_ids: HashMap<String, AssetId>,
    fields: Vec<Field>,
    associations: Vec<Association>,
    variable_targets: HashMap<(usize, &'a str), VarTarget>,
}

impl<'a> Resolver<'a> {
    fn new(builder: &'a LangBuilder) -> Self {
        Resolver {
            builder,
            categories: Vec::new(),
            category_ids: HashMap::new(),
            shells: Vec::new(),
            asset_builders: Vec::new(),
            asset_ids: HashMap::new(),
            fields: Vec::new(),
            associations: Vec::new(),
            variable_targets: HashMap::new(),
        }
    }

    fn link_categories(&mut self) -> Result<(), LangError> {
        let builder = self.builder;
        for (index, category) in builder.categories.values().enumerate() {
            let id = CategoryId(index);
            self.categories.push(Category {
                id,
                name: category.name.clone(),
                meta: Meta::new(category.meta.clone()),
                assets: Vec::new(),
            });
            self.category_ids.insert(category.name.clone(), id);
        }
        Ok(())
    }

    fn link_shells(&mut self) -> Result<(), LangError> {
        let builder = self.builder;
        for (index, asset) in builder.assets.values().enumerate() {
            self.asset_ids.insert(asset.name.clone(), AssetId(index));
        }
        for asset in builder.assets.values() {
            let category = self
                .category_ids
                .get(&asset.category)
                .copied()
                .ok_or_else(|| LangError::CategoryNotFound(asset.category.clone()))?;
            let super_asset = match &asset.super_asset {
                Some(name) => Some(
                    self.asset_ids
                        .get(name)
                        .copied()
                        .ok_or_else(|| LangError::AssetNotFound(name.clone()))?,
                ),
                None => None,
            };
            let id = AssetId(self.shells.len());
            self.categories[category.0].assets.push(id);
            self.shells.push(Shell {
                name: asset.name.clone(),
                category,
                super_asset,
                fields: Vec::new(),
            });
            self.asset_builders.push(asset);
        }

        // A super chain longer than the asset count must revisit an asset.
        for (index, shell) in self.shells.iter().enumerate() {
            let mut current = shell.super_asset;
            let mut steps = 0;
            while let Some(id) = current {
                steps += 1;
                if steps > self.shells.len() {
                    return Err(LangError::CyclicInheritance(self.shells[index].name.clone()));
                }
                current = self.shells[id.0].super_asset;
            }
        }
        Ok(())
    }

    fn link_fields(&mut self) -> Result<(), LangError> {
        let builder = self.builder;
        for association in &builder.associations {
            let left_asset = self
                .asset_ids
                .get(&association.left_asset)
                .copied()
                .ok_or_else(|| LangError::AssetNotFound(association.left_asset.clone()))?;
            let right_asset = self
                .asset_ids
                .get(&association.right_asset)
                .copied()
                .ok_or_else(|| LangError::AssetNotFound(association.right_asset.clone()))?;

            let association_id = AssociationId(self.associations.len());
            let left_id = FieldId(self.fields.len());
            let right_id = FieldId(self.fields.len() + 1);

            // The field named on the left side hangs off the right-hand
            // asset and navigates back to the left-hand one.
            self.fields.push(Field {
                id: left_id,
                name: association.left_field.clone(),
                asset: right_asset,
                multiplicity: association.left_multiplicity,
                target: right_id,
                association: association_id,
            });
            self.fields.push(Field {
                id: right_id,
                name: association.right_field.clone(),
                asset: left_asset,
                multiplicity: association.right_multiplicity,
                target: left_id,
                association: association_id,
            });
            self.shells[right_asset.0].fields.push(left_id);
            self.shells[left_asset.0].fields.push(right_id);
            self.associations.push(Association {
                id: association_id,
                name: association.name.clone(),
                meta: Meta::new(association.meta.clone()),
                left_field: left_id,
                right_field: right_id,
            });
        }
        Ok(())
    }

    fn compute_variable_targets(&mut self) -> Result<(), LangError> {
        for index in 0..self.shells.len() {
            let asset_builder = self.asset_builders[index];
            for variable in asset_builder.variables.values() {
                self.variable_target(AssetId(index), &variable.name)?;
            }
        }
        Ok(())
    }

    /// The target of the variable declared on `declaring`, evaluated with
    /// the declaring asset as source. Memoized; a variable re-entered while
    /// its own target is still being computed is cyclic.
    fn variable_target(&mut self, declaring: AssetId, name: &'a str) -> Result<AssetId, LangError> {
        match self.variable_targets.get(&(declaring.0, name)) {
            Some(VarTarget::Done(target)) => return Ok(*target),
            Some(VarTarget::InProgress) => {
                return Err(LangError::CyclicVariable {
                    asset: self.shells[declaring.0].name.clone(),
                    name: name.to_owned(),
                })
            }
            None => {}
        }
        self.variable_targets
            .insert((declaring.0, name), VarTarget::InProgress);
        let asset_builder = self.asset_builders[declaring.0];
        let expression = &asset_builder.variables[name].step_expression;
        let target = self.target_of(expression, declaring)?;
        self.variable_targets
            .insert((declaring.0, name), VarTarget::Done(target));
        Ok(target)
    }

    fn target_of(
        &mut self,
        expression: &'a StepExprBuilder,
        source: AssetId,
    ) -> Result<AssetId, LangError> {
        Ok(self.materialize_step(expression, source)?.target)
    }

    fn materialize_step(
        &mut self,
        expression: &'a StepExprBuilder,
        source: AssetId,
    ) -> Result<StepExpression, LangError> {
        match expression {
            StepExprBuilder::Field { name } => {
                let field = self
                    .find_field(source, name)
                    .ok_or_else(|| LangError::FieldNotFound(name.clone()))?;
                let target = self.fields[field.target.0].asset;
                Ok(StepExpression {
                    source,
                    target,
                    kind: StepKind::Field(field.id),
                })
            }
            StepExprBuilder::AttackStep { name } => {
                let declaring = self
                    .find_attack_step(source, name)
                    .ok_or_else(|| LangError::AttackStepNotFound(name.clone()))?;
                Ok(StepExpression {
                    source,
                    target: declaring,
                    kind: StepKind::AttackStep {
                        asset: declaring,
                        name: name.clone(),
                    },
                })
            }
            StepExprBuilder::Variable { name } => {
                let declaring = self
                    .find_variable(source, name)
                    .ok_or_else(|| LangError::VariableNotFound(name.clone()))?;
                let target = self.variable_target(declaring, name)?;
                Ok(StepExpression {
                    source,
                    target,
                    kind: StepKind::Variable {
                        asset: declaring,
                        name: name.clone(),
                    },
                })
            }
            StepExprBuilder::Union { lhs, rhs }
            | StepExprBuilder::Intersection { lhs, rhs }
            | StepExprBuilder::Difference { lhs, rhs } => {
                let lhs = self.materialize_step(lhs, source)?;
                let rhs = self.materialize_step(rhs, source)?;
                let target = self.least_upper_bound(lhs.target, rhs.target).ok_or_else(|| {
                    LangError::NoCommonAncestor {
                        lhs: self.shells[lhs.target.0].name.clone(),
                        rhs: self.shells[rhs.target.0].name.clone(),
                    }
                })?;
                let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
                let kind = match expression {
                    StepExprBuilder::Union { .. } => StepKind::Union { lhs, rhs },
                    StepExprBuilder::Intersection { .. } => StepKind::Intersection { lhs, rhs },
                    _ => StepKind::Difference { lhs, rhs },
                };
                Ok(StepExpression {
                    source,
                    target,
                    kind,
                })
            }
            StepExprBuilder::Collect { lhs, rhs } => {
                let lhs = self.materialize_step(lhs, source)?;
                let rhs = self.materialize_step(rhs, lhs.target)?;
                let target = rhs.target;
                Ok(StepExpression {
                    source,
                    target,
                    kind: StepKind::Collect {
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                })
            }
            StepExprBuilder::Transitive { step_expression } => {
                let operand = self.materialize_step(step_expression, source)?;
                Ok(StepExpression {
                    source,
                    target: source,
                    kind: StepKind::Transitive(Box::new(operand)),
                })
            }
            StepExprBuilder::SubType {
                sub_type,
                step_expression,
            } => {
                let sub_type = self
                    .asset_ids
                    .get(sub_type)
                    .copied()
                    .ok_or_else(|| LangError::AssetNotFound(sub_type.clone()))?;
                let operand = self.materialize_step(step_expression, source)?;
                Ok(StepExpression {
                    source,
                    target: sub_type,
                    kind: StepKind::SubType {
                        sub_type,
                        operand: Box::new(operand),
                    },
                })
            }
        }
    }

    fn find_field(&self, source: AssetId, name: &str) -> Option<&Field> {
        let shell = &self.shells[source.0];
        shell
            .fields
            .iter()
            .map(|&id| &self.fields[id.0])
            .find(|field| field.name == name)
            .or_else(|| {
                shell
                    .super_asset
                    .and_then(|super_asset| self.find_field(super_asset, name))
            })
    }

    fn find_attack_step(&self, source: AssetId, name: &str) -> Option<AssetId> {
        if self.asset_builders[source.0].attack_steps.contains_key(name) {
            return Some(source);
        }
        self.shells[source.0]
            .super_asset
            .and_then(|super_asset| self.find_attack_step(super_asset, name))
    }

    fn find_variable(&self, source: AssetId, name: &str) -> Option<AssetId> {
        if self.asset_builders[source.0].variables.contains_key(name) {
            return Some(source);
        }
        self.shells[source.0]
            .super_asset
            .and_then(|super_asset| self.find_variable(super_asset, name))
    }

    fn is_sub_type_of(&self, asset: AssetId, other: AssetId) -> bool {
        if asset == other {
            return true;
        }
        match self.shells[asset.0].super_asset {
            Some(super_asset) => self.is_sub_type_of(super_asset, other),
            None => false,
        }
    }

    fn least_upper_bound(&self, a: AssetId, b: AssetId) -> Option<AssetId> {
        if self.is_sub_type_of(a, b) {
            return Some(b);
        }
        if self.is_sub_type_of(b, a) {
            return Some(a);
        }
        match (
            self.shells[a.0].super_asset,
            self.shells[b.0].super_asset,
        ) {
            (Some(a_super), Some(b_super)) => self.least_upper_bound(a_super, b_super),
            _ => None,
        }
    }

    fn materialize_variable(
        &mut self,
        declaring: AssetId,
        variable: &'a VariableBuilder,
    ) -> Result<Variable, LangError> {
        let step_expression = self.materialize_step(&variable.step_expression, declaring)?;
        Ok(Variable {
            name: variable.name.clone(),
            asset: declaring,
            step_expression,
        })
    }

    fn materialize_steps(
        &mut self,
        steps: &'a StepsBuilder,
        source: AssetId,
    ) -> Result<Steps, LangError> {
        let mut step_expressions = Vec::with_capacity(steps.step_expressions.len());
        for expression in &steps.step_expressions {
            step_expressions.push(self.materialize_step(expression, source)?);
        }
        Ok(Steps {
            overrides: steps.overrides,
            step_expressions,
        })
    }

    fn materialize_attack_step(
        &mut self,
        declaring: AssetId,
        step: &'a AttackStepBuilder,
    ) -> Result<AttackStep, LangError> {
        if let Some(ttc) = &step.ttc {
            ttc.validate()?;
        }
        let requires = match &step.requires {
            Some(steps) => Some(self.materialize_steps(steps, declaring)?),
            None => None,
        };
        let reaches = match &step.reaches {
            Some(steps) => Some(self.materialize_steps(steps, declaring)?),
            None => None,
        };
        Ok(AttackStep {
            name: step.name.clone(),
            meta: Meta::new(step.meta.clone()),
            asset: declaring,
            step_type: step.step_type,
            tags: step.tags.clone(),
            risk: step.risk,
            ttc: step.ttc.clone(),
            requires,
            reaches,
        })
    }

    fn materialize(mut self) -> Result<Lang, LangError> {
        let mut assets = Vec::with_capacity(self.shells.len());
        for index in 0..self.shells.len() {
            let id = AssetId(index);
            let asset_builder = self.asset_builders[index];

            let mut variables = Vec::with_capacity(asset_builder.variables.len());
            for variable in asset_builder.variables.values() {
                variables.push(self.materialize_variable(id, variable)?);
            }
            let mut attack_steps = Vec::with_capacity(asset_builder.attack_steps.len());
            for step in asset_builder.attack_steps.values() {
                attack_steps.push(self.materialize_attack_step(id, step)?);
            }

            let shell = &self.shells[index];
            assets.push(Asset {
                id,
                name: shell.name.clone(),
                meta: Meta::new(asset_builder.meta.clone()),
                category: shell.category,
                is_abstract: asset_builder.is_abstract,
                super_asset: shell.super_asset,
                fields: shell.fields.clone(),
                variables,
                attack_steps,
                svg_icon: asset_builder.svg_icon.clone(),
                png_icon: asset_builder.png_icon.clone(),
            });
        }

        Ok(Lang {
            defines: self.builder.defines.clone(),
            categories: self.categories,
            assets,
            fields: self.fields,
            associations: self.associations,
            category_ids: self.category_ids,
            asset_ids: self.asset_ids,
            license: self.builder.license.clone(),
            notice: self.builder.notice.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::association::Multiplicity;
    use crate::attack_step::AttackStepType;
    use crate::builder::{
        AssetBuilder, AssociationBuilder, AttackStepBuilder, CategoryBuilder, LangBuilder,
        StepExprBuilder, StepsBuilder, VariableBuilder,
    };
    use crate::lang::Lang;
    use crate::step::StepKind;

    fn network_builder() -> LangBuilder {
        LangBuilder::new()
            .define("id", "org.example.testlang")
            .define("version", "1.0.0")
            .category(CategoryBuilder::new("System").meta("en", "Computing things"))
            .asset(
                AssetBuilder::new("Machine", "System")
                    .abstract_asset(true)
                    .attack_step(
                        AttackStepBuilder::new("compromise", AttackStepType::Or)
                            .reaches(StepsBuilder::new(false).step(StepExprBuilder::collect(
                                StepExprBuilder::field("network"),
                                StepExprBuilder::field("hosts"),
                            ))),
                    ),
            )
            .asset(
                AssetBuilder::new("Host", "System")
                    .super_asset("Machine")
                    .variable(VariableBuilder::new(
                        "peers",
                        StepExprBuilder::collect(
                            StepExprBuilder::field("network"),
                            StepExprBuilder::field("hosts"),
                        ),
                    )),
            )
            .asset(AssetBuilder::new("Server", "System").super_asset("Host"))
            .asset(AssetBuilder::new("Network", "System"))
            .association(AssociationBuilder::new(
                "NetworkAccess",
                "Host",
                "hosts",
                Multiplicity::ZeroOrMore,
                "Network",
                "network",
                Multiplicity::ZeroOrMore,
            ))
    }

    #[test]
    fn subtype_chains_resolve_inherited_fields() {
        let lang = Lang::from_builder(&network_builder()).unwrap();
        let server = lang.asset(lang.asset_id("Server").unwrap());
        let network = lang.asset_id("Network").unwrap();

        // "network" is declared on Host, visible from Server.
        let field = server.field(&lang, "network").unwrap();
        assert_eq!(lang.field(field.target()).asset(), network);
        assert!(server.local_fields(&lang).next().is_none());
    }

    #[test]
    fn collect_rebinds_the_right_hand_source() {
        let lang = Lang::from_builder(&network_builder()).unwrap();
        let host = lang.asset_id("Host").unwrap();
        let network = lang.asset_id("Network").unwrap();

        let peers = lang.asset(host).variable(&lang, "peers").unwrap();
        assert_eq!(peers.target_asset(), host);
        match peers.step_expression().kind() {
            StepKind::Collect { lhs, rhs } => {
                assert_eq!(lhs.source_asset(), host);
                assert_eq!(lhs.target_asset(), network);
                assert_eq!(rhs.source_asset(), network);
                assert_eq!(rhs.target_asset(), host);
            }
            other => panic!("expected collect, got {other:?}"),
        }
    }

    #[test]
    fn attack_step_reference_targets_the_declaring_asset() {
        let builder = network_builder().asset(
            AssetBuilder::new("Monitor", "System").variable(VariableBuilder::new(
                "watched",
                StepExprBuilder::collect(
                    StepExprBuilder::field("observed"),
                    StepExprBuilder::attack_step("compromise"),
                ),
            )),
        );
        let builder = builder.association(AssociationBuilder::new(
            "Watches",
            "Monitor",
            "monitor",
            Multiplicity::ZeroOrOne,
            "Server",
            "observed",
            Multiplicity::ZeroOrMore,
        ));
        let lang = Lang::from_builder(&builder).unwrap();

        let monitor = lang.asset(lang.asset_id("Monitor").unwrap());
        let watched = monitor.variable(&lang, "watched").unwrap();
        // "compromise" is declared on Machine, two levels above Server.
        assert_eq!(watched.target_asset(), lang.asset_id("Machine").unwrap());
    }

    #[test]
    fn union_takes_the_least_upper_bound_of_branches() {
        let builder = network_builder()
            .asset(
                AssetBuilder::new("Router", "System")
                    .super_asset("Machine")
                    .variable(VariableBuilder::new(
                        "reachable",
                        StepExprBuilder::union(
                            StepExprBuilder::collect(
                                StepExprBuilder::field("lan"),
                                StepExprBuilder::field("hosts"),
                            ),
                            StepExprBuilder::sub_type(
                                "Router",
                                StepExprBuilder::collect(
                                    StepExprBuilder::field("lan"),
                                    StepExprBuilder::field("routers"),
                                ),
                            ),
                        ),
                    )),
            )
            .association(AssociationBuilder::new(
                "Routing",
                "Router",
                "routers",
                Multiplicity::ZeroOrMore,
                "Network",
                "lan",
                Multiplicity::ZeroOrMore,
            ));
        let lang = Lang::from_builder(&builder).unwrap();

        let router = lang.asset(lang.asset_id("Router").unwrap());
        let reachable = router.variable(&lang, "reachable").unwrap();
        // lub(Host, Router) is Machine.
        assert_eq!(reachable.target_asset(), lang.asset_id("Machine").unwrap());
    }

    #[test]
    fn lub_is_commutative_and_short_circuits_on_subtypes() {
        let lang = Lang::from_builder(&network_builder()).unwrap();
        let machine = lang.asset_id("Machine").unwrap();
        let host = lang.asset_id("Host").unwrap();
        let server = lang.asset_id("Server").unwrap();
        let network = lang.asset_id("Network").unwrap();

        assert_eq!(lang.least_upper_bound(host, server), Some(host));
        assert_eq!(lang.least_upper_bound(server, host), Some(host));
        assert_eq!(lang.least_upper_bound(server, machine), Some(machine));
        assert_eq!(lang.least_upper_bound(server, server), Some(server));
        assert_eq!(lang.least_upper_bound(server, network), None);
    }

    #[test]
    fn disjoint_union_branches_are_rejected() {
        let builder = network_builder()
            .asset(
                AssetBuilder::new("Probe", "System").variable(VariableBuilder::new(
                    "junk",
                    StepExprBuilder::union(
                        StepExprBuilder::field("net"),
                        StepExprBuilder::field("target"),
                    ),
                )),
            )
            .association(AssociationBuilder::new(
                "ProbeNet",
                "Probe",
                "probes",
                Multiplicity::ZeroOrMore,
                "Network",
                "net",
                Multiplicity::One,
            ))
            .association(AssociationBuilder::new(
                "ProbeTarget",
                "Probe",
                "prober",
                Multiplicity::ZeroOrOne,
                "Host",
                "target",
                Multiplicity::One,
            ));
        let err = Lang::from_builder(&builder).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Assets \"Network\" and \"Host\" have no common ancestor"
        );
    }

    #[test]
    fn transitive_stays_typed_at_the_source() {
        let builder = LangBuilder::new()
            .category(CategoryBuilder::new("Net"))
            .asset(
                AssetBuilder::new("Node", "Net").variable(VariableBuilder::new(
                    "downstream",
                    StepExprBuilder::transitive(StepExprBuilder::field("next")),
                )),
            )
            .association(AssociationBuilder::new(
                "Link",
                "Node",
                "prev",
                Multiplicity::ZeroOrMore,
                "Node",
                "next",
                Multiplicity::ZeroOrMore,
            ));
        let lang = Lang::from_builder(&builder).unwrap();
        let node = lang.asset(lang.asset_id("Node").unwrap());
        assert_eq!(
            node.variable(&lang, "downstream").unwrap().target_asset(),
            node.id()
        );
    }

    #[test]
    fn variables_may_reference_other_variables() {
        let builder = LangBuilder::new()
            .category(CategoryBuilder::new("Net"))
            .asset(
                AssetBuilder::new("Node", "Net")
                    .variable(VariableBuilder::new(
                        "hops",
                        StepExprBuilder::field("next"),
                    ))
                    .variable(VariableBuilder::new(
                        "twoHops",
                        StepExprBuilder::collect(
                            StepExprBuilder::variable("hops"),
                            StepExprBuilder::variable("hops"),
                        ),
                    )),
            )
            .association(AssociationBuilder::new(
                "Link",
                "Node",
                "prev",
                Multiplicity::ZeroOrMore,
                "Node",
                "next",
                Multiplicity::ZeroOrMore,
            ));
        let lang = Lang::from_builder(&builder).unwrap();
        let node = lang.asset(lang.asset_id("Node").unwrap());
        assert_eq!(
            node.variable(&lang, "twoHops").unwrap().target_asset(),
            node.id()
        );
    }

    #[test]
    fn cyclically_defined_variables_are_an_error() {
        let builder = LangBuilder::new()
            .category(CategoryBuilder::new("Net"))
            .asset(
                AssetBuilder::new("Node", "Net")
                    .variable(VariableBuilder::new(
                        "a",
                        StepExprBuilder::variable("b"),
                    ))
                    .variable(VariableBuilder::new(
                        "b",
                        StepExprBuilder::variable("a"),
                    )),
            );
        let err = Lang::from_builder(&builder).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Variable \"Node.a\" is cyclically defined"
        );
    }

    #[test]
    fn missing_links_name_the_missing_entity() {
        let builder = LangBuilder::new().asset(AssetBuilder::new("Host", "System"));
        assert_eq!(
            Lang::from_builder(&builder).unwrap_err().to_string(),
            "Category \"System\" not found"
        );

        let builder = LangBuilder::new()
            .category(CategoryBuilder::new("System"))
            .asset(AssetBuilder::new("Host", "System").super_asset("Machine"));
        assert_eq!(
            Lang::from_builder(&builder).unwrap_err().to_string(),
            "Asset \"Machine\" not found"
        );

        let builder = LangBuilder::new()
            .category(CategoryBuilder::new("System"))
            .asset(AssetBuilder::new("Host", "System"))
            .association(AssociationBuilder::new(
                "Conn",
                "Host",
                "a",
                Multiplicity::One,
                "Router",
                "b",
                Multiplicity::One,
            ));
        assert_eq!(
            Lang::from_builder(&builder).unwrap_err().to_string(),
            "Asset \"Router\" not found"
        );
    }

    #[test]
    fn invalid_identifiers_are_rejected_during_resolution() {
        let builder = LangBuilder::new()
            .category(CategoryBuilder::new("System"))
            .asset(AssetBuilder::new("2fast", "System"));
        assert_eq!(
            Lang::from_builder(&builder).unwrap_err().to_string(),
            "\"2fast\" is not a valid identifier"
        );
    }

    #[test]
    fn inheritance_cycles_are_rejected() {
        let builder = LangBuilder::new()
            .category(CategoryBuilder::new("System"))
            .asset(AssetBuilder::new("A", "System").super_asset("B"))
            .asset(AssetBuilder::new("B", "System").super_asset("A"));
        assert_eq!(
            Lang::from_builder(&builder).unwrap_err().to_string(),
            "Asset \"A\" is part of an inheritance cycle"
        );
    }

    #[test]
    fn overriding_reaches_truncates_the_inherited_list() {
        let builder = network_builder().asset(
            AssetBuilder::new("Appliance", "System")
                .super_asset("Machine")
                .attack_step(
                    AttackStepBuilder::new("compromise", AttackStepType::Or)
                        .reaches(
                            StepsBuilder::new(true)
                                .step(StepExprBuilder::attack_step("compromise")),
                        ),
                ),
        );
        let lang = Lang::from_builder(&builder).unwrap();

        let machine = lang.asset(lang.asset_id("Machine").unwrap());
        let host = lang.asset(lang.asset_id("Host").unwrap());
        let appliance = lang.asset(lang.asset_id("Appliance").unwrap());

        assert_eq!(
            machine.attack_step(&lang, "compromise").unwrap().reaches(&lang).len(),
            1
        );
        // Host inherits Machine's clause untouched.
        assert_eq!(
            host.attack_step(&lang, "compromise").unwrap().reaches(&lang).len(),
            1
        );
        // Appliance overrides, so only its own expression survives.
        let reaches = appliance
            .attack_step(&lang, "compromise")
            .unwrap()
            .reaches(&lang);
        assert_eq!(reaches.len(), 1);
        match reaches[0].kind() {
            StepKind::AttackStep { name, .. } => assert_eq!(name, "compromise"),
            other => panic!("expected attack step reference, got {other:?}"),
        }
    }

    #[test]
    fn non_overriding_reaches_appends_after_inherited() {
        let builder = network_builder().asset(
            AssetBuilder::new("Appliance", "System")
                .super_asset("Machine")
                .attack_step(
                    AttackStepBuilder::new("compromise", AttackStepType::Or)
                        .tag("extra")
                        .reaches(
                            StepsBuilder::new(false)
                                .step(StepExprBuilder::attack_step("compromise")),
                        ),
                ),
        );
        let lang = Lang::from_builder(&builder).unwrap();
        let appliance = lang.asset(lang.asset_id("Appliance").unwrap());
        let step = appliance.attack_step(&lang, "compromise").unwrap();

        assert_eq!(step.reaches(&lang).len(), 2);
        assert_eq!(step.tags(&lang), ["extra"]);
        assert!(step.super_attack_step(&lang).is_some());
    }

    #[test]
    fn shadowing_keeps_the_inherited_position_in_listings() {
        let builder = LangBuilder::new()
            .category(CategoryBuilder::new("C"))
            .asset(
                AssetBuilder::new("Base", "C")
                    .attack_step(AttackStepBuilder::new("first", AttackStepType::Or))
                    .attack_step(AttackStepBuilder::new("second", AttackStepType::Or)),
            )
            .asset(
                AssetBuilder::new("Derived", "C")
                    .super_asset("Base")
                    .attack_step(AttackStepBuilder::new("second", AttackStepType::And))
                    .attack_step(AttackStepBuilder::new("third", AttackStepType::Or)),
            );
        let lang = Lang::from_builder(&builder).unwrap();
        let derived = lang.asset(lang.asset_id("Derived").unwrap());

        let names: Vec<&str> = derived
            .attack_steps(&lang)
            .iter()
            .map(|step| step.name())
            .collect();
        assert_eq!(names, ["first", "second", "third"]);
        assert_eq!(
            derived.attack_step(&lang, "second").unwrap().step_type(),
            AttackStepType::And
        );
    }
}
