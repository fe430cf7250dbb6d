//! Assets, the inheritable node types of a specification.

use indexmap::IndexMap;

use crate::association::{Field, FieldId};
use crate::attack_step::AttackStep;
use crate::category::CategoryId;
use crate::error::LangError;
use crate::lang::Lang;
use crate::meta::Meta;
use crate::step::StepExpression;

/// Handle to an [`Asset`] in a [`Lang`](crate::Lang).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(pub(crate) usize);

/// A named step expression declared on an asset.
///
/// The expression's target asset was inferred when the specification was
/// built, so it can be read without re-walking the expression.
#[derive(Debug, Clone)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) asset: AssetId,
    pub(crate) step_expression: StepExpression,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The asset this variable is declared on.
    pub fn asset(&self) -> AssetId {
        self.asset
    }

    pub fn step_expression(&self) -> &StepExpression {
        &self.step_expression
    }

    /// The statically inferred type of the variable's result set.
    pub fn target_asset(&self) -> AssetId {
        self.step_expression.target_asset()
    }

    pub fn has_super_variable(&self, lang: &Lang) -> bool {
        self.super_variable(lang).is_some()
    }

    /// The variable this declaration shadows, if the super asset chain
    /// declares one with the same name.
    pub fn super_variable<'a>(&self, lang: &'a Lang) -> Option<&'a Variable> {
        let super_asset = lang.asset(self.asset).super_asset()?;
        lang.asset(super_asset).variable(lang, &self.name).ok()
    }
}

/// An asset type.
///
/// Lookups come in two flavors: `local_*` sees only declarations on this
/// asset, while the unprefixed forms see the effective view where local
/// declarations shadow inherited ones of the same name. Effective listings
/// keep inherited entries first, with shadowed entries replaced in place.
#[derive(Debug, Clone)]
pub struct Asset {
    pub(crate) id: AssetId,
    pub(crate) name: String,
    pub(crate) meta: Meta,
    pub(crate) category: CategoryId,
    pub(crate) is_abstract: bool,
    pub(crate) super_asset: Option<AssetId>,
    pub(crate) fields: Vec<FieldId>,
    pub(crate) variables: Vec<Variable>,
    pub(crate) attack_steps: Vec<AttackStep>,
    pub(crate) svg_icon: Option<Vec<u8>>,
    pub(crate) png_icon: Option<Vec<u8>>,
}

impl Asset {
    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn category(&self) -> CategoryId {
        self.category
    }

    /// Abstract assets only exist to be inherited from.
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn has_super_asset(&self) -> bool {
        self.super_asset.is_some()
    }

    pub fn super_asset(&self) -> Option<AssetId> {
        self.super_asset
    }

    /// Whether this asset is `other` or inherits from it.
    pub fn is_sub_type_of(&self, lang: &Lang, other: AssetId) -> bool {
        if self.id == other {
            return true;
        }
        match self.super_asset {
            Some(super_asset) => lang.asset(super_asset).is_sub_type_of(lang, other),
            None => false,
        }
    }

    pub fn has_local_field(&self, lang: &Lang, name: &str) -> bool {
        self.find_local_field(lang, name).is_some()
    }

    pub fn local_field<'a>(&self, lang: &'a Lang, name: &str) -> Result<&'a Field, LangError> {
        self.find_local_field(lang, name)
            .ok_or_else(|| LangError::LocalFieldNotFound(name.to_owned()))
    }

    pub fn local_fields<'a>(&'a self, lang: &'a Lang) -> impl Iterator<Item = &'a Field> {
        self.fields.iter().map(|&id| lang.field(id))
    }

    fn find_local_field<'a>(&self, lang: &'a Lang, name: &str) -> Option<&'a Field> {
        self.fields
            .iter()
            .map(|&id| lang.field(id))
            .find(|field| field.name() == name)
    }

    pub fn has_field(&self, lang: &Lang, name: &str) -> bool {
        self.find_field(lang, name).is_some()
    }

    pub fn field<'a>(&self, lang: &'a Lang, name: &str) -> Result<&'a Field, LangError> {
        self.find_field(lang, name)
            .ok_or_else(|| LangError::FieldNotFound(name.to_owned()))
    }

    /// The effective fields of this asset.
    pub fn fields<'a>(&'a self, lang: &'a Lang) -> Vec<&'a Field> {
        self.fields_map(lang).into_values().collect()
    }

    fn find_field<'a>(&self, lang: &'a Lang, name: &str) -> Option<&'a Field> {
        self.find_local_field(lang, name).or_else(|| {
            self.super_asset
                .and_then(|id| lang.asset(id).find_field(lang, name))
        })
    }

    fn fields_map<'a>(&'a self, lang: &'a Lang) -> IndexMap<&'a str, &'a Field> {
        let mut map = match self.super_asset {
            Some(id) => lang.asset(id).fields_map(lang),
            None => IndexMap::new(),
        };
        for field in self.local_fields(lang) {
            map.insert(field.name(), field);
        }
        map
    }

    pub fn has_local_variable(&self, name: &str) -> bool {
        self.variables.iter().any(|variable| variable.name == name)
    }

    pub fn local_variable(&self, name: &str) -> Result<&Variable, LangError> {
        self.variables
            .iter()
            .find(|variable| variable.name == name)
            .ok_or_else(|| LangError::LocalVariableNotFound(name.to_owned()))
    }

    pub fn local_variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn has_variable(&self, lang: &Lang, name: &str) -> bool {
        self.find_variable(lang, name).is_some()
    }

    pub fn variable<'a>(&'a self, lang: &'a Lang, name: &str) -> Result<&'a Variable, LangError> {
        self.find_variable(lang, name)
            .ok_or_else(|| LangError::VariableNotFound(name.to_owned()))
    }

    /// The effective variables of this asset.
    pub fn variables<'a>(&'a self, lang: &'a Lang) -> Vec<&'a Variable> {
        self.variables_map(lang).into_values().collect()
    }

    fn find_variable<'a>(&'a self, lang: &'a Lang, name: &str) -> Option<&'a Variable> {
        self.variables
            .iter()
            .find(|variable| variable.name == name)
            .or_else(|| {
                self.super_asset
                    .and_then(|id| lang.asset(id).find_variable(lang, name))
            })
    }

    fn variables_map<'a>(&'a self, lang: &'a Lang) -> IndexMap<&'a str, &'a Variable> {
        let mut map = match self.super_asset {
            Some(id) => lang.asset(id).variables_map(lang),
            None => IndexMap::new(),
        };
        for variable in &self.variables {
            map.insert(variable.name.as_str(), variable);
        }
        map
    }

    pub fn has_local_attack_step(&self, name: &str) -> bool {
        self.attack_steps.iter().any(|step| step.name == name)
    }

    pub fn local_attack_step(&self, name: &str) -> Result<&AttackStep, LangError> {
        self.attack_steps
            .iter()
            .find(|step| step.name == name)
            .ok_or_else(|| LangError::LocalAttackStepNotFound(name.to_owned()))
    }

    pub fn local_attack_steps(&self) -> &[AttackStep] {
        &self.attack_steps
    }

    pub fn has_attack_step(&self, lang: &Lang, name: &str) -> bool {
        self.find_attack_step(lang, name).is_some()
    }

    pub fn attack_step<'a>(
        &'a self,
        lang: &'a Lang,
        name: &str,
    ) -> Result<&'a AttackStep, LangError> {
        self.find_attack_step(lang, name)
            .ok_or_else(|| LangError::AttackStepNotFound(name.to_owned()))
    }

    /// The effective attack steps of this asset.
    pub fn attack_steps<'a>(&'a self, lang: &'a Lang) -> Vec<&'a AttackStep> {
        self.attack_steps_map(lang).into_values().collect()
    }

    fn find_attack_step<'a>(&'a self, lang: &'a Lang, name: &str) -> Option<&'a AttackStep> {
        self.attack_steps
            .iter()
            .find(|step| step.name == name)
            .or_else(|| {
                self.super_asset
                    .and_then(|id| lang.asset(id).find_attack_step(lang, name))
            })
    }

    fn attack_steps_map<'a>(&'a self, lang: &'a Lang) -> IndexMap<&'a str, &'a AttackStep> {
        let mut map = match self.super_asset {
            Some(id) => lang.asset(id).attack_steps_map(lang),
            None => IndexMap::new(),
        };
        for step in &self.attack_steps {
            map.insert(step.name.as_str(), step);
        }
        map
    }

    pub fn local_svg_icon(&self) -> Option<&[u8]> {
        self.svg_icon.as_deref()
    }

    /// The nearest SVG icon on the inheritance chain, if any.
    pub fn svg_icon<'a>(&'a self, lang: &'a Lang) -> Option<&'a [u8]> {
        self.svg_icon.as_deref().or_else(|| {
            self.super_asset
                .and_then(|id| lang.asset(id).svg_icon(lang))
        })
    }

    pub fn local_png_icon(&self) -> Option<&[u8]> {
        self.png_icon.as_deref()
    }

    /// The nearest PNG icon on the inheritance chain, if any.
    pub fn png_icon<'a>(&'a self, lang: &'a Lang) -> Option<&'a [u8]> {
        self.png_icon.as_deref().or_else(|| {
            self.super_asset
                .and_then(|id| lang.asset(id).png_icon(lang))
        })
    }
}
