//! Attack steps and their inherited facets.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::asset::AssetId;
use crate::error::LangError;
use crate::lang::Lang;
use crate::meta::Meta;
use crate::step::StepExpression;
use crate::ttc::TtcExpression;

/// The logic an attack step applies to its incoming steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackStepType {
    And,
    Or,
    Defense,
    Exist,
    NotExist,
}

impl AttackStepType {
    pub fn name(&self) -> &'static str {
        match self {
            AttackStepType::And => "and",
            AttackStepType::Or => "or",
            AttackStepType::Defense => "defense",
            AttackStepType::Exist => "exist",
            AttackStepType::NotExist => "notExist",
        }
    }
}

impl fmt::Display for AttackStepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttackStepType {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "and" => Ok(AttackStepType::And),
            "or" => Ok(AttackStepType::Or),
            "defense" => Ok(AttackStepType::Defense),
            "exist" => Ok(AttackStepType::Exist),
            "notExist" => Ok(AttackStepType::NotExist),
            _ => Err(LangError::AttackStepTypeNotFound(s.to_owned())),
        }
    }
}

/// Which parts of the CIA triad an attack step threatens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Risk {
    pub is_confidentiality: bool,
    pub is_integrity: bool,
    pub is_availability: bool,
}

impl Risk {
    pub fn new(is_confidentiality: bool, is_integrity: bool, is_availability: bool) -> Self {
        Risk {
            is_confidentiality,
            is_integrity,
            is_availability,
        }
    }
}

/// A locally declared `requires` or `reaches` clause.
///
/// `overrides` controls how the clause combines with an overridden step of
/// the same name: an overriding clause discards the inherited expressions,
/// otherwise the local ones are appended after them.
#[derive(Debug, Clone)]
pub struct Steps {
    pub(crate) overrides: bool,
    pub(crate) step_expressions: Vec<StepExpression>,
}

impl Steps {
    pub fn overrides(&self) -> bool {
        self.overrides
    }

    pub fn step_expressions(&self) -> &[StepExpression] {
        &self.step_expressions
    }
}

/// An attack step declared on an asset.
///
/// The `local_*` accessors expose only what this declaration carries; the
/// plain accessors walk the overriding chain up the asset hierarchy and
/// return the effective facet.
#[derive(Debug, Clone)]
pub struct AttackStep {
    pub(crate) name: String,
    pub(crate) meta: Meta,
    pub(crate) asset: AssetId,
    pub(crate) step_type: AttackStepType,
    pub(crate) tags: IndexSet<String>,
    pub(crate) risk: Option<Risk>,
    pub(crate) ttc: Option<TtcExpression>,
    pub(crate) requires: Option<Steps>,
    pub(crate) reaches: Option<Steps>,
}

impl AttackStep {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// The asset this declaration appears on.
    pub fn asset(&self) -> AssetId {
        self.asset
    }

    pub fn step_type(&self) -> AttackStepType {
        self.step_type
    }

    pub fn has_local_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    pub fn local_tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn has_tag(&self, lang: &Lang, name: &str) -> bool {
        self.has_local_tag(name)
            || self
                .super_attack_step(lang)
                .is_some_and(|sup| sup.has_tag(lang, name))
    }

    /// All tags in effect, inherited ones first, without duplicates.
    pub fn tags<'a>(&'a self, lang: &'a Lang) -> Vec<&'a str> {
        self.tags_set(lang).into_iter().collect()
    }

    fn tags_set<'a>(&'a self, lang: &'a Lang) -> IndexSet<&'a str> {
        let mut tags = match self.super_attack_step(lang) {
            Some(sup) => sup.tags_set(lang),
            None => IndexSet::new(),
        };
        tags.extend(self.tags.iter().map(String::as_str));
        tags
    }

    pub fn local_risk(&self) -> Option<&Risk> {
        self.risk.as_ref()
    }

    /// The nearest risk annotation on the overriding chain, if any.
    pub fn risk<'a>(&'a self, lang: &'a Lang) -> Option<&'a Risk> {
        self.risk
            .as_ref()
            .or_else(|| self.super_attack_step(lang)?.risk(lang))
    }

    pub fn local_ttc(&self) -> Option<&TtcExpression> {
        self.ttc.as_ref()
    }

    /// The nearest TTC annotation on the overriding chain, if any.
    pub fn ttc<'a>(&'a self, lang: &'a Lang) -> Option<&'a TtcExpression> {
        self.ttc
            .as_ref()
            .or_else(|| self.super_attack_step(lang)?.ttc(lang))
    }

    pub fn local_requires(&self) -> Option<&Steps> {
        self.requires.as_ref()
    }

    /// The effective `requires` expressions, inherited ones first. An
    /// overriding local clause truncates the inherited prefix.
    pub fn requires<'a>(&'a self, lang: &'a Lang) -> Vec<&'a StepExpression> {
        let mut list = Vec::new();
        self.collect_clause(lang, Facet::Requires, &mut list);
        list
    }

    pub fn local_reaches(&self) -> Option<&Steps> {
        self.reaches.as_ref()
    }

    /// The effective `reaches` expressions, inherited ones first. An
    /// overriding local clause truncates the inherited prefix.
    pub fn reaches<'a>(&'a self, lang: &'a Lang) -> Vec<&'a StepExpression> {
        let mut list = Vec::new();
        self.collect_clause(lang, Facet::Reaches, &mut list);
        list
    }

    fn collect_clause<'a>(
        &'a self,
        lang: &'a Lang,
        facet: Facet,
        out: &mut Vec<&'a StepExpression>,
    ) {
        let local = match facet {
            Facet::Requires => self.requires.as_ref(),
            Facet::Reaches => self.reaches.as_ref(),
        };
        let overrides = local.is_some_and(Steps::overrides);
        if !overrides {
            if let Some(sup) = self.super_attack_step(lang) {
                sup.collect_clause(lang, facet, out);
            }
        }
        if let Some(steps) = local {
            out.extend(steps.step_expressions.iter());
        }
    }

    /// The attack step this declaration overrides, if the super asset
    /// chain declares one with the same name.
    pub fn super_attack_step<'a>(&self, lang: &'a Lang) -> Option<&'a AttackStep> {
        let super_asset = lang.asset(self.asset).super_asset()?;
        lang.asset(super_asset).attack_step(lang, &self.name).ok()
    }
}

#[derive(Clone, Copy)]
enum Facet {
    Requires,
    Reaches,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_round_trip() {
        for step_type in [
            AttackStepType::And,
            AttackStepType::Or,
            AttackStepType::Defense,
            AttackStepType::Exist,
            AttackStepType::NotExist,
        ] {
            assert_eq!(
                step_type.name().parse::<AttackStepType>().unwrap(),
                step_type
            );
        }
        assert_eq!(
            "xor".parse::<AttackStepType>().unwrap_err().to_string(),
            "Attack step type \"xor\" not found"
        );
    }

    #[test]
    fn type_wire_names_use_camel_case() {
        assert_eq!(
            serde_json::to_value(AttackStepType::NotExist).unwrap(),
            serde_json::json!("notExist")
        );
        assert_eq!(
            serde_json::to_value(AttackStepType::And).unwrap(),
            serde_json::json!("and")
        );
    }

    #[test]
    fn risk_wire_names_keep_the_is_prefix() {
        let json = serde_json::to_value(Risk::new(true, false, true)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isConfidentiality": true,
                "isIntegrity": false,
                "isAvailability": true,
            })
        );
    }
}
