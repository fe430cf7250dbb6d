//! The fully linked language specification.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::asset::{Asset, AssetId};
use crate::association::{Association, AssociationId, Field, FieldId};
use crate::builder::LangBuilder;
use crate::category::{Category, CategoryId};
use crate::error::LangError;
use crate::resolve;

/// A compiled language specification.
///
/// A `Lang` is immutable: it is produced in one shot from a
/// [`LangBuilder`] and every cross-reference inside it has already been
/// resolved to a typed handle. Handles index into arenas owned here, so all
/// hierarchy-sensitive queries start from the `Lang`.
#[derive(Debug, Clone)]
pub struct Lang {
    pub(crate) defines: IndexMap<String, String>,
    pub(crate) categories: Vec<Category>,
    pub(crate) assets: Vec<Asset>,
    pub(crate) fields: Vec<Field>,
    pub(crate) associations: Vec<Association>,
    pub(crate) category_ids: HashMap<String, CategoryId>,
    pub(crate) asset_ids: HashMap<String, AssetId>,
    pub(crate) license: Option<String>,
    pub(crate) notice: Option<String>,
}

impl Lang {
    /// Resolves `builder` into an immutable specification.
    pub fn from_builder(builder: &LangBuilder) -> Result<Self, LangError> {
        resolve::resolve(builder)
    }

    pub fn has_define(&self, key: &str) -> bool {
        self.defines.contains_key(key)
    }

    pub fn define(&self, key: &str) -> Result<&str, LangError> {
        self.defines
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| LangError::DefineNotFound(key.to_owned()))
    }

    pub fn defines(&self) -> &IndexMap<String, String> {
        &self.defines
    }

    pub fn has_category(&self, name: &str) -> bool {
        self.category_ids.contains_key(name)
    }

    pub fn category_id(&self, name: &str) -> Result<CategoryId, LangError> {
        self.category_ids
            .get(name)
            .copied()
            .ok_or_else(|| LangError::CategoryNotFound(name.to_owned()))
    }

    pub fn category(&self, id: CategoryId) -> &Category {
        &self.categories[id.0]
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn has_asset(&self, name: &str) -> bool {
        self.asset_ids.contains_key(name)
    }

    pub fn asset_id(&self, name: &str) -> Result<AssetId, LangError> {
        self.asset_ids
            .get(name)
            .copied()
            .ok_or_else(|| LangError::AssetNotFound(name.to_owned()))
    }

    pub fn asset(&self, id: AssetId) -> &Asset {
        &self.assets[id.0]
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id.0]
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn association(&self, id: AssociationId) -> &Association {
        &self.associations[id.0]
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// The most specific asset both `a` and `b` are subtypes of, or `None`
    /// if their hierarchies are disjoint.
    pub fn least_upper_bound(&self, a: AssetId, b: AssetId) -> Option<AssetId> {
        if self.asset(a).is_sub_type_of(self, b) {
            return Some(b);
        }
        if self.asset(b).is_sub_type_of(self, a) {
            return Some(a);
        }
        match (self.asset(a).super_asset(), self.asset(b).super_asset()) {
            (Some(a_super), Some(b_super)) => self.least_upper_bound(a_super, b_super),
            _ => None,
        }
    }

    pub fn has_license(&self) -> bool {
        self.license.is_some()
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn has_notice(&self) -> bool {
        self.notice.is_some()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}
