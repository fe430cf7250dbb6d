//! Categories group assets for presentation purposes.

use crate::asset::AssetId;
use crate::meta::Meta;

/// Handle to a [`Category`] in a [`Lang`](crate::Lang).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(pub(crate) usize);

#[derive(Debug, Clone)]
pub struct Category {
    pub(crate) id: CategoryId,
    pub(crate) name: String,
    pub(crate) meta: Meta,
    pub(crate) assets: Vec<AssetId>,
}

impl Category {
    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// The assets filed under this category, in declaration order.
    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }
}
