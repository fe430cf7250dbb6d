//! Associations and the navigable fields they induce.

use crate::asset::AssetId;
use crate::error::LangError;
use crate::meta::Meta;

/// Handle to a [`Field`] in a [`Lang`](crate::Lang).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub(crate) usize);

/// Handle to an [`Association`] in a [`Lang`](crate::Lang).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssociationId(pub(crate) usize);

/// How many instances a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Multiplicity {
    ZeroOrOne,
    ZeroOrMore,
    One,
    OneOrMore,
}

impl Multiplicity {
    pub fn min(&self) -> u64 {
        match self {
            Multiplicity::ZeroOrOne | Multiplicity::ZeroOrMore => 0,
            Multiplicity::One | Multiplicity::OneOrMore => 1,
        }
    }

    /// `None` means unbounded.
    pub fn max(&self) -> Option<u64> {
        match self {
            Multiplicity::ZeroOrOne | Multiplicity::One => Some(1),
            Multiplicity::ZeroOrMore | Multiplicity::OneOrMore => None,
        }
    }

    /// Maps a `{min, max}` pair back to a multiplicity. Only the four
    /// combinations produced by [`Multiplicity::min`] and
    /// [`Multiplicity::max`] are valid.
    pub fn from_min_max(min: u64, max: Option<u64>) -> Result<Self, LangError> {
        match (min, max) {
            (0, Some(1)) => Ok(Multiplicity::ZeroOrOne),
            (0, None) => Ok(Multiplicity::ZeroOrMore),
            (1, Some(1)) => Ok(Multiplicity::One),
            (1, None) => Ok(Multiplicity::OneOrMore),
            (min, max) => Err(LangError::InvalidMultiplicity {
                min,
                max: match max {
                    Some(max) => max.to_string(),
                    None => "null".to_owned(),
                },
            }),
        }
    }
}

/// One navigable end of an association.
///
/// A field is attached to the asset it is navigated *from*; following it
/// lands on the asset owning the paired field. The two fields of an
/// association always reference each other through
/// [`Field::target`].
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) id: FieldId,
    pub(crate) name: String,
    pub(crate) asset: AssetId,
    pub(crate) multiplicity: Multiplicity,
    pub(crate) target: FieldId,
    pub(crate) association: AssociationId,
}

impl Field {
    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The asset this field is attached to.
    pub fn asset(&self) -> AssetId {
        self.asset
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    /// The paired field on the opposite end of the association.
    pub fn target(&self) -> FieldId {
        self.target
    }

    pub fn association(&self) -> AssociationId {
        self.association
    }
}

/// A named, bidirectional link between two assets.
#[derive(Debug, Clone)]
pub struct Association {
    pub(crate) id: AssociationId,
    pub(crate) name: String,
    pub(crate) meta: Meta,
    pub(crate) left_field: FieldId,
    pub(crate) right_field: FieldId,
}

impl Association {
    pub fn id(&self) -> AssociationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// The field named on the left side of the declaration. It is attached
    /// to the right-hand asset and navigates to the left-hand one.
    pub fn left_field(&self) -> FieldId {
        self.left_field
    }

    pub fn right_field(&self) -> FieldId {
        self.right_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplicity_pairs_round_trip() {
        for multiplicity in [
            Multiplicity::ZeroOrOne,
            Multiplicity::ZeroOrMore,
            Multiplicity::One,
            Multiplicity::OneOrMore,
        ] {
            assert_eq!(
                Multiplicity::from_min_max(multiplicity.min(), multiplicity.max()).unwrap(),
                multiplicity
            );
        }
    }

    #[test]
    fn invalid_pairs_are_rejected_with_the_offending_bounds() {
        let err = Multiplicity::from_min_max(2, Some(1)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid multiplicity {min = 2, max = 1}");
        let err = Multiplicity::from_min_max(3, None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid multiplicity {min = 3, max = null}");
    }
}
