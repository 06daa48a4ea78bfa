//! Shape of a field value inside an entry.

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, Result};

/// The closed set of shapes a field can take in an entry.
///
/// The tag is stored in the field directory so the reader never has to guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FieldType {
    /// The field was not written.
    Missing = 0,
    /// A byte sequence with no numeric companions.
    Raw = 1,
    /// A byte sequence with long and double companions.
    Tuple = 2,
    /// A list of raw elements.
    List = 3,
    /// A list of tuple elements.
    TupleList = 4,
}

impl FieldType {
    /// Decode a directory tag.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(FieldType::Missing),
            1 => Ok(FieldType::Raw),
            2 => Ok(FieldType::Tuple),
            3 => Ok(FieldType::List),
            4 => Ok(FieldType::TupleList),
            other => Err(QuarryError::corrupted(format!(
                "unknown field type tag {other}"
            ))),
        }
    }

    /// The directory tag of this type.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether values carry numeric companions.
    pub fn is_tuple(self) -> bool {
        matches!(self, FieldType::Tuple | FieldType::TupleList)
    }

    /// Whether the field holds a list of values.
    pub fn is_list(self) -> bool {
        matches!(self, FieldType::List | FieldType::TupleList)
    }

    pub fn is_missing(self) -> bool {
        self == FieldType::Missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        for ty in [
            FieldType::Missing,
            FieldType::Raw,
            FieldType::Tuple,
            FieldType::List,
            FieldType::TupleList,
        ] {
            assert_eq!(FieldType::from_tag(ty.tag()).unwrap(), ty);
        }
        assert!(matches!(
            FieldType::from_tag(9),
            Err(QuarryError::Corrupted(_))
        ));
    }

    #[test]
    fn test_flags() {
        assert!(FieldType::TupleList.is_tuple() && FieldType::TupleList.is_list());
        assert!(FieldType::Tuple.is_tuple() && !FieldType::Tuple.is_list());
        assert!(!FieldType::List.is_tuple() && FieldType::List.is_list());
        assert!(!FieldType::Raw.is_tuple() && !FieldType::Raw.is_list());
        assert!(FieldType::Missing.is_missing());
    }
}
