//! DTOs for the mapping management endpoints.

use crate::domain::entities::Mapping;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// JSON form of a mapping, as posted to and returned from `/mappings/`.
///
/// ```json
/// { "key": "/old", "dest": "/new", "perm": true, "comment": "moved" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MappingDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "no key defined"))]
    pub key: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "no destination defined"))]
    pub dest: String,

    #[serde(default)]
    pub perm: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<MappingDto> for Mapping {
    fn from(dto: MappingDto) -> Self {
        let mut mapping = Mapping::new(dto.key, dto.dest, dto.perm);
        mapping.comment = dto.comment.filter(|c| !c.is_empty());
        mapping
    }
}

impl From<Mapping> for MappingDto {
    fn from(mapping: Mapping) -> Self {
        Self {
            key: mapping.key,
            dest: mapping.destination,
            perm: mapping.permanent,
            comment: mapping.comment,
        }
    }
}

/// Body of `POST /mappings/`: a single mapping or an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MappingPayload {
    Many(Vec<MappingDto>),
    One(MappingDto),
}

impl MappingPayload {
    pub fn into_vec(self) -> Vec<MappingDto> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}
