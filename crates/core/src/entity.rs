use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a stored entity.
pub type Guid = Uuid;

/// Entity kinds known to the service. The discriminant is the wire type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    EdgeBundle = 0,
    VertexSet = 1,
    Scalar = 2,
    DoubleAttribute = 3,
    StringAttribute = 4,
    DoubleTuple2Attribute = 5,
    DoubleVectorAttribute = 6,
}

impl EntityKind {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(EntityKind::EdgeBundle),
            1 => Some(EntityKind::VertexSet),
            2 => Some(EntityKind::Scalar),
            3 => Some(EntityKind::DoubleAttribute),
            4 => Some(EntityKind::StringAttribute),
            5 => Some(EntityKind::DoubleTuple2Attribute),
            6 => Some(EntityKind::DoubleVectorAttribute),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::EdgeBundle => write!(f, "EdgeBundle"),
            EntityKind::VertexSet => write!(f, "VertexSet"),
            EntityKind::Scalar => write!(f, "Scalar"),
            EntityKind::DoubleAttribute => write!(f, "DoubleAttribute"),
            EntityKind::StringAttribute => write!(f, "StringAttribute"),
            EntityKind::DoubleTuple2Attribute => write!(f, "DoubleTuple2Attribute"),
            EntityKind::DoubleVectorAttribute => write!(f, "DoubleVectorAttribute"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = crate::WeaveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EdgeBundle" => Ok(EntityKind::EdgeBundle),
            "VertexSet" => Ok(EntityKind::VertexSet),
            "Scalar" => Ok(EntityKind::Scalar),
            "DoubleAttribute" => Ok(EntityKind::DoubleAttribute),
            "StringAttribute" => Ok(EntityKind::StringAttribute),
            "DoubleTuple2Attribute" => Ok(EntityKind::DoubleTuple2Attribute),
            "DoubleVectorAttribute" => Ok(EntityKind::DoubleVectorAttribute),
            other => Err(crate::WeaveError::InvalidParameter(format!(
                "unknown entity kind: {}",
                other
            ))),
        }
    }
}

/// Ordered vertex set. `mapping[i]` is the external id of vertex `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexSet {
    pub mapping: Vec<i64>,
}

impl VertexSet {
    /// Vertex set with external ids equal to the ordered indices.
    pub fn with_len(len: usize) -> Self {
        Self {
            mapping: (0..len as i64).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// External id -> ordered index.
    pub fn mapping_to_ordered(&self) -> std::collections::HashMap<i64, usize> {
        self.mapping
            .iter()
            .enumerate()
            .map(|(ordered, &external)| (external, ordered))
            .collect()
    }
}

/// Edges between two vertex sets, addressed by ordered vertex index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeBundle {
    pub src: Vec<usize>,
    pub dst: Vec<usize>,
    pub edge_mapping: Vec<i64>,
}

impl EdgeBundle {
    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scalar {
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubleAttribute {
    pub values: Vec<f64>,
    pub defined: Vec<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringAttribute {
    pub values: Vec<String>,
    pub defined: Vec<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubleTuple2Attribute {
    pub values1: Vec<f64>,
    pub values2: Vec<f64>,
    pub defined: Vec<bool>,
}

/// One fixed-width vector per element, e.g. a node embedding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubleVectorAttribute {
    pub values: Vec<Vec<f64>>,
    pub defined: Vec<bool>,
}

impl DoubleVectorAttribute {
    /// Attribute with every row defined.
    pub fn dense(values: Vec<Vec<f64>>) -> Self {
        let defined = vec![true; values.len()];
        Self { values, defined }
    }
}

/// A stored entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Entity {
    EdgeBundle(EdgeBundle),
    VertexSet(VertexSet),
    Scalar(Scalar),
    DoubleAttribute(DoubleAttribute),
    StringAttribute(StringAttribute),
    DoubleTuple2Attribute(DoubleTuple2Attribute),
    DoubleVectorAttribute(DoubleVectorAttribute),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::EdgeBundle(_) => EntityKind::EdgeBundle,
            Entity::VertexSet(_) => EntityKind::VertexSet,
            Entity::Scalar(_) => EntityKind::Scalar,
            Entity::DoubleAttribute(_) => EntityKind::DoubleAttribute,
            Entity::StringAttribute(_) => EntityKind::StringAttribute,
            Entity::DoubleTuple2Attribute(_) => EntityKind::DoubleTuple2Attribute,
            Entity::DoubleVectorAttribute(_) => EntityKind::DoubleVectorAttribute,
        }
    }
}
