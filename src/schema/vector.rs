//! Vector field attributes.
//!
//! ```text
//! embedding VECTOR HNSW 6 TYPE FLOAT32 DIM 384 DISTANCE_METRIC COSINE
//! ```

use serde::Serialize;
use std::fmt;

use crate::error::SchemaError;

/// Vector index algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VectorAlgorithm {
    /// Brute-force index
    Flat,
    /// Hierarchical navigable small world graph
    Hnsw,
}

impl fmt::Display for VectorAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorAlgorithm::Flat => write!(f, "FLAT"),
            VectorAlgorithm::Hnsw => write!(f, "HNSW"),
        }
    }
}

/// Element type of stored vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VectorType {
    Float32,
    Float64,
}

impl fmt::Display for VectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorType::Float32 => write!(f, "FLOAT32"),
            VectorType::Float64 => write!(f, "FLOAT64"),
        }
    }
}

/// Distance metric used for KNN scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DistanceMetric {
    /// Euclidean distance
    L2,
    /// Inner product
    Ip,
    Cosine,
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::L2 => write!(f, "L2"),
            DistanceMetric::Ip => write!(f, "IP"),
            DistanceMetric::Cosine => write!(f, "COSINE"),
        }
    }
}

impl VectorAlgorithm {
    pub(crate) fn parse(field: &str, value: &str) -> Result<Self, SchemaError> {
        match value.to_ascii_uppercase().as_str() {
            "FLAT" => Ok(VectorAlgorithm::Flat),
            "HNSW" => Ok(VectorAlgorithm::Hnsw),
            _ => Err(invalid(field, "algorithm", value)),
        }
    }
}

impl VectorType {
    pub(crate) fn parse(field: &str, value: &str) -> Result<Self, SchemaError> {
        match value.to_ascii_uppercase().as_str() {
            "FLOAT32" => Ok(VectorType::Float32),
            "FLOAT64" => Ok(VectorType::Float64),
            _ => Err(invalid(field, "type", value)),
        }
    }
}

impl DistanceMetric {
    pub(crate) fn parse(field: &str, value: &str) -> Result<Self, SchemaError> {
        match value.to_ascii_uppercase().as_str() {
            "L2" => Ok(DistanceMetric::L2),
            "IP" => Ok(DistanceMetric::Ip),
            "COSINE" => Ok(DistanceMetric::Cosine),
            _ => Err(invalid(field, "distance_metric", value)),
        }
    }
}

fn invalid(field: &str, option: &str, value: &str) -> SchemaError {
    SchemaError::InvalidOptionValue {
        field: field.to_string(),
        option: option.to_string(),
        value: value.to_string(),
    }
}

/// Options of a vector field.
///
/// Type, dimension and distance metric are mandatory and therefore
/// constructor arguments. Tuning attributes are algorithm specific:
/// `block_size` is FLAT only, `m`, `ef_construction`, `ef_runtime` and
/// `epsilon` are HNSW only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorFieldOptions {
    pub algorithm: VectorAlgorithm,
    pub vector_type: VectorType,
    pub dim: usize,
    pub distance_metric: DistanceMetric,
    pub initial_cap: Option<usize>,
    pub block_size: Option<usize>,
    pub m: Option<usize>,
    pub ef_construction: Option<usize>,
    pub ef_runtime: Option<usize>,
    pub epsilon: Option<f64>,
}

impl VectorFieldOptions {
    pub fn new(
        algorithm: VectorAlgorithm,
        vector_type: VectorType,
        dim: usize,
        distance_metric: DistanceMetric,
    ) -> Self {
        Self {
            algorithm,
            vector_type,
            dim,
            distance_metric,
            initial_cap: None,
            block_size: None,
            m: None,
            ef_construction: None,
            ef_runtime: None,
            epsilon: None,
        }
    }

    pub fn flat(vector_type: VectorType, dim: usize, distance_metric: DistanceMetric) -> Self {
        Self::new(VectorAlgorithm::Flat, vector_type, dim, distance_metric)
    }

    pub fn hnsw(vector_type: VectorType, dim: usize, distance_metric: DistanceMetric) -> Self {
        Self::new(VectorAlgorithm::Hnsw, vector_type, dim, distance_metric)
    }

    pub fn initial_cap(mut self, cap: usize) -> Self {
        self.initial_cap = Some(cap);
        self
    }

    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = Some(size);
        self
    }

    pub fn m(mut self, m: usize) -> Self {
        self.m = Some(m);
        self
    }

    pub fn ef_construction(mut self, ef: usize) -> Self {
        self.ef_construction = Some(ef);
        self
    }

    pub fn ef_runtime(mut self, ef: usize) -> Self {
        self.ef_runtime = Some(ef);
        self
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    pub(crate) fn validate(&self, field: &str) -> Result<(), SchemaError> {
        if self.dim == 0 {
            return Err(SchemaError::InvalidVectorAttribute {
                field: field.to_string(),
                attribute: "DIM",
                reason: "dimension must be greater than zero".to_string(),
            });
        }

        let misplaced = match self.algorithm {
            VectorAlgorithm::Flat => [
                ("M", self.m.is_some()),
                ("EF_CONSTRUCTION", self.ef_construction.is_some()),
                ("EF_RUNTIME", self.ef_runtime.is_some()),
                ("EPSILON", self.epsilon.is_some()),
            ]
            .into_iter()
            .find(|(_, set)| *set),
            VectorAlgorithm::Hnsw => Some(("BLOCK_SIZE", self.block_size.is_some())).filter(|(_, set)| *set),
        };

        if let Some((attribute, _)) = misplaced {
            return Err(SchemaError::InvalidVectorAttribute {
                field: field.to_string(),
                attribute,
                reason: format!("not supported by {}", self.algorithm),
            });
        }
        Ok(())
    }

    /// Attribute pairs in wire order, keys as declared (lower case).
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = vec![
            ("type", self.vector_type.to_string()),
            ("dim", self.dim.to_string()),
            ("distance_metric", self.distance_metric.to_string()),
        ];
        let optional = [
            ("initial_cap", self.initial_cap),
            ("block_size", self.block_size),
            ("m", self.m),
            ("ef_construction", self.ef_construction),
            ("ef_runtime", self.ef_runtime),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                attrs.push((key, v.to_string()));
            }
        }
        if let Some(epsilon) = self.epsilon {
            attrs.push(("epsilon", epsilon.to_string()));
        }
        attrs
    }
}
