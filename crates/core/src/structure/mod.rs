use std::{collections::VecDeque, fmt, str::FromStr};

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::{layout, DataVisError, LayoutParams, Result};

/// Sequence discipline shown by the visualiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    #[default]
    Queue,
    Stack,
    Array,
    Ring,
}

/// End of the sequence an element is taken from on removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalEnd {
    Head,
    Tail,
}

impl StructureKind {
    pub fn removal_end(self) -> RemovalEnd {
        match self {
            StructureKind::Stack => RemovalEnd::Tail,
            StructureKind::Queue | StructureKind::Array | StructureKind::Ring => RemovalEnd::Head,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StructureKind::Queue => "queue",
            StructureKind::Stack => "stack",
            StructureKind::Array => "array",
            StructureKind::Ring => "ring",
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StructureKind {
    type Err = DataVisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(StructureKind::Queue),
            "stack" => Ok(StructureKind::Stack),
            "array" => Ok(StructureKind::Array),
            "ring" | "sphere" => Ok(StructureKind::Ring),
            other => Err(DataVisError::InvalidInput(format!(
                "unknown structure kind `{other}`"
            ))),
        }
    }
}

/// One live entry of the structure together with its scene position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub value: i64,
    pub position: Vector3<f32>,
}

/// Parses a user supplied value for insertion.
///
/// Surrounding whitespace is ignored; anything that is not an integer yields
/// `None` and must leave the structure untouched.
pub fn parse_value(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Ordered values of a structure and the positions derived from them.
///
/// Positions are recomputed in full after every mutation or layout change so
/// that `elements()` always reflects the current kind and parameters.
#[derive(Debug, Clone)]
pub struct Structure {
    kind: StructureKind,
    params: LayoutParams,
    elements: VecDeque<Element>,
}

impl Structure {
    pub fn new(kind: StructureKind, params: LayoutParams) -> Self {
        Self {
            kind,
            params,
            elements: VecDeque::new(),
        }
    }

    pub fn with_values(
        kind: StructureKind,
        params: LayoutParams,
        values: impl IntoIterator<Item = i64>,
    ) -> Self {
        let mut structure = Self::new(kind, params);
        structure.elements = values
            .into_iter()
            .map(|value| Element {
                value,
                position: Vector3::new(0.0, 0.0, 0.0),
            })
            .collect();
        structure.relayout();
        structure
    }

    pub fn kind(&self) -> StructureKind {
        self.kind
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> Vec<Element> {
        self.elements.iter().cloned().collect()
    }

    pub fn values(&self) -> Vec<i64> {
        self.elements.iter().map(|element| element.value).collect()
    }

    pub fn set_kind(&mut self, kind: StructureKind) {
        if self.kind != kind {
            self.kind = kind;
            self.relayout();
        }
    }

    pub fn set_params(&mut self, params: LayoutParams) {
        if self.params != params {
            self.params = params;
            self.relayout();
        }
    }

    /// Appends `value` as the newest element. Stacks push and queues enqueue
    /// at the same end.
    pub fn insert(&mut self, value: i64) {
        self.elements.push_back(Element {
            value,
            position: Vector3::new(0.0, 0.0, 0.0),
        });
        self.relayout();
    }

    /// Removes the element at the kind's removal end and returns its value.
    pub fn remove(&mut self) -> Result<i64> {
        let removed = match self.kind.removal_end() {
            RemovalEnd::Head => self.elements.pop_front(),
            RemovalEnd::Tail => self.elements.pop_back(),
        }
        .ok_or(DataVisError::EmptyStructure)?;

        self.relayout();
        Ok(removed.value)
    }

    fn relayout(&mut self) {
        let positions = layout::compute_positions(self.kind, self.elements.len(), &self.params);
        for (element, position) in self.elements.iter_mut().zip(positions) {
            element.position = position;
        }
    }
}
