//! Graph entities
//!
//! Nodes, relationships and paths as they come off the wire.
//!
//! A path is stored exactly as the server sends it: an arena of unique
//! nodes, an arena of unique unbound relationships and the index list
//! that walks them.
//!
//! ```text
//!   nodes:   [a, b, c]          rels: [r1, r2]
//!   indices: [1, 1, -2, 2]
//!
//!   a ──r1──▶ b ◀──r2── c
//! ```
//!
//! Relationship indices are 1-based; a negative index means the
//! relationship is traversed against its direction. Node indices are
//! 0-based and the start node is always `nodes[0]`.

use super::registry::Fields;
use super::value::{Value, ValueMap};
use crate::error::{BoltError, Result};

// =============================================================================
// Node
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: i64,
    pub labels: Vec<String>,
    pub properties: ValueMap,

    /// Only present on protocol versions that carry element ids
    pub element_id: Option<String>,
}

impl Node {
    pub fn new(id: i64, labels: Vec<String>, properties: ValueMap) -> Self {
        Self {
            id,
            labels,
            properties,
            element_id: None,
        }
    }

    pub fn with_element_id(mut self, element_id: impl Into<String>) -> Self {
        self.element_id = Some(element_id.into());
        self
    }

    /// Element id as sent on the wire, falling back to the numeric id
    pub fn element_id_or_id(&self) -> String {
        self.element_id
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    pub(crate) fn from_fields(fields: &mut Fields, element_ids: bool) -> Result<Self> {
        let id = fields.next_int()?;
        let labels = fields.next_string_list()?;
        let properties = fields.next_map()?;
        let element_id = if element_ids {
            Some(fields.next_string()?)
        } else {
            None
        };

        Ok(Self {
            id,
            labels,
            properties,
            element_id,
        })
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

// =============================================================================
// Relationship
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: i64,
    pub start_node_id: i64,
    pub end_node_id: i64,
    pub rel_type: String,
    pub properties: ValueMap,

    // -------------------------------------------------------------------------
    // Element ids (newer protocol versions only)
    // -------------------------------------------------------------------------
    pub element_id: Option<String>,
    pub start_element_id: Option<String>,
    pub end_element_id: Option<String>,
}

impl Relationship {
    pub fn new(
        id: i64,
        start_node_id: i64,
        end_node_id: i64,
        rel_type: impl Into<String>,
        properties: ValueMap,
    ) -> Self {
        Self {
            id,
            start_node_id,
            end_node_id,
            rel_type: rel_type.into(),
            properties,
            element_id: None,
            start_element_id: None,
            end_element_id: None,
        }
    }

    pub(crate) fn from_fields(fields: &mut Fields, element_ids: bool) -> Result<Self> {
        let id = fields.next_int()?;
        let start_node_id = fields.next_int()?;
        let end_node_id = fields.next_int()?;
        let rel_type = fields.next_string()?;
        let properties = fields.next_map()?;

        let mut rel = Self::new(id, start_node_id, end_node_id, rel_type, properties);
        if element_ids {
            rel.element_id = Some(fields.next_string()?);
            rel.start_element_id = Some(fields.next_string()?);
            rel.end_element_id = Some(fields.next_string()?);
        }
        Ok(rel)
    }

    pub fn element_id_or_id(&self) -> String {
        self.element_id
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// A relationship without endpoints, as found inside a path
#[derive(Debug, Clone, PartialEq)]
pub struct UnboundRelationship {
    pub id: i64,
    pub rel_type: String,
    pub properties: ValueMap,
    pub element_id: Option<String>,
}

impl UnboundRelationship {
    pub fn new(id: i64, rel_type: impl Into<String>, properties: ValueMap) -> Self {
        Self {
            id,
            rel_type: rel_type.into(),
            properties,
            element_id: None,
        }
    }

    pub(crate) fn from_fields(fields: &mut Fields, element_ids: bool) -> Result<Self> {
        let id = fields.next_int()?;
        let rel_type = fields.next_string()?;
        let properties = fields.next_map()?;
        let element_id = if element_ids {
            Some(fields.next_string()?)
        } else {
            None
        };

        Ok(Self {
            id,
            rel_type,
            properties,
            element_id,
        })
    }

    pub fn element_id_or_id(&self) -> String {
        self.element_id
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    /// Attach endpoints, producing a full relationship
    pub fn bind(&self, start: &Node, end: &Node) -> Relationship {
        Relationship {
            id: self.id,
            start_node_id: start.id,
            end_node_id: end.id,
            rel_type: self.rel_type.clone(),
            properties: self.properties.clone(),
            element_id: self.element_id.clone(),
            start_element_id: start.element_id.clone(),
            end_element_id: end.element_id.clone(),
        }
    }
}

// =============================================================================
// Path
// =============================================================================

/// One hop of a path
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a> {
    pub start: &'a Node,
    pub relationship: Relationship,
    pub end: &'a Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<Node>,
    relationships: Vec<UnboundRelationship>,
    indices: Vec<i64>,
}

impl Path {
    /// Build a path from its arenas and index sequence
    ///
    /// Fails if the index list does not describe a walk over the arenas.
    pub fn new(
        nodes: Vec<Node>,
        relationships: Vec<UnboundRelationship>,
        indices: Vec<i64>,
    ) -> Result<Self> {
        if nodes.is_empty() {
            return Err(BoltError::protocol("path without a start node"));
        }
        if indices.len() % 2 != 0 {
            return Err(BoltError::protocol(format!(
                "path index list has odd length {}",
                indices.len()
            )));
        }

        for pair in indices.chunks(2) {
            let (rel, node) = (pair[0], pair[1]);
            if rel == 0 || rel.unsigned_abs() as usize > relationships.len() {
                return Err(BoltError::protocol(format!(
                    "path relationship index {} out of range (1..={})",
                    rel,
                    relationships.len()
                )));
            }
            if node < 0 || node as usize >= nodes.len() {
                return Err(BoltError::protocol(format!(
                    "path node index {} out of range (0..{})",
                    node,
                    nodes.len()
                )));
            }
        }

        Ok(Self {
            nodes,
            relationships,
            indices,
        })
    }

    pub(crate) fn from_fields(fields: &mut Fields) -> Result<Self> {
        let nodes = fields
            .next_list()?
            .into_iter()
            .map(|value| match value {
                Value::Node(node) => Ok(node),
                other => Err(BoltError::protocol(format!(
                    "expected Node in path, got {}",
                    other.type_name()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let relationships = fields
            .next_list()?
            .into_iter()
            .map(|value| match value {
                Value::UnboundRelationship(rel) => Ok(rel),
                other => Err(BoltError::protocol(format!(
                    "expected UnboundRelationship in path, got {}",
                    other.type_name()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        let indices = fields
            .next_list()?
            .into_iter()
            .map(|value| {
                value.as_int().ok_or_else(|| {
                    BoltError::protocol(format!(
                        "expected Integer in path indices, got {}",
                        value.type_name()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(nodes, relationships, indices)
    }

    /// Unique nodes, in arena order
    pub fn unique_nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Unique relationships, in arena order
    pub fn unique_relationships(&self) -> &[UnboundRelationship] {
        &self.relationships
    }

    /// Raw index sequence
    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    /// Number of hops
    pub fn len(&self) -> usize {
        self.indices.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn start(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn end(&self) -> &Node {
        match self.indices.last() {
            Some(&last) => &self.nodes[last as usize],
            None => self.start(),
        }
    }

    /// Nodes in traversal order, start node included
    pub fn nodes(&self) -> Vec<&Node> {
        let mut out = Vec::with_capacity(self.len() + 1);
        out.push(self.start());
        out.extend(
            self.indices
                .chunks(2)
                .map(|pair| &self.nodes[pair[1] as usize]),
        );
        out
    }

    /// Relationships in traversal order, bound to their endpoints
    pub fn relationships(&self) -> Vec<Relationship> {
        self.segments().into_iter().map(|s| s.relationship).collect()
    }

    /// Hops in traversal order
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::with_capacity(self.len());
        let mut prev = self.start();

        for pair in self.indices.chunks(2) {
            let (rel_index, node_index) = (pair[0], pair[1]);
            let next = &self.nodes[node_index as usize];
            let rel = &self.relationships[rel_index.unsigned_abs() as usize - 1];

            let relationship = if rel_index > 0 {
                rel.bind(prev, next)
            } else {
                rel.bind(next, prev)
            };

            segments.push(Segment {
                start: prev,
                relationship,
                end: next,
            });
            prev = next;
        }

        segments
    }
}

