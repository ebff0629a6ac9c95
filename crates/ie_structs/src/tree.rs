//! The in-memory structure tree and its lookup surface.
//!
//! Nodes live in one arena owned by the tree and point at each other
//! through [`NodeId`] handles, parents included, so no node owns another
//! and walking upwards never borrows the whole tree. Removing a member
//! detaches its nodes from the root; the arena slots stay behind and
//! handles to them simply stop being reachable.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::field::{latin1_to_string, Field, FieldKind};
use crate::schema::{FieldPlan, MemberPlan, ResourcePlan};
use crate::types::{EngineProfile, Mutation, MutationKind, NodeId, ResourceType, StructKind};

/// What a node holds.
#[derive(Debug, Clone)]
pub enum Payload {
    /// A leaf value
    Field(Field),
    /// A nested structure
    Struct(StructData),
}

/// Body of a structure node.
#[derive(Debug, Clone)]
pub struct StructData {
    /// What species of structure this is
    pub kind: StructKind,
    pub(crate) children: Vec<NodeId>,
    /// Trailing script text owned by this member, stored out of line
    pub(crate) text: Option<Vec<u8>>,
}

/// One arena entry.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) name: Cow<'static, str>,
    pub(crate) offset: usize,
    pub(crate) payload: Payload,
}

/// A parsed resource: the typed field tree plus its layout plan.
#[derive(Debug)]
pub struct ResourceTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) rtype: ResourceType,
    pub(crate) version: [u8; 4],
    pub(crate) profile: EngineProfile,
    pub(crate) plan: ResourcePlan,
    pub(crate) events: Vec<Mutation>,
    pub(crate) size: usize,
}

const NO_CHILDREN: &[NodeId] = &[];

impl ResourceTree {
    pub(crate) fn new(
        rtype: ResourceType,
        version: [u8; 4],
        profile: EngineProfile,
        plan: ResourcePlan,
    ) -> Self {
        let root = Node {
            parent: None,
            name: Cow::Borrowed(rtype.extension()),
            offset: 0,
            payload: Payload::Struct(StructData {
                kind: StructKind::Root,
                children: Vec::new(),
                text: None,
            }),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            rtype,
            version,
            profile,
            plan,
            events: Vec::new(),
            size: 0,
        }
    }

    pub(crate) fn push_field(
        &mut self,
        parent: NodeId,
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        field: Field,
    ) -> NodeId {
        self.push_node(parent, name.into(), offset, Payload::Field(field))
    }

    pub(crate) fn push_struct(
        &mut self,
        parent: NodeId,
        name: impl Into<Cow<'static, str>>,
        offset: usize,
        kind: StructKind,
    ) -> NodeId {
        self.push_node(
            parent,
            name.into(),
            offset,
            Payload::Struct(StructData {
                kind,
                children: Vec::new(),
                text: None,
            }),
        )
    }

    fn push_node(
        &mut self,
        parent: NodeId,
        name: Cow<'static, str>,
        offset: usize,
        payload: Payload,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            name,
            offset,
            payload,
        });
        if let Payload::Struct(parent_data) = &mut self.nodes[parent.index()].payload {
            parent_data.children.push(id);
        }
        id
    }

    pub(crate) fn push_event(&mut self, kind: MutationKind, parent: NodeId, first: usize, last: usize) {
        self.events.push(Mutation {
            kind,
            parent,
            first,
            last,
        });
    }

    /// The resource structure itself.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Format of the parsed resource.
    pub fn resource_type(&self) -> ResourceType {
        self.rtype
    }

    /// Version bytes from the file header.
    pub fn version(&self) -> &[u8; 4] {
        &self.version
    }

    /// Game variant the layout was resolved for.
    pub fn profile(&self) -> EngineProfile {
        self.profile
    }

    /// Total byte size of the linearized resource.
    pub fn total_size(&self) -> usize {
        self.size
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Display name of a node.
    pub fn name(&self, id: NodeId) -> &str {
        &self.node(id).name
    }

    /// Absolute byte offset a node currently linearizes to.
    pub fn offset(&self, id: NodeId) -> usize {
        self.node(id).offset
    }

    /// Byte size of a node's own region.
    ///
    /// For structures this is the sum of the child sizes; trailing script
    /// text lives elsewhere in the file and does not count.
    pub fn size(&self, id: NodeId) -> usize {
        match &self.node(id).payload {
            Payload::Field(field) => field.size,
            Payload::Struct(data) => data.children.iter().map(|&c| self.size(c)).sum(),
        }
    }

    /// The structure species of a node, or `None` for a leaf.
    pub fn kind(&self, id: NodeId) -> Option<StructKind> {
        match &self.node(id).payload {
            Payload::Struct(data) => Some(data.kind),
            Payload::Field(_) => None,
        }
    }

    /// The leaf value of a node, or `None` for a structure.
    pub fn as_field(&self, id: NodeId) -> Option<&Field> {
        match &self.node(id).payload {
            Payload::Field(field) => Some(field),
            Payload::Struct(_) => None,
        }
    }

    pub(crate) fn field_ref(&self, id: NodeId) -> &Field {
        match &self.node(id).payload {
            Payload::Field(field) => field,
            Payload::Struct(_) => unreachable!("structure node used as a field"),
        }
    }

    pub(crate) fn field_mut(&mut self, id: NodeId) -> &mut Field {
        match &mut self.node_mut(id).payload {
            Payload::Field(field) => field,
            Payload::Struct(_) => unreachable!("structure node used as a field"),
        }
    }

    /// Direct children of a node, in layout order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).payload {
            Payload::Struct(data) => &data.children,
            Payload::Field(_) => NO_CHILDREN,
        }
    }

    /// Number of direct children.
    pub fn field_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Child at position `index`.
    pub fn field(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// First node named `name` below `id`, in depth first order.
    ///
    /// Duplicate names are common in these formats; use
    /// [`attribute_at`](Self::attribute_at) to pick a specific one.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.name(current) == name {
                return Some(current);
            }
            stack.extend(self.children(current).iter().rev());
        }
        None
    }

    /// Leaf field at an absolute byte offset below `id`.
    ///
    /// With `exact` the field must start at `offset`; otherwise any field
    /// whose extent contains `offset` matches.
    pub fn attribute_at(&self, id: NodeId, offset: usize, exact: bool) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            match &self.node(current).payload {
                Payload::Field(field) => {
                    let start = self.offset(current);
                    let hit = if exact {
                        start == offset
                    } else {
                        offset >= start && offset < start + field.size
                    };
                    if hit {
                        return Some(current);
                    }
                }
                Payload::Struct(_) => stack.extend(self.children(current).iter().rev()),
            }
        }
        None
    }

    /// Every leaf field of the tree, ordered by byte offset.
    ///
    /// Fields sharing an offset keep their tree order. The returned
    /// cursor can be restarted without rebuilding it.
    pub fn flat_list(&self) -> FlatList {
        let mut ids = Vec::new();
        let mut stack: Vec<NodeId> = self.children(self.root).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            match &self.node(current).payload {
                Payload::Field(_) => ids.push(current),
                Payload::Struct(_) => stack.extend(self.children(current).iter().rev()),
            }
        }
        ids.sort_by_key(|&id| self.offset(id));
        FlatList { ids, position: 0 }
    }

    /// The chain of structures from the root down to `id`, inclusive.
    ///
    /// Parent links are plain handles, so a corrupted tree could loop;
    /// the walk keeps a visited set and stops at the first repeat.
    pub fn struct_chain(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut seen: HashSet<NodeId> = HashSet::from([id]);
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            if !seen.insert(parent) {
                tracing::warn!(node = %id, at = %parent, "parent links form a cycle");
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    /// Root children of one structure species, in layout order.
    pub fn members(&self, kind: StructKind) -> Vec<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .filter(|&c| self.kind(c) == Some(kind))
            .collect()
    }

    /// Position of a member within its section, or `None` for non-members.
    pub fn member_position(&self, id: NodeId) -> Option<usize> {
        let kind = self.kind(id)?;
        if self.node(id).parent != Some(self.root) {
            return None;
        }
        self.members(kind).iter().position(|&m| m == id)
    }

    /// Trailing script text of a member, decoded for display.
    pub fn text(&self, id: NodeId) -> Option<String> {
        match &self.node(id).payload {
            Payload::Struct(data) => data.text.as_deref().map(latin1_to_string),
            Payload::Field(_) => None,
        }
    }

    pub(crate) fn raw_text(&self, id: NodeId) -> Option<&[u8]> {
        match &self.node(id).payload {
            Payload::Struct(data) => data.text.as_deref(),
            Payload::Field(_) => None,
        }
    }

    /// Drains the accumulated change feed.
    ///
    /// The model is single threaded; collaborators poll this after each
    /// operation they invoke.
    pub fn take_events(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.events)
    }

    /// Header field carrying the file offset of `kind`'s section.
    pub(crate) fn section_offset_field(&self, kind: StructKind) -> Option<NodeId> {
        self.header_field(|f| matches!(f.kind, FieldKind::SectionOffset { of } if of == kind))
    }

    /// Header field carrying the member count of `kind`'s section.
    pub(crate) fn section_count_field(&self, kind: StructKind) -> Option<NodeId> {
        self.header_field(|f| matches!(f.kind, FieldKind::SectionCount { of } if of == kind))
    }

    fn header_field(&self, matcher: impl Fn(&Field) -> bool) -> Option<NodeId> {
        self.children(self.root)
            .iter()
            .copied()
            .find(|&c| self.as_field(c).is_some_and(&matcher))
    }

    /// Sum of every pool range length targeting `kind`, tree wide.
    pub(crate) fn pool_count_sum(&self, kind: StructKind) -> i64 {
        self.flat_list()
            .filter_map(|id| self.as_field(id))
            .filter(|f| matches!(f.kind, FieldKind::PoolCount { of } if of == kind))
            .map(Field::int)
            .sum()
    }

    pub(crate) fn set_raw_text(&mut self, id: NodeId, text: Option<Vec<u8>>) {
        if let Payload::Struct(data) = &mut self.node_mut(id).payload {
            data.text = text;
        }
    }

    /// Position of `child` in `parent`'s child list.
    pub(crate) fn child_position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Creates a structure node at a specific child position.
    pub(crate) fn insert_struct_at(
        &mut self,
        parent: NodeId,
        position: usize,
        name: impl Into<Cow<'static, str>>,
        kind: StructKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            name: name.into(),
            offset: 0,
            payload: Payload::Struct(StructData {
                kind,
                children: Vec::new(),
                text: None,
            }),
        });
        if let Payload::Struct(parent_data) = &mut self.nodes[parent.index()].payload {
            parent_data.children.insert(position, id);
        }
        id
    }

    /// Unlinks `child` from `parent`, leaving it orphaned in the arena.
    ///
    /// Returns the child position it held.
    pub(crate) fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Option<usize> {
        let position = self.child_position(parent, child)?;
        if let Payload::Struct(parent_data) = &mut self.nodes[parent.index()].payload {
            parent_data.children.remove(position);
        }
        self.node_mut(child).parent = None;
        Some(position)
    }

    /// First direct child field of `parent` with exactly this datatype.
    pub(crate) fn field_of_kind(&self, parent: NodeId, kind: FieldKind) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.as_field(c).is_some_and(|f| f.kind == kind))
    }

    /// The concrete member field layout of `kind`'s section, with any
    /// variant selection already resolved against the header.
    pub(crate) fn member_layout(&self, kind: StructKind) -> crate::Result<Vec<FieldPlan>> {
        let Some(section) = self.plan.section(kind) else {
            return Err(crate::Error::MalformedLayout {
                field: kind.to_string(),
                offset: 0,
                detail: "no section of this species exists in the layout".to_string(),
            });
        };
        match &section.member {
            MemberPlan::Fields(fields) => Ok(fields.clone()),
            MemberPlan::ByHeaderField { selector, .. } => {
                let value = self
                    .attribute(self.root, selector)
                    .and_then(|id| self.as_field(id).map(Field::int))
                    .ok_or_else(|| crate::Error::MalformedLayout {
                        field: (*selector).to_string(),
                        offset: 0,
                        detail: "selecting header field is missing".to_string(),
                    })?;
                section
                    .member
                    .resolve(Some(value))
                    .map(<[FieldPlan]>::to_vec)
                    .ok_or_else(|| crate::Error::MalformedLayout {
                        field: (*selector).to_string(),
                        offset: 0,
                        detail: format!("no member layout for value {value}"),
                    })
            }
        }
    }
}

/// Restartable cursor over the leaf fields of a tree in offset order.
#[derive(Debug, Clone)]
pub struct FlatList {
    ids: Vec<NodeId>,
    position: usize,
}

impl FlatList {
    /// Rewinds the cursor to the first field.
    pub fn restart(&mut self) {
        self.position = 0;
    }

    /// Number of fields the cursor covers.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the cursor covers no fields at all.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Iterator for FlatList {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.ids.get(self.position).copied();
        self.position += 1;
        id
    }
}
