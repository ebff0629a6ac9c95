//! Linearizing structure trees back to bytes.
//!
//! The writer always produces the canonical dense layout: header first,
//! sections in plan order, trailing script text last. Every offset,
//! count and text length field is settled by [`recompute_offsets`]
//! before a single byte is emitted, so a tree that was edited in any
//! way still linearizes consistently.

use std::io::Write;

use tracing::instrument;

use crate::error::Result;
use crate::field::FieldKind;
use crate::tree::ResourceTree;
use crate::types::{NodeId, StructKind};

/// Lays the tree out from scratch and returns its total byte size.
///
/// Members are renumbered, every section offset and count field is
/// rewritten, and each member's trailing text region is repositioned in
/// the plan's dependency order. Runs after every structural edit and
/// again at write time.
pub fn recompute_offsets(tree: &mut ResourceTree) -> Result<usize> {
    let root = tree.root();
    let mut pos = 0usize;

    // Header fields, conditional tail included, keep their file order.
    for child in tree.children(root).to_vec() {
        if tree.as_field(child).is_some() {
            tree.node_mut(child).offset = pos;
            pos += tree.field_ref(child).size;
        }
    }

    let sections: Vec<(StructKind, &'static str)> = tree
        .plan
        .sections
        .iter()
        .map(|s| (s.kind, s.label))
        .collect();
    for (kind, label) in &sections {
        if let Some(offset_id) = tree.section_offset_field(*kind) {
            tree.field_mut(offset_id).set_int(pos as i64)?;
        }
        let members = tree.members(*kind);
        if let Some(count_id) = tree.section_count_field(*kind) {
            tree.field_mut(count_id).set_int(members.len() as i64)?;
        }
        for (index, member) in members.into_iter().enumerate() {
            let numbered = format!("{label} {index}");
            if tree.name(member) != numbered {
                tree.node_mut(member).name = numbered.into();
            }
            tree.node_mut(member).offset = pos;
            for field in tree.children(member).to_vec() {
                tree.node_mut(field).offset = pos;
                pos += tree.field_ref(field).size;
            }
        }
    }

    // Trailing script text regions, packed in dependency order.
    for kind in tree.plan.trailing.clone() {
        for member in tree.members(kind) {
            let length = tree.raw_text(member).map_or(0, <[u8]>::len);
            if let Some(offset_id) = member_field(tree, member, FieldKind::TextOffset) {
                tree.field_mut(offset_id).set_int(pos as i64)?;
            }
            if let Some(length_id) = member_field(tree, member, FieldKind::TextLength) {
                tree.field_mut(length_id).set_int(length as i64)?;
            }
            pos += length;
        }
    }

    tree.size = pos;
    Ok(pos)
}

fn member_field(tree: &ResourceTree, member: NodeId, kind: FieldKind) -> Option<NodeId> {
    tree.children(member)
        .iter()
        .copied()
        .find(|&c| tree.as_field(c).is_some_and(|f| f.kind == kind))
}

/// Linearizes the tree into a fresh buffer.
#[instrument(skip(tree), err)]
pub fn to_bytes(tree: &mut ResourceTree) -> Result<Vec<u8>> {
    let size = recompute_offsets(tree)?;
    let mut out = vec![0u8; size];

    // Offsets were just settled, so every extent below fits the buffer.
    for id in tree.flat_list() {
        let field = tree.field_ref(id);
        let offset = tree.offset(id);
        field.encode_into(&mut out[offset..offset + field.size])?;
    }

    for kind in tree.plan.trailing.clone() {
        for member in tree.members(kind) {
            let Some(text) = tree.raw_text(member) else {
                continue;
            };
            if let Some(offset_id) = member_field(tree, member, FieldKind::TextOffset) {
                let start = tree.field_ref(offset_id).int() as usize;
                out[start..start + text.len()].copy_from_slice(text);
            }
        }
    }

    Ok(out)
}

/// Linearizes the tree and writes it out.
#[instrument(skip_all, err)]
pub fn write_resource<W: Write>(tree: &mut ResourceTree, writer: &mut W) -> Result<()> {
    let bytes = to_bytes(tree)?;
    writer.write_all(&bytes)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_str_eq;
    use tracing_test::traced_test;

    use super::to_bytes;
    use crate::error::Result;
    use crate::read::read_resource;
    use crate::types::{EngineProfile, ResourceType};

    #[traced_test]
    #[test]
    fn empty_dialogue_round_trips() -> Result<()> {
        #[rustfmt::skip]
        let input = [
            // Header
            0x44, 0x4C, 0x47, 0x20, 0x56, 0x31, 0x2E, 0x30, // DLG V1.0
            0x00, 0x00, 0x00, 0x00, // # states
            0x30, 0x00, 0x00, 0x00, // states offset
            0x00, 0x00, 0x00, 0x00, // # responses
            0x30, 0x00, 0x00, 0x00, // responses offset
            0x30, 0x00, 0x00, 0x00, // state triggers offset
            0x00, 0x00, 0x00, 0x00, // # state triggers
            0x30, 0x00, 0x00, 0x00, // response triggers offset
            0x00, 0x00, 0x00, 0x00, // # response triggers
            0x30, 0x00, 0x00, 0x00, // actions offset
            0x00, 0x00, 0x00, 0x00, // # actions
        ];

        let mut tree = read_resource(&input, ResourceType::Dlg, EngineProfile::BaldursGate2)?;
        let actual = to_bytes(&mut tree)?;

        assert_str_eq!(format!("{:02X?}", actual), format!("{:02X?}", input));
        assert_eq!(tree.total_size(), input.len());
        Ok(())
    }
}
