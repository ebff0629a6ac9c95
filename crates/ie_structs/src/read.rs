//! Parsing resource buffers into structure trees.

use tracing::instrument;

use crate::error::{Error, Result};
use crate::field::{latin1_to_string, Field, FieldKind};
use crate::formats;
use crate::schema::{fields_size, CountSource, ExtWhen, FieldPlan, HeaderExt, SectionPlan};
use crate::tree::ResourceTree;
use crate::types::{EngineProfile, NodeId, ResourceType};

/// Parses one resource buffer into its structure tree.
///
/// The tree comes back complete or not at all: an unsupported version or
/// a broken layout fails the whole parse, and nothing partial escapes.
/// Section offsets are taken as the header declares them, so a file with
/// slack between sections parses fine; its canonical size is settled
/// again at write time.
#[instrument(skip(data), err)]
pub fn read_resource(
    data: &[u8],
    rtype: ResourceType,
    profile: EngineProfile,
) -> Result<ResourceTree> {
    let schema = formats::schema_for(rtype);

    if data.len() < 8 {
        return Err(Error::MalformedLayout {
            field: "Signature".to_string(),
            offset: 0,
            detail: "file is shorter than a signature and version".to_string(),
        });
    }
    let signature = four_bytes(data, 0);
    let version = four_bytes(data, 4);
    if &signature != schema.signature || !schema.versions.iter().any(|v| **v == version) {
        return Err(Error::UnsupportedVersion {
            rtype: rtype.to_string(),
            signature: latin1_to_string(&signature).trim_end().to_string(),
            version: latin1_to_string(&version).trim_end().to_string(),
        });
    }

    let plan = (schema.plan)(&version, profile);
    let mut tree = ResourceTree::new(rtype, version, profile, plan);
    let root = tree.root();

    // Header, then any conditional tail the section offsets reveal.
    let mut pos = 0usize;
    let header: Vec<FieldPlan> = tree.plan.header.clone();
    for fp in header {
        pos = push_field_at(&mut tree, root, data, pos, fp)?;
    }
    let tails: Vec<HeaderExt> = tree.plan.header_ext.clone();
    for tail in tails {
        if tail_present(&tree, &tail) {
            for fp in tail.fields {
                pos = push_field_at(&mut tree, root, data, pos, fp)?;
            }
        }
    }

    let mut end = pos;
    let sections: Vec<SectionPlan> = tree.plan.sections.clone();
    for section in &sections {
        end = end.max(read_section(&mut tree, data, section)?);
    }

    tree.size = end;
    Ok(tree)
}

fn four_bytes(data: &[u8], at: usize) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&data[at..at + 4]);
    out
}

fn slice_at<'d>(data: &'d [u8], offset: usize, size: usize, field: &str) -> Result<&'d [u8]> {
    offset
        .checked_add(size)
        .and_then(|bound| data.get(offset..bound))
        .ok_or_else(|| Error::MalformedLayout {
            field: field.to_string(),
            offset,
            detail: format!("{size} bytes run past the end of the file"),
        })
}

fn push_field_at(
    tree: &mut ResourceTree,
    parent: NodeId,
    data: &[u8],
    pos: usize,
    fp: FieldPlan,
) -> Result<usize> {
    let raw = slice_at(data, pos, fp.size, fp.name)?;
    let field = Field::from_bytes(fp.kind, fp.size, raw)?;
    tree.push_field(parent, fp.name, pos, field);
    Ok(pos + fp.size)
}

fn tail_present(tree: &ResourceTree, tail: &HeaderExt) -> bool {
    match tail.when {
        ExtWhen::SectionOffsetBeyond { of, beyond } => tree
            .section_offset_field(of)
            .is_some_and(|id| tree.field_ref(id).int() > beyond),
    }
}

/// Reads one section's members at their header declared offset.
///
/// Returns the furthest byte the section touches, trailing script text
/// included, so the caller can account for the file's true extent.
fn read_section(tree: &mut ResourceTree, data: &[u8], section: &SectionPlan) -> Result<usize> {
    let offset_id = tree
        .section_offset_field(section.kind)
        .ok_or_else(|| Error::MalformedLayout {
            field: section.label.to_string(),
            offset: 0,
            detail: "no header field declares where this section starts".to_string(),
        })?;
    let base = tree.field_ref(offset_id).int() as usize;
    let offset_name = tree.name(offset_id).to_string();

    let count = match section.count {
        CountSource::HeaderField => {
            let count_id =
                tree.section_count_field(section.kind)
                    .ok_or_else(|| Error::MalformedLayout {
                        field: section.label.to_string(),
                        offset: base,
                        detail: "no header field declares how many members this section has"
                            .to_string(),
                    })?;
            tree.field_ref(count_id).int() as usize
        }
        CountSource::RangeSum => tree.pool_count_sum(section.kind) as usize,
        CountSource::Single => 1,
    };
    if count == 0 {
        return Ok(0);
    }

    let member_fields = tree.member_layout(section.kind)?;
    let member_size = fields_size(&member_fields);
    slice_at(data, base, count * member_size, &offset_name)?;

    let root = tree.root();
    let mut max_end = base + count * member_size;
    for index in 0..count {
        let member_offset = base + index * member_size;
        let member = tree.push_struct(
            root,
            format!("{} {index}", section.label),
            member_offset,
            section.kind,
        );

        let mut pos = member_offset;
        let mut text_offset = None;
        let mut text_length = None;
        for fp in &member_fields {
            let raw = slice_at(data, pos, fp.size, fp.name)?;
            let field = Field::from_bytes(fp.kind, fp.size, raw)?;
            match fp.kind {
                FieldKind::TextOffset => text_offset = Some((field.int() as usize, fp.name)),
                FieldKind::TextLength => text_length = Some(field.int() as usize),
                _ => {}
            }
            tree.push_field(member, fp.name, pos, field);
            pos += fp.size;
        }

        if let (Some((toff, toff_name)), Some(tlen)) = (text_offset, text_length) {
            let raw = slice_at(data, toff, tlen, toff_name)?;
            tree.set_raw_text(member, Some(raw.to_vec()));
            max_end = max_end.max(toff + tlen);
        }
    }
    Ok(max_end)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::read_resource;
    use crate::error::Error;
    use crate::types::{EngineProfile, ResourceType};

    #[test]
    fn a_stub_of_a_file_is_malformed() {
        let result = read_resource(b"DLG", ResourceType::Dlg, EngineProfile::BaldursGate2);
        assert!(matches!(result, Err(Error::MalformedLayout { .. })));
    }

    #[test]
    fn wrong_signature_is_unsupported() {
        #[rustfmt::skip]
        let input = [
            0x58, 0x58, 0x58, 0x20, 0x56, 0x31, 0x2E, 0x30, // XXX V1.0
        ];

        let result = read_resource(&input, ResourceType::Dlg, EngineProfile::BaldursGate2);
        let Err(Error::UnsupportedVersion {
            rtype,
            signature,
            version,
        }) = result
        else {
            panic!("expected an unsupported version error");
        };
        assert_eq!(rtype, "DLG");
        assert_eq!(signature, "XXX");
        assert_eq!(version, "V1.0");
    }

    #[test]
    fn section_past_the_end_is_malformed() {
        #[rustfmt::skip]
        let input = [
            // Header
            0x44, 0x4C, 0x47, 0x20, 0x56, 0x31, 0x2E, 0x30, // DLG V1.0
            0x01, 0x00, 0x00, 0x00, // # states
            0x30, 0x00, 0x00, 0x00, // states offset
            0x00, 0x00, 0x00, 0x00, // # responses
            0x00, 0x00, 0x00, 0x00, // responses offset
            0x00, 0x00, 0x00, 0x00, // state triggers offset
            0x00, 0x00, 0x00, 0x00, // # state triggers
            0x00, 0x00, 0x00, 0x00, // response triggers offset
            0x00, 0x00, 0x00, 0x00, // # response triggers
            0x00, 0x00, 0x00, 0x00, // actions offset
            0x00, 0x00, 0x00, 0x00, // # actions
        ];

        let result = read_resource(&input, ResourceType::Dlg, EngineProfile::BaldursGate2);
        let Err(Error::MalformedLayout { field, offset, .. }) = result else {
            panic!("expected a malformed layout error");
        };
        assert_eq!(field, "States offset");
        assert_eq!(offset, 0x30);
    }
}
