//! Structural and value edits on a parsed tree.
//!
//! Section members are inserted and removed here, with all the
//! bookkeeping the formats demand: section counts, owned ranges and
//! index references pointing across sections. After every structural
//! edit the whole tree is relaid from scratch, so offsets and sizes are
//! always consistent when the next read or write happens. Each edit
//! also records a [`Mutation`](crate::Mutation) for observers to drain.

use tracing::instrument;

use crate::error::{Error, Result};
use crate::field::{string_to_latin1, Field, FieldKind, RefGate, RefPolicy};
use crate::schema::CountSource;
use crate::tree::{Payload, ResourceTree};
use crate::types::{MutationKind, NodeId, StructKind};
use crate::write::recompute_offsets;

/// A reference fixup decided while scanning, applied afterwards.
enum RefFix {
    Shift(NodeId, i64),
    Clear(NodeId),
    ClearAndDropFlag(NodeId, &'static str, u8),
}

impl ResourceTree {
    /// Appends a new member to `kind`'s section and returns its handle.
    ///
    /// Members of an owned range are created through their owner: pass
    /// the node whose range fields cover the section (a dialogue state
    /// for its responses, an ability for its effects, the root for
    /// ranges declared in the header). The new member lands at the end
    /// of the owner's range, every range and index reference behind the
    /// insertion point shifts by one, and the governing count grows.
    /// Without an owner the member is appended at the end of the
    /// section.
    #[instrument(skip(self), err)]
    pub fn add_member(&mut self, kind: StructKind, owner: Option<NodeId>) -> Result<NodeId> {
        let Some(section) = self.plan.section(kind) else {
            return Err(Error::ValueRejected(format!(
                "this resource has no {kind} section"
            )));
        };
        let label = section.label;
        let count_source = section.count;
        if count_source == CountSource::Single {
            return Err(Error::ValueRejected(format!(
                "the {kind} section holds exactly one member"
            )));
        }
        if count_source == CountSource::RangeSum && owner.is_none() {
            return Err(Error::ValueRejected(format!(
                "{kind} members exist only inside an owned range; pass the owning member"
            )));
        }
        let layout = self.member_layout(kind)?;

        let members = self.members(kind);
        let range = match owner {
            Some(owner_id) => {
                let Some((start_id, count_id)) = self.range_fields(owner_id, kind) else {
                    return Err(Error::ValueRejected(format!(
                        "{} owns no range over the {kind} section",
                        self.name(owner_id)
                    )));
                };
                let start = self.field_ref(start_id).int();
                let count = self.field_ref(count_id).int();
                if start < 0 || (start + count) as usize > members.len() {
                    return Err(Error::MalformedLayout {
                        field: self.name(count_id).to_string(),
                        offset: self.offset(count_id),
                        detail: format!(
                            "range {start}+{count} does not fit a section of {} members",
                            members.len()
                        ),
                    });
                }
                Some((start_id, count_id, start, count))
            }
            None => None,
        };
        let index = match range {
            Some((_, _, _, 0)) | None => members.len(),
            Some((_, _, start, count)) => (start + count) as usize,
        };

        // Everything at or behind the insertion point moves up by one.
        if index < members.len() {
            let fixes = self.collect_insert_fixes(kind, index as i64);
            self.apply_fixes(fixes)?;
        }
        if let Some((start_id, count_id, _, count)) = range {
            if count == 0 {
                self.field_mut(start_id).set_int(index as i64)?;
                self.note_field_update(start_id);
            }
            self.shift_int(count_id, 1)?;
        }
        if let Some(count_id) = self.section_count_field(kind) {
            self.shift_int(count_id, 1)?;
        }

        let position = if index < members.len() {
            let shifted = members[index];
            self.child_position(self.root(), shifted)
                .expect("section members are children of the root")
        } else {
            self.position_after_section(kind)
        };
        let member = self.insert_struct_at(
            self.root(),
            position,
            format!("{label} {index}"),
            kind,
        );
        for fp in &layout {
            self.push_field(member, fp.name, 0, Field::empty(fp.kind, fp.size));
        }
        self.push_event(MutationKind::Insert, self.root(), position, position + 1);

        recompute_offsets(self)?;
        Ok(member)
    }

    /// Removes a section member, fixing every reference to its section.
    ///
    /// Index references behind the removed position shift down, ranges
    /// containing it shrink, and a reference hitting the removed index
    /// exactly follows its schema declared policy: cleared to -1,
    /// zeroed with its gate flag dropped, or refused. A refused removal
    /// fails with [`Error::ReferentialIntegrity`] unless the caller
    /// passes `allow_dangling`, which leaves -1 behind instead.
    #[instrument(skip(self), err)]
    pub fn remove_member(&mut self, id: NodeId, allow_dangling: bool) -> Result<()> {
        let Some(kind) = self.kind(id) else {
            return Err(Error::ValueRejected(
                "only section members can be removed".to_string(),
            ));
        };
        let single = self
            .plan
            .section(kind)
            .is_some_and(|s| s.count == CountSource::Single);
        if single {
            return Err(Error::ValueRejected(format!(
                "the {kind} section holds exactly one member"
            )));
        }
        let Some(index) = self.member_position(id) else {
            return Err(Error::ValueRejected(format!(
                "{} is not a live section member",
                self.name(id)
            )));
        };
        let index = index as i64;

        // Refuse before mutating anything: a forbidden live reference
        // means the whole removal never happened.
        if !allow_dangling {
            for field_id in self.live_refs_to(kind) {
                let field = self.field_ref(field_id);
                let FieldKind::PoolIndex { on_removed, .. } = field.kind else {
                    continue;
                };
                if field.int() == index && on_removed == RefPolicy::Forbid {
                    return Err(Error::ReferentialIntegrity {
                        referrer: self.describe_field(field_id),
                        index,
                    });
                }
            }
        }

        let fixes = self.collect_remove_fixes(kind, index);
        self.apply_fixes(fixes)?;
        self.fix_ranges_for_removal(kind, index)?;
        if let Some(count_id) = self.section_count_field(kind) {
            self.shift_int(count_id, -1)?;
        }

        let position = self
            .detach_child(self.root(), id)
            .expect("member is a child of the root");
        self.push_event(MutationKind::Remove, self.root(), position, position + 1);

        recompute_offsets(self)?;
        Ok(())
    }

    /// Pastes a copied value into an existing slot.
    ///
    /// Only the value moves. The slot keeps its own name, offset and
    /// position, so a paste can never disturb the tree's layout.
    pub fn paste_value(&mut self, target: NodeId, source: &Field) -> Result<()> {
        self.update_leaf(target, |field| field.paste_from(source))
    }

    /// Replaces a numeric field's value.
    pub fn set_int(&mut self, id: NodeId, value: i64) -> Result<()> {
        self.update_leaf(id, |field| field.set_int(value))
    }

    /// Parses text input into a numeric field.
    pub fn set_int_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        self.update_leaf(id, |field| field.set_int_text(text))
    }

    /// Replaces a text or resource name field's value.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        self.update_leaf(id, |field| field.set_text(text))
    }

    /// Sets or clears one bit of a flags field.
    pub fn set_flag_bit(&mut self, id: NodeId, bit: u8, on: bool) -> Result<()> {
        self.update_leaf(id, |field| field.set_flag_bit(bit, on))
    }

    /// Stores one component of a packed field, clamping to its bits.
    pub fn set_packed_part(&mut self, id: NodeId, part: usize, value: i64) -> Result<()> {
        self.update_leaf(id, |field| field.set_packed_part(part, value))
    }

    /// Replaces the trailing script text a member owns.
    ///
    /// The member's text offset and length fields are settled by the
    /// relayout this triggers, as are the text regions of every member
    /// behind it.
    pub fn set_script_text(&mut self, id: NodeId, text: &str) -> Result<()> {
        if self.field_of_kind(id, FieldKind::TextOffset).is_none() {
            return Err(Error::ValueRejected(format!(
                "{} owns no script text",
                self.name(id)
            )));
        }
        let Some(position) = self.child_position(self.root(), id) else {
            return Err(Error::ValueRejected(
                "only section members own script text".to_string(),
            ));
        };
        let raw = string_to_latin1(text)?;
        self.set_raw_text(id, Some(raw));
        self.push_event(MutationKind::Update, self.root(), position, position + 1);
        recompute_offsets(self)?;
        Ok(())
    }

    fn update_leaf(
        &mut self,
        id: NodeId,
        op: impl FnOnce(&mut Field) -> Result<()>,
    ) -> Result<()> {
        let Some(parent) = self.node(id).parent else {
            return Err(Error::ValueRejected(
                "the root holds no single value".to_string(),
            ));
        };
        let position = self
            .child_position(parent, id)
            .expect("fields are children of their parent");
        op(self.leaf_mut(id)?)?;
        self.push_event(MutationKind::Update, parent, position, position + 1);
        Ok(())
    }

    fn leaf_mut(&mut self, id: NodeId) -> Result<&mut Field> {
        let name = self.name(id).to_string();
        match &mut self.node_mut(id).payload {
            Payload::Field(field) => Ok(field),
            Payload::Struct(_) => Err(Error::ValueRejected(format!(
                "{name} is a structure, not a value"
            ))),
        }
    }

    /// The `(start, count)` fields of `owner`'s range over `kind`.
    fn range_fields(&self, owner: NodeId, kind: StructKind) -> Option<(NodeId, NodeId)> {
        let start = self.field_of_kind(owner, FieldKind::PoolStart { of: kind })?;
        let count = self.field_of_kind(owner, FieldKind::PoolCount { of: kind })?;
        Some((start, count))
    }

    /// Child position right behind the last member of `kind`'s section.
    fn position_after_section(&self, kind: StructKind) -> usize {
        let rank = self.section_rank(kind);
        let children = self.children(self.root());
        children
            .iter()
            .position(|&c| match self.kind(c) {
                Some(k) => self.section_rank(k) > rank,
                None => false,
            })
            .unwrap_or(children.len())
    }

    fn section_rank(&self, kind: StructKind) -> usize {
        self.plan
            .sections
            .iter()
            .position(|s| s.kind == kind)
            .unwrap_or(usize::MAX)
    }

    /// Index references into `kind`'s section that are currently live
    /// by their own gate.
    fn live_refs_to(&self, kind: StructKind) -> Vec<NodeId> {
        self.flat_list()
            .filter(|&id| {
                self.as_field(id).is_some_and(
                    |f| matches!(f.kind, FieldKind::PoolIndex { of, .. } if of == kind),
                ) && self.ref_is_live(id)
            })
            .collect()
    }

    fn ref_is_live(&self, id: NodeId) -> bool {
        let field = self.field_ref(id);
        let FieldKind::PoolIndex { gate, .. } = field.kind else {
            return false;
        };
        match gate {
            RefGate::NonNegative => field.int() >= 0,
            RefGate::FlagSet { field: name, bit } => self
                .gate_flag(id, name)
                .is_some_and(|flags| flags.flag(bit)),
            RefGate::FlagClear { field: name, bit } => self
                .gate_flag(id, name)
                .is_some_and(|flags| !flags.flag(bit)),
        }
    }

    /// The sibling flags field a reference gate names.
    fn gate_flag(&self, of: NodeId, name: &str) -> Option<&Field> {
        let sibling = self.sibling_field(of, name)?;
        self.as_field(sibling)
    }

    fn sibling_field(&self, of: NodeId, name: &str) -> Option<NodeId> {
        let parent = self.node(of).parent?;
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.name(c) == name && self.as_field(c).is_some())
    }

    fn collect_insert_fixes(&self, kind: StructKind, index: i64) -> Vec<RefFix> {
        let mut fixes = Vec::new();
        for id in self.live_refs_to(kind) {
            if self.field_ref(id).int() >= index {
                fixes.push(RefFix::Shift(id, 1));
            }
        }
        for id in self.flat_list() {
            let Some(field) = self.as_field(id) else {
                continue;
            };
            if matches!(field.kind, FieldKind::PoolStart { of } if of == kind)
                && field.int() >= index
            {
                fixes.push(RefFix::Shift(id, 1));
            }
        }
        fixes
    }

    fn collect_remove_fixes(&self, kind: StructKind, index: i64) -> Vec<RefFix> {
        let mut fixes = Vec::new();
        for id in self.live_refs_to(kind) {
            let field = self.field_ref(id);
            let FieldKind::PoolIndex { on_removed, .. } = field.kind else {
                continue;
            };
            let value = field.int();
            if value > index {
                fixes.push(RefFix::Shift(id, -1));
            } else if value == index {
                match on_removed {
                    RefPolicy::ClearToNone | RefPolicy::Forbid => {
                        fixes.push(RefFix::Clear(id));
                    }
                    RefPolicy::ClearFlag { field, bit } => {
                        fixes.push(RefFix::ClearAndDropFlag(id, field, bit));
                    }
                }
            }
        }
        fixes
    }

    fn apply_fixes(&mut self, fixes: Vec<RefFix>) -> Result<()> {
        for fix in fixes {
            match fix {
                RefFix::Shift(id, delta) => self.shift_int(id, delta)?,
                RefFix::Clear(id) => {
                    self.field_mut(id).set_int(-1)?;
                    self.note_field_update(id);
                }
                RefFix::ClearAndDropFlag(id, flag_name, bit) => {
                    self.field_mut(id).set_int(0)?;
                    self.note_field_update(id);
                    match self.sibling_field(id, flag_name) {
                        Some(flags) => {
                            self.field_mut(flags).set_flag_bit(bit, false)?;
                            self.note_field_update(flags);
                        }
                        None => tracing::warn!(
                            field = flag_name,
                            "reference policy names a missing flags field"
                        ),
                    }
                }
            }
        }
        Ok(())
    }

    /// Shrinks or shifts every range over `kind` around a removal.
    fn fix_ranges_for_removal(&mut self, kind: StructKind, index: i64) -> Result<()> {
        let mut shifts = Vec::new();
        for id in self.flat_list() {
            let Some(field) = self.as_field(id) else {
                continue;
            };
            let FieldKind::PoolStart { of } = field.kind else {
                continue;
            };
            if of != kind {
                continue;
            }
            let start = field.int();
            let count = self
                .node(id)
                .parent
                .and_then(|p| self.field_of_kind(p, FieldKind::PoolCount { of: kind }))
                .map(|c| (c, self.field_ref(c).int()));
            if start > index {
                shifts.push(RefFix::Shift(id, -1));
            } else if let Some((count_id, count)) = count {
                if start <= index && index < start + count {
                    shifts.push(RefFix::Shift(count_id, -1));
                }
            }
        }
        self.apply_fixes(shifts)
    }

    fn shift_int(&mut self, id: NodeId, delta: i64) -> Result<()> {
        let value = self.field_ref(id).int();
        self.field_mut(id).set_int(value + delta)?;
        self.note_field_update(id);
        Ok(())
    }

    fn note_field_update(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            if let Some(position) = self.child_position(parent, id) {
                self.push_event(MutationKind::Update, parent, position, position + 1);
            }
        }
    }

    /// A field named through its owning structure, for diagnostics.
    fn describe_field(&self, id: NodeId) -> String {
        match self.node(id).parent {
            Some(parent) => format!("{} of {}", self.name(id), self.name(parent)),
            None => self.name(id).to_string(),
        }
    }
}
