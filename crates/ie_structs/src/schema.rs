//! Layout plans: the data that tells the reader and writer what a
//! resource looks like.
//!
//! A format module contributes a [`Schema`]; calling its `plan` hook with
//! the parsed version and the game variant yields the concrete
//! [`ResourcePlan`] the reader walks. Plans are plain data, so a new
//! format is a new table, not new reader code.

use crate::field::{BitLabels, FieldKind, PackedPart, RefGate, RefPolicy};
use crate::types::{EngineProfile, ResourceType, StructKind};

/// One field slot of a header or member layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldPlan {
    /// Display name
    pub name: &'static str,
    /// Datatype
    pub kind: FieldKind,
    /// Width in bytes
    pub size: usize,
}

/// A resource format: identity plus the hook that builds its plan.
pub struct Schema {
    /// Format this schema reads
    pub rtype: ResourceType,
    /// Expected signature bytes
    pub signature: &'static [u8; 4],
    /// Accepted version strings
    pub versions: &'static [&'static [u8; 4]],
    /// Builds the concrete layout for one version and game variant
    pub plan: fn(version: &[u8; 4], profile: EngineProfile) -> ResourcePlan,
}

/// Concrete layout of one resource version.
#[derive(Debug, Clone)]
pub struct ResourcePlan {
    /// Header fields in file order, signature and version included
    pub header: Vec<FieldPlan>,
    /// Conditional header tails
    pub header_ext: Vec<HeaderExt>,
    /// Sections in canonical file order
    pub sections: Vec<SectionPlan>,
    /// Order of the trailing script text regions
    pub trailing: Vec<StructKind>,
}

impl ResourcePlan {
    /// The plan of one section, by species.
    pub fn section(&self, kind: StructKind) -> Option<&SectionPlan> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self {
            header: Vec::new(),
            header_ext: Vec::new(),
            sections: Vec::new(),
            trailing: Vec::new(),
        }
    }
}

/// Extra header fields present only in some files of a version.
#[derive(Debug, Clone)]
pub struct HeaderExt {
    /// When the tail exists
    pub when: ExtWhen,
    /// The fields it adds, in file order
    pub fields: Vec<FieldPlan>,
}

/// Predicate deciding whether a header tail is present.
#[derive(Debug, Clone, Copy)]
pub enum ExtWhen {
    /// The named section starts beyond this baseline header size, so the
    /// bytes in between belong to the tail.
    SectionOffsetBeyond {
        /// Section whose header offset is consulted
        of: StructKind,
        /// Baseline header size without the tail
        beyond: i64,
    },
}

/// Layout of one section.
#[derive(Debug, Clone)]
pub struct SectionPlan {
    /// Member species
    pub kind: StructKind,
    /// Member display name, numbered per position
    pub label: &'static str,
    /// Where the member count comes from
    pub count: CountSource,
    /// Member field layout
    pub member: MemberPlan,
}

/// Where a section's member count comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSource {
    /// A header field of kind [`FieldKind::SectionCount`] for this section
    HeaderField,
    /// The sum of every pool range targeting this section; no count field
    /// exists anywhere
    RangeSum,
    /// Exactly one member and no count field
    Single,
}

/// Field layout of a section member.
#[derive(Debug, Clone)]
pub enum MemberPlan {
    /// Every member shares one layout
    Fields(Vec<FieldPlan>),
    /// A header field selects between layouts for the whole section
    ByHeaderField {
        /// Name of the selecting header field
        selector: &'static str,
        /// Accepted selector values and their layouts
        arms: Vec<(i64, Vec<FieldPlan>)>,
    },
}

impl MemberPlan {
    /// The concrete field list, given the header selector value when one
    /// is needed.
    pub fn resolve(&self, selector_value: Option<i64>) -> Option<&[FieldPlan]> {
        match self {
            Self::Fields(fields) => Some(fields),
            Self::ByHeaderField { arms, .. } => {
                let value = selector_value?;
                arms.iter()
                    .find(|(accepted, _)| *accepted == value)
                    .map(|(_, fields)| fields.as_slice())
            }
        }
    }
}

/// Byte size of a member layout.
pub fn fields_size(fields: &[FieldPlan]) -> usize {
    fields.iter().map(|f| f.size).sum()
}

/// Unsigned decimal field.
pub const fn dec(name: &'static str, size: usize) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::Dec { signed: false },
        size,
    }
}

/// Signed decimal field.
pub const fn dec_signed(name: &'static str, size: usize) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::Dec { signed: true },
        size,
    }
}

/// Hexadecimal field.
pub const fn hex(name: &'static str, size: usize) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::Hex,
        size,
    }
}

/// String table reference.
pub const fn strref(name: &'static str) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::StrRef,
        size: 4,
    }
}

/// Fixed width text.
pub const fn text(name: &'static str, size: usize) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::Text,
        size,
    }
}

/// Resource name.
pub const fn resref(name: &'static str) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::ResRef,
        size: 8,
    }
}

/// Reserved bytes.
pub const fn unknown(name: &'static str, size: usize) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::Unknown,
        size,
    }
}

/// Labeled bit set.
pub const fn flags(name: &'static str, size: usize, labels: BitLabels) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::Flags { labels },
        size,
    }
}

/// Symbol mapped value.
pub const fn ident(name: &'static str, size: usize, table: &'static str) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::Ident { table },
        size,
    }
}

/// Packed components.
pub const fn packed(name: &'static str, size: usize, parts: &'static [PackedPart]) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::Packed { parts },
        size,
    }
}

/// Header offset of a section.
pub const fn sec_off(name: &'static str, of: StructKind) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::SectionOffset { of },
        size: 4,
    }
}

/// Header count of a section.
pub const fn sec_cnt(name: &'static str, of: StructKind, size: usize) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::SectionCount { of },
        size,
    }
}

/// First member of an owned range.
pub const fn pool_start(name: &'static str, of: StructKind, size: usize) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::PoolStart { of },
        size,
    }
}

/// Length of an owned range.
pub const fn pool_cnt(name: &'static str, of: StructKind, size: usize) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::PoolCount { of },
        size,
    }
}

/// Singular member reference.
pub const fn pool_idx(
    name: &'static str,
    of: StructKind,
    size: usize,
    gate: RefGate,
    on_removed: RefPolicy,
) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::PoolIndex {
            of,
            gate,
            on_removed,
        },
        size,
    }
}

/// Offset of a member's trailing script text.
pub const fn text_off(name: &'static str) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::TextOffset,
        size: 4,
    }
}

/// Length of a member's trailing script text.
pub const fn text_len(name: &'static str) -> FieldPlan {
    FieldPlan {
        name,
        kind: FieldKind::TextLength,
        size: 4,
    }
}
