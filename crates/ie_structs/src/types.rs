//! Shared vocabulary for the resource structure model.

use derive_more::derive::{Display, From, Into};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Resource formats this library ships layout tables for.
///
/// The variant names follow the on-disk file extensions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ResourceType {
    /// Dialogue trees
    #[display("DLG")]
    Dlg,
    /// Items
    #[display("ITM")]
    Itm,
    /// Spells
    #[display("SPL")]
    Spl,
    /// Creatures
    #[display("CRE")]
    Cre,
}

impl ResourceType {
    /// Resolves a file extension, case insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_uppercase().as_str() {
            "DLG" => Some(Self::Dlg),
            "ITM" => Some(Self::Itm),
            "SPL" => Some(Self::Spl),
            "CRE" => Some(Self::Cre),
            _ => None,
        }
    }

    /// Like [`ResourceType::from_extension`] but failing with
    /// [`Error::UnknownResourceType`](crate::Error::UnknownResourceType).
    pub fn parse(ext: &str) -> crate::Result<Self> {
        Self::from_extension(ext).ok_or_else(|| crate::Error::UnknownResourceType(ext.to_string()))
    }

    /// The canonical upper case file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Dlg => "DLG",
            Self::Itm => "ITM",
            Self::Spl => "SPL",
            Self::Cre => "CRE",
        }
    }
}

/// Game variants that share these formats but not every field of them.
///
/// Layout differences are looked up per capability through
/// [`EngineProfile::has`]; no profile is treated as a refinement of
/// another.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum EngineProfile {
    /// Baldur's Gate
    #[display("bg1")]
    BaldursGate,
    /// Baldur's Gate II
    #[default]
    #[display("bg2")]
    BaldursGate2,
    /// Planescape: Torment
    #[display("pst")]
    Torment,
    /// Icewind Dale
    #[display("iwd")]
    IcewindDale,
}

/// Layout extensions a game variant can carry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Spell ability records end with an extra four byte duration.
    AbilityDuration,
}

impl EngineProfile {
    /// Whether this game variant stores the given layout extension.
    pub fn has(self, capability: Capability) -> bool {
        matches!(
            (self, capability),
            (Self::Torment, Capability::AbilityDuration)
        )
    }
}

/// The species of a structure node.
///
/// Kinds identify sections when bookkeeping fields point across the tree
/// and decide what [`add_member`](crate::ResourceTree::add_member) creates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum StructKind {
    /// The resource itself
    #[display("Resource")]
    Root,
    /// Dialogue state
    #[display("State")]
    State,
    /// Dialogue response
    #[display("Response")]
    Response,
    /// State trigger script
    #[display("State trigger")]
    StateTrigger,
    /// Response trigger script
    #[display("Response trigger")]
    ResponseTrigger,
    /// Response action script
    #[display("Action")]
    Action,
    /// Item or spell ability
    #[display("Ability")]
    Ability,
    /// Applied effect
    #[display("Effect")]
    Effect,
    /// Known spell entry
    #[display("Known spell")]
    KnownSpell,
    /// Spell memorization info per level
    #[display("Memorization info")]
    MemorizationInfo,
    /// Memorized spell entry
    #[display("Memorized spell")]
    MemorizedSpell,
    /// Inventory slot block
    #[display("Item slots")]
    ItemSlots,
    /// Inventory item
    #[display("Item")]
    Item,
}

/// Handle to a node inside a [`ResourceTree`](crate::ResourceTree).
///
/// Handles stay valid for the life of a tree. A handle to a removed
/// member still resolves, but the node is detached and no longer reached
/// from the root.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, From, Into, Display)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// What one tree operation did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MutationKind {
    /// Members appeared under the parent
    Insert,
    /// Members left the parent
    Remove,
    /// A value changed in place
    Update,
}

/// One entry of the tree's drained change feed.
///
/// `first..last` addresses child positions under `parent` at the time the
/// operation ran.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Mutation {
    /// What happened
    pub kind: MutationKind,
    /// Node whose children were touched
    pub parent: NodeId,
    /// First affected child position
    pub first: usize,
    /// Exclusive end of the affected span
    pub last: usize,
}
