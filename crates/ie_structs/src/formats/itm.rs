//! **ITM V1** item resources.
//!
//! ## Header (0x72 bytes)
//!
//! | Offset | Size | Field                       |
//! |--------|------|-----------------------------|
//! | 0x0000 | 4    | Signature (`ITM `)          |
//! | 0x0004 | 4    | Version (`V1  `)            |
//! | 0x0008 | 4    | General name (strref)       |
//! | 0x000c | 4    | Identified name (strref)    |
//! | 0x0010 | 8    | Used up item (resref)       |
//! | 0x0018 | 4    | Flags                       |
//! | 0x001c | 2    | Category                    |
//! | 0x001e | 4    | Unusable by                 |
//! | 0x0022 | 2    | Equipped appearance         |
//! | 0x0024 | ..   | Requirements, price, icons, descriptions |
//! | 0x0064 | 4    | Abilities offset            |
//! | 0x0068 | 2    | # abilities                 |
//! | 0x006a | 4    | Effects offset              |
//! | 0x006e | 2    | First equipped effect       |
//! | 0x0070 | 2    | # equipped effects          |
//!
//! ## Records
//!
//! - **Ability** (56 bytes): one use of the item, owning a range of the
//!   effect pool through its first-effect index and effect count.
//! - **Effect** (48 bytes, shared layout): the effect pool has no header
//!   count of its own — its size is the sum of every ability's effect
//!   count plus the header's equipped effect count.

use crate::field::BitLabels;
use crate::schema::{
    dec, dec_signed, flags, ident, pool_cnt, pool_start, resref, sec_cnt, sec_off, strref, text,
    unknown, CountSource, FieldPlan, MemberPlan, ResourcePlan, Schema, SectionPlan,
};
use crate::types::{EngineProfile, ResourceType, StructKind};

const ITEM_FLAGS: BitLabels = &[
    (0, "Critical item"),
    (1, "Two-handed"),
    (2, "Movable"),
    (3, "Displayable"),
    (4, "Cursed"),
    (5, "Cannot scribe"),
    (6, "Magical"),
    (7, "Bow"),
    (8, "Silver"),
    (9, "Cold iron"),
    (10, "Stolen"),
];

const ABILITY_FLAGS: BitLabels = &[
    (0, "Add strength bonus"),
    (1, "Breakable"),
    (10, "Hostile"),
    (11, "Recharge after resting"),
];

static SCHEMA: Schema = Schema {
    rtype: ResourceType::Itm,
    signature: b"ITM ",
    versions: &[b"V1  "],
    plan,
};

/// The ITM schema.
pub fn schema() -> &'static Schema {
    &SCHEMA
}

fn ability_fields() -> Vec<FieldPlan> {
    vec![
        dec("Type", 1),
        dec("Identify to use", 1),
        dec("Location", 1),
        dec("Alternative dice sides", 1),
        resref("Use icon"),
        dec("Target", 1),
        dec("# targets", 1),
        dec("Range", 2),
        dec("Launcher required", 1),
        dec("Alternative # dice thrown", 1),
        dec("Speed factor", 1),
        dec_signed("Alternative damage bonus", 1),
        dec_signed("THAC0 bonus", 2),
        dec("Dice sides", 1),
        dec("# dice thrown", 1),
        dec_signed("Damage bonus", 2),
        dec("Damage type", 2),
        pool_cnt("# effects", StructKind::Effect, 2),
        pool_start("First effect index", StructKind::Effect, 2),
        dec("# charges", 2),
        dec("Charge depletion", 2),
        flags("Flags", 4, ABILITY_FLAGS),
        dec("Projectile animation", 2),
        unknown("Melee animation", 6),
        dec("Arrow qualifier", 2),
        dec("Bolt qualifier", 2),
        dec("Bullet qualifier", 2),
        unknown("Unused", 2),
    ]
}

fn plan(_version: &[u8; 4], _profile: EngineProfile) -> ResourcePlan {
    ResourcePlan {
        header: vec![
            text("Signature", 4),
            text("Version", 4),
            strref("General name"),
            strref("Identified name"),
            resref("Used up item"),
            flags("Flags", 4, ITEM_FLAGS),
            ident("Category", 2, "itemtype"),
            flags("Unusable by", 4, &[]),
            text("Equipped appearance", 2),
            dec("Minimum level", 2),
            dec("Minimum strength", 2),
            dec("Minimum strength bonus", 1),
            dec("Kit usability 1", 1),
            dec("Minimum intelligence", 1),
            dec("Kit usability 2", 1),
            dec("Minimum dexterity", 1),
            dec("Kit usability 3", 1),
            dec("Minimum wisdom", 1),
            dec("Kit usability 4", 1),
            dec("Minimum constitution", 1),
            ident("Weapon proficiency", 1, "stats"),
            dec("Minimum charisma", 2),
            dec("Price", 4),
            dec("Stack amount", 2),
            resref("Inventory icon"),
            dec("Lore to identify", 2),
            resref("Ground icon"),
            dec("Weight", 4),
            strref("General description"),
            strref("Identified description"),
            resref("Description icon"),
            dec("Enchantment", 4),
            sec_off("Abilities offset", StructKind::Ability),
            sec_cnt("# abilities", StructKind::Ability, 2),
            sec_off("Effects offset", StructKind::Effect),
            pool_start("First equipped effect", StructKind::Effect, 2),
            pool_cnt("# equipped effects", StructKind::Effect, 2),
        ],
        header_ext: Vec::new(),
        sections: vec![
            SectionPlan {
                kind: StructKind::Ability,
                label: "Ability",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(ability_fields()),
            },
            SectionPlan {
                kind: StructKind::Effect,
                label: "Effect",
                count: CountSource::RangeSum,
                member: MemberPlan::Fields(super::effect_fields_v1()),
            },
        ],
        trailing: Vec::new(),
    }
}
