//! **CRE V1.0** creature resources.
//!
//! The largest shipped table: a 0x2d4 byte header of stats, saves,
//! resistances, skills, a hundred soundset strrefs (all sharing one
//! name, disambiguated by offset), scripts and identifiers, followed by
//! five sections and the fixed item slot block.
//!
//! ## Header (0x2d4 bytes, abridged)
//!
//! | Offset | Size | Field                         |
//! |--------|------|-------------------------------|
//! | 0x0000 | 8    | Signature (`CRE `) + version  |
//! | 0x0008 | 8    | Long/short name (strrefs)     |
//! | 0x0010 | 20   | Flags, XP, gold, status       |
//! | 0x0024 | 16   | Hit points, animation, colors |
//! | 0x0033 | 1    | Effect version (0 or 1)       |
//! | 0x0034 | 16   | Portraits                     |
//! | 0x0044 | 42   | Reputation, AC, saves, resistances, skills |
//! | 0x006e | 8    | Weapon proficiencies          |
//! | 0x00a4 | 400  | 100 soundset strrefs          |
//! | 0x0234 | 76   | Levels, abilities, morale, kit, scripts, identifiers |
//! | 0x0280 | 32   | Death variable                |
//! | 0x02a0 | 44   | Section offsets and counts    |
//! | 0x02cc | 8    | Dialogue (resref)             |
//!
//! ## Records
//!
//! - **Known spell** (12 bytes).
//! - **Memorization info** (16 bytes): per class level, owning a range
//!   of the memorized spell section.
//! - **Memorized spell** (12 bytes).
//! - **Effect**: the header's effect version byte selects the whole
//!   section's layout, 48 bytes (version 0) or 264 bytes (version 1).
//! - **Item** (20 bytes).
//! - **Item slots** (80 bytes, exactly one): 38 two-byte indices into
//!   the item section (-1 for an empty slot) plus the selected weapon
//!   slot and ability.

use crate::field::{BitLabels, RefGate, RefPolicy};
use crate::schema::{
    dec, dec_signed, flags, hex, ident, pool_cnt, pool_idx, pool_start, resref, sec_cnt, sec_off,
    strref, text, unknown, CountSource, FieldPlan, MemberPlan, ResourcePlan, Schema, SectionPlan,
};
use crate::types::{EngineProfile, ResourceType, StructKind};

const CREATURE_FLAGS: BitLabels = &[
    (0, "Show longname"),
    (1, "No corpse"),
    (2, "Permanent corpse"),
    (3, "Original class fighter"),
    (4, "Original class mage"),
    (5, "Original class cleric"),
    (6, "Original class thief"),
    (9, "Fallen paladin"),
    (10, "Fallen ranger"),
    (11, "Exportable"),
];

const STATUS_FLAGS: BitLabels = &[
    (0, "Sleeping"),
    (1, "Berserk"),
    (2, "Panic"),
    (3, "Stunned"),
    (4, "Invisible"),
    (5, "Helpless"),
    (6, "Frozen death"),
    (7, "Stone death"),
];

const MEMORIZED_FLAGS: BitLabels = &[(0, "Memorized")];

const ITEM_USE_FLAGS: BitLabels = &[
    (0, "Identified"),
    (1, "Unstealable"),
    (2, "Stolen"),
    (3, "Undroppable"),
];

/// Inventory slots of the fixed item slot block, in file order.
const SLOT_NAMES: [&str; 38] = [
    "Helmet",
    "Armor",
    "Shield",
    "Gloves",
    "Left ring",
    "Right ring",
    "Amulet",
    "Belt",
    "Boots",
    "Weapon 1",
    "Weapon 2",
    "Weapon 3",
    "Weapon 4",
    "Quiver 1",
    "Quiver 2",
    "Quiver 3",
    "Quiver 4",
    "Cloak",
    "Quick item 1",
    "Quick item 2",
    "Quick item 3",
    "Inventory 1",
    "Inventory 2",
    "Inventory 3",
    "Inventory 4",
    "Inventory 5",
    "Inventory 6",
    "Inventory 7",
    "Inventory 8",
    "Inventory 9",
    "Inventory 10",
    "Inventory 11",
    "Inventory 12",
    "Inventory 13",
    "Inventory 14",
    "Inventory 15",
    "Inventory 16",
    "Magically created weapon",
];

static SCHEMA: Schema = Schema {
    rtype: ResourceType::Cre,
    signature: b"CRE ",
    versions: &[b"V1.0"],
    plan,
};

/// The CRE schema.
pub fn schema() -> &'static Schema {
    &SCHEMA
}

fn header_fields() -> Vec<FieldPlan> {
    let mut header = vec![
        text("Signature", 4),
        text("Version", 4),
        strref("Long name"),
        strref("Short name"),
        flags("Flags", 4, CREATURE_FLAGS),
        dec("XP value", 4),
        dec("XP (power level)", 4),
        dec("Gold", 4),
        flags("Status", 4, STATUS_FLAGS),
        dec("Current HP", 2),
        dec("Maximum HP", 2),
        ident("Animation", 4, "animate"),
        dec("Metal color", 1),
        dec("Minor color", 1),
        dec("Major color", 1),
        dec("Skin color", 1),
        dec("Leather color", 1),
        dec("Armor color", 1),
        dec("Hair color", 1),
        dec("Effect version", 1),
        resref("Small portrait"),
        resref("Large portrait"),
        dec_signed("Reputation", 1),
        dec("Hide in shadows", 1),
        dec_signed("Natural AC", 2),
        dec_signed("Effective AC", 2),
        dec_signed("Crushing AC modifier", 2),
        dec_signed("Missile AC modifier", 2),
        dec_signed("Piercing AC modifier", 2),
        dec_signed("Slashing AC modifier", 2),
        dec("THAC0", 1),
        dec("# attacks", 1),
        dec("Save vs. death", 1),
        dec("Save vs. wands", 1),
        dec("Save vs. polymorph", 1),
        dec("Save vs. breath", 1),
        dec("Save vs. spells", 1),
        dec("Fire resistance", 1),
        dec("Cold resistance", 1),
        dec("Electricity resistance", 1),
        dec("Acid resistance", 1),
        dec("Magic resistance", 1),
        dec("Magic fire resistance", 1),
        dec("Magic cold resistance", 1),
        dec("Slashing resistance", 1),
        dec("Crushing resistance", 1),
        dec("Piercing resistance", 1),
        dec("Missile resistance", 1),
        dec("Detect illusion", 1),
        dec("Set traps", 1),
        dec("Lore", 1),
        dec("Open locks", 1),
        dec("Move silently", 1),
        dec("Find traps", 1),
        dec("Pick pockets", 1),
        dec("Fatigue", 1),
        dec("Intoxication", 1),
        dec_signed("Luck", 1),
        dec("Large sword proficiency", 1),
        dec("Small sword proficiency", 1),
        dec("Bow proficiency", 1),
        dec("Spear proficiency", 1),
        dec("Blunt proficiency", 1),
        dec("Spiked proficiency", 1),
        dec("Axe proficiency", 1),
        dec("Missile proficiency", 1),
        unknown("Unused", 17),
        dec("Tracking", 1),
        unknown("Unused", 28),
    ];
    for _ in 0..100 {
        header.push(strref("Soundset string"));
    }
    header.extend([
        dec("Highest attained level (first class)", 1),
        dec("Highest attained level (second class)", 1),
        dec("Highest attained level (third class)", 1),
        ident("Sex", 1, "gender"),
        dec("Strength", 1),
        dec("Strength bonus", 1),
        dec("Intelligence", 1),
        dec("Wisdom", 1),
        dec("Dexterity", 1),
        dec("Constitution", 1),
        dec("Charisma", 1),
        dec("Morale", 1),
        dec("Morale break", 1),
        ident("Racial enemy", 1, "race"),
        dec("Morale recovery", 2),
        hex("Kit", 4),
        resref("Override script"),
        resref("Class script"),
        resref("Race script"),
        resref("General script"),
        resref("Default script"),
        ident("Enemy-Ally", 1, "ea"),
        ident("General", 1, "general"),
        ident("Race", 1, "race"),
        ident("Class", 1, "class"),
        ident("Specifics", 1, "specific"),
        ident("Gender", 1, "gender"),
        unknown("Object references", 5),
        ident("Alignment", 1, "align"),
        dec("Global identifier", 2),
        dec("Local identifier", 2),
        text("Death variable", 32),
        sec_off("Known spells offset", StructKind::KnownSpell),
        sec_cnt("# known spells", StructKind::KnownSpell, 4),
        sec_off("Memorization info offset", StructKind::MemorizationInfo),
        sec_cnt("# memorization info", StructKind::MemorizationInfo, 4),
        sec_off("Memorized spells offset", StructKind::MemorizedSpell),
        sec_cnt("# memorized spells", StructKind::MemorizedSpell, 4),
        sec_off("Item slots offset", StructKind::ItemSlots),
        sec_off("Items offset", StructKind::Item),
        sec_cnt("# items", StructKind::Item, 4),
        sec_off("Effects offset", StructKind::Effect),
        sec_cnt("# effects", StructKind::Effect, 4),
        resref("Dialogue"),
    ]);
    header
}

fn effect_fields_v2() -> Vec<FieldPlan> {
    vec![
        text("Signature", 4),
        text("Version", 4),
        dec("Opcode", 4),
        dec("Target", 4),
        dec("Power", 4),
        dec("Parameter 1", 4),
        dec("Parameter 2", 4),
        dec("Timing mode", 2),
        dec("Timing", 2),
        dec("Duration", 4),
        dec("Probability 1", 2),
        dec("Probability 2", 2),
        resref("Resource"),
        dec("# dice thrown", 4),
        dec("Dice size", 4),
        flags("Save type", 4, super::SAVE_FLAGS),
        dec_signed("Save bonus", 4),
        dec("Special", 4),
        dec("Primary type", 4),
        unknown("Unused", 12),
        dec("Parent resource lowest level", 4),
        dec("Parent resource highest level", 4),
        flags("Resistance", 4, &[(0, "Dispellable"), (1, "Ignore resistance")]),
        dec("Parameter 3", 4),
        dec("Parameter 4", 4),
        unknown("Unused", 8),
        resref("Parent resource"),
        hex("Resource flags", 4),
        dec("Projectile", 4),
        unknown("Unused", 136),
    ]
}

fn item_slot_fields() -> Vec<FieldPlan> {
    let mut fields: Vec<FieldPlan> = SLOT_NAMES
        .iter()
        .map(|&name| {
            pool_idx(
                name,
                StructKind::Item,
                2,
                RefGate::NonNegative,
                RefPolicy::ClearToNone,
            )
        })
        .collect();
    fields.push(dec_signed("Weapon slot selected", 2));
    fields.push(dec_signed("Weapon ability selected", 2));
    fields
}

fn plan(_version: &[u8; 4], _profile: EngineProfile) -> ResourcePlan {
    ResourcePlan {
        header: header_fields(),
        header_ext: Vec::new(),
        sections: vec![
            SectionPlan {
                kind: StructKind::KnownSpell,
                label: "Known spell",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(vec![
                    resref("Spell"),
                    dec("Level", 2),
                    dec("Type", 2),
                ]),
            },
            SectionPlan {
                kind: StructKind::MemorizationInfo,
                label: "Memorization info",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(vec![
                    dec("Level", 2),
                    dec("Memorizable", 2),
                    dec("Memorizable after effects", 2),
                    dec("Type", 2),
                    pool_start(
                        "First memorized spell index",
                        StructKind::MemorizedSpell,
                        4,
                    ),
                    pool_cnt("# memorized spells", StructKind::MemorizedSpell, 4),
                ]),
            },
            SectionPlan {
                kind: StructKind::MemorizedSpell,
                label: "Memorized spell",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(vec![
                    resref("Spell"),
                    flags("Memorization", 4, MEMORIZED_FLAGS),
                ]),
            },
            SectionPlan {
                kind: StructKind::Effect,
                label: "Effect",
                count: CountSource::HeaderField,
                member: MemberPlan::ByHeaderField {
                    selector: "Effect version",
                    arms: vec![(0, super::effect_fields_v1()), (1, effect_fields_v2())],
                },
            },
            SectionPlan {
                kind: StructKind::Item,
                label: "Item",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(vec![
                    resref("Item"),
                    dec("Expiration time", 2),
                    dec("Quantity/Charges 1", 2),
                    dec("Quantity/Charges 2", 2),
                    dec("Quantity/Charges 3", 2),
                    flags("Flags", 4, ITEM_USE_FLAGS),
                ]),
            },
            SectionPlan {
                kind: StructKind::ItemSlots,
                label: "Item slots",
                count: CountSource::Single,
                member: MemberPlan::Fields(item_slot_fields()),
            },
        ],
        trailing: Vec::new(),
    }
}
