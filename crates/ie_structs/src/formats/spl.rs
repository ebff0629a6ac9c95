//! **SPL V1** spell resources.
//!
//! Spells share the item skeleton: a 0x72 byte header, ability records,
//! and a derived effect pool with a casting-effect range declared in the
//! header.
//!
//! ## Header (0x72 bytes)
//!
//! | Offset | Size | Field                     |
//! |--------|------|---------------------------|
//! | 0x0000 | 4    | Signature (`SPL `)        |
//! | 0x0004 | 4    | Version (`V1  `)          |
//! | 0x0008 | 4    | General name (strref)     |
//! | 0x000c | 4    | Identified name (strref)  |
//! | 0x0010 | 8    | Completion sound (resref) |
//! | 0x0018 | 4    | Flags                     |
//! | 0x001c | 2    | Spell type                |
//! | 0x001e | 4    | Exclusion flags           |
//! | 0x0022 | ..   | Casting, requirements, level, icons, descriptions |
//! | 0x0064 | 4    | Abilities offset          |
//! | 0x0068 | 2    | # abilities               |
//! | 0x006a | 4    | Effects offset            |
//! | 0x006e | 2    | First casting effect      |
//! | 0x0070 | 2    | # casting effects         |
//!
//! ## Records
//!
//! - **Ability** (40 bytes; 44 in the game variant whose abilities carry
//!   a trailing duration).
//! - **Effect** (48 bytes, shared layout): derived pool, counted as the
//!   sum of the ability ranges plus the header's casting range.

use crate::field::BitLabels;
use crate::schema::{
    dec, dec_signed, flags, ident, pool_cnt, pool_start, resref, sec_cnt, sec_off, strref, text,
    unknown, CountSource, FieldPlan, MemberPlan, ResourcePlan, Schema, SectionPlan,
};
use crate::types::{Capability, EngineProfile, ResourceType, StructKind};

const SPELL_FLAGS: BitLabels = &[
    (9, "Hostile"),
    (10, "No line of sight"),
    (11, "Allow spotting"),
    (12, "Outdoors only"),
    (13, "Non-magical ability"),
    (14, "Trigger/Contingency"),
    (15, "Non-combat ability"),
];

static SCHEMA: Schema = Schema {
    rtype: ResourceType::Spl,
    signature: b"SPL ",
    versions: &[b"V1  "],
    plan,
};

/// The SPL schema.
pub fn schema() -> &'static Schema {
    &SCHEMA
}

fn ability_fields(profile: EngineProfile) -> Vec<FieldPlan> {
    let mut fields = vec![
        dec("Type", 1),
        unknown("Unused", 1),
        dec("Location", 2),
        resref("Ability icon"),
        dec("Target", 1),
        dec("# targets", 1),
        dec("Range", 2),
        dec("Level required", 2),
        dec("Casting speed", 2),
        dec_signed("THAC0 bonus", 2),
        dec("Dice sides", 2),
        dec("# dice thrown", 2),
        dec_signed("Damage bonus", 2),
        dec("Damage type", 2),
        pool_cnt("# effects", StructKind::Effect, 2),
        pool_start("First effect index", StructKind::Effect, 2),
        dec("# charges", 2),
        dec("Charge depletion", 2),
        dec("Projectile", 2),
        unknown("Unused", 2),
    ];
    if profile.has(Capability::AbilityDuration) {
        fields.push(dec("Duration rounds", 4));
    }
    fields
}

fn plan(_version: &[u8; 4], profile: EngineProfile) -> ResourcePlan {
    ResourcePlan {
        header: vec![
            text("Signature", 4),
            text("Version", 4),
            strref("General name"),
            strref("Identified name"),
            resref("Completion sound"),
            flags("Flags", 4, SPELL_FLAGS),
            ident("Spell type", 2, "spltype"),
            flags("Exclusion flags", 4, &[]),
            dec("Casting graphics", 2),
            dec("Minimum level", 1),
            ident("Primary type (school)", 1, "school"),
            dec("Minimum strength", 1),
            dec("Secondary type", 1),
            dec("Minimum strength bonus", 1),
            dec("Minimum intelligence", 1),
            dec("Minimum dexterity", 1),
            dec("Minimum wisdom", 1),
            dec("Minimum constitution", 1),
            dec("Minimum charisma", 1),
            unknown("Unused", 6),
            dec("Spell level", 4),
            dec("Stack amount", 2),
            resref("Spellbook icon"),
            dec("Lore to identify", 2),
            resref("Ground icon"),
            unknown("Unused", 4),
            strref("Spell description"),
            strref("Identified description"),
            resref("Description icon"),
            unknown("Unused", 4),
            sec_off("Abilities offset", StructKind::Ability),
            sec_cnt("# abilities", StructKind::Ability, 2),
            sec_off("Effects offset", StructKind::Effect),
            pool_start("First casting effect", StructKind::Effect, 2),
            pool_cnt("# casting effects", StructKind::Effect, 2),
        ],
        header_ext: Vec::new(),
        sections: vec![
            SectionPlan {
                kind: StructKind::Ability,
                label: "Ability",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(ability_fields(profile)),
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

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{ability_fields, plan};
    use crate::schema::fields_size;
    use crate::types::EngineProfile;

    #[test]
    fn record_sizes_match_the_format() {
        let plan = plan(b"V1  ", EngineProfile::BaldursGate2);
        assert_eq!(fields_size(&plan.header), 0x72);
        assert_eq!(fields_size(&ability_fields(EngineProfile::BaldursGate2)), 40);
    }

    #[test]
    fn torment_abilities_carry_a_duration() {
        let fields = ability_fields(EngineProfile::Torment);
        assert_eq!(fields_size(&fields), 44);
        assert_eq!(fields.last().map(|f| f.name), Some("Duration rounds"));
    }
}
