//! Hand built canonical resource images shared by the integration suites.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};

fn u16(out: &mut Vec<u8>, v: u16) {
    out.write_u16::<LittleEndian>(v).unwrap();
}

fn i16(out: &mut Vec<u8>, v: i16) {
    out.write_i16::<LittleEndian>(v).unwrap();
}

fn u32(out: &mut Vec<u8>, v: u32) {
    out.write_u32::<LittleEndian>(v).unwrap();
}

fn pad(out: &mut Vec<u8>, n: usize) {
    out.extend(std::iter::repeat(0u8).take(n));
}

/// An eight byte resource name, NUL padded.
fn resref(out: &mut Vec<u8>, name: &str) {
    assert!(name.len() <= 8);
    out.extend(name.as_bytes());
    pad(out, 8 - name.len());
}

/// Fixed width text, NUL padded.
fn text(out: &mut Vec<u8>, value: &str, width: usize) {
    assert!(value.len() <= width);
    out.extend(value.as_bytes());
    pad(out, width - value.len());
}

/// A dialogue with two states, two responses, two state triggers, one
/// response trigger and one action, all trailing text included.
///
/// State 0 owns response 0 and points at state trigger 0; state 1 owns
/// response 1 and points at state trigger 1. Response 0 carries a
/// trigger, an action and a link to state 1; response 1 ends the
/// dialogue.
#[rustfmt::skip]
pub fn dlg() -> Vec<u8> {
    vec![
        // Header
        0x44, 0x4C, 0x47, 0x20, 0x56, 0x31, 0x2E, 0x30, // DLG V1.0
        0x02, 0x00, 0x00, 0x00, // # states
        0x30, 0x00, 0x00, 0x00, // states offset
        0x02, 0x00, 0x00, 0x00, // # responses
        0x50, 0x00, 0x00, 0x00, // responses offset
        0x90, 0x00, 0x00, 0x00, // state triggers offset
        0x02, 0x00, 0x00, 0x00, // # state triggers
        0xA0, 0x00, 0x00, 0x00, // response triggers offset
        0x01, 0x00, 0x00, 0x00, // # response triggers
        0xA8, 0x00, 0x00, 0x00, // actions offset
        0x01, 0x00, 0x00, 0x00, // # actions
        // State 0: text 100, responses 0..1, trigger 0
        0x64, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        0x01, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        // State 1: text 101, responses 1..2, trigger 1
        0x65, 0x00, 0x00, 0x00,
        0x01, 0x00, 0x00, 0x00,
        0x01, 0x00, 0x00, 0x00,
        0x01, 0x00, 0x00, 0x00,
        // Response 0: text + trigger + action, next state 1 in GUARD
        0x07, 0x00, 0x00, 0x00, // flags
        0xC8, 0x00, 0x00, 0x00, // text 200
        0x00, 0x00, 0x00, 0x00, // journal
        0x00, 0x00, 0x00, 0x00, // trigger 0
        0x00, 0x00, 0x00, 0x00, // action 0
        0x47, 0x55, 0x41, 0x52, 0x44, 0x00, 0x00, 0x00, // GUARD
        0x01, 0x00, 0x00, 0x00, // next state 1
        // Response 1: text only, terminates dialogue
        0x09, 0x00, 0x00, 0x00, // flags
        0xC9, 0x00, 0x00, 0x00, // text 201
        0x00, 0x00, 0x00, 0x00, // journal
        0x00, 0x00, 0x00, 0x00, // trigger (dead)
        0x00, 0x00, 0x00, 0x00, // action (dead)
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // no next dialogue
        0x00, 0x00, 0x00, 0x00, // next state (dead)
        // State triggers
        0xB0, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00,
        0xB6, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00,
        // Response trigger
        0xBD, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00,
        // Action
        0xC3, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00, 0x00,
        // Script text
        0x54, 0x72, 0x75, 0x65, 0x28, 0x29,             // True()
        0x46, 0x61, 0x6C, 0x73, 0x65, 0x28, 0x29,       // False()
        0x54, 0x72, 0x75, 0x65, 0x28, 0x29,             // True()
        0x45, 0x73, 0x63, 0x61, 0x70, 0x65, 0x41, 0x72, // EscapeArea()
        0x65, 0x61, 0x28, 0x29,
    ]
}

/// An empty dialogue whose state section starts at 0x34, so the header
/// carries the optional threat response field.
#[rustfmt::skip]
pub fn dlg_with_threat_response() -> Vec<u8> {
    vec![
        // Header
        0x44, 0x4C, 0x47, 0x20, 0x56, 0x31, 0x2E, 0x30, // DLG V1.0
        0x00, 0x00, 0x00, 0x00, // # states
        0x34, 0x00, 0x00, 0x00, // states offset
        0x00, 0x00, 0x00, 0x00, // # responses
        0x34, 0x00, 0x00, 0x00, // responses offset
        0x34, 0x00, 0x00, 0x00, // state triggers offset
        0x00, 0x00, 0x00, 0x00, // # state triggers
        0x34, 0x00, 0x00, 0x00, // response triggers offset
        0x00, 0x00, 0x00, 0x00, // # response triggers
        0x34, 0x00, 0x00, 0x00, // actions offset
        0x00, 0x00, 0x00, 0x00, // # actions
        0x02, 0x00, 0x00, 0x00, // threat response: EscapeArea()
    ]
}

/// The 48 byte effect layout with a recognizable opcode.
fn effect_v1(out: &mut Vec<u8>, opcode: u16) {
    u16(out, opcode);
    out.push(1); // target: self
    out.push(0); // power
    u32(out, 0); // parameter 1
    u32(out, 0); // parameter 2
    out.push(1); // timing: permanent
    out.push(0); // resistance
    u32(out, 0); // duration
    out.push(100); // probability 1
    out.push(0); // probability 2
    resref(out, "");
    u32(out, 1); // # dice thrown
    u32(out, 8); // dice size
    u32(out, 0); // save type
    u32(out, 0); // save bonus
    pad(out, 4);
}

/// The 264 byte effect layout used when the creature header selects
/// effect version 1.
fn effect_v2(out: &mut Vec<u8>, opcode: u32) {
    out.extend(b"EFF V2.0");
    u32(out, opcode);
    u32(out, 1); // target
    u32(out, 0); // power
    u32(out, 0); // parameter 1
    u32(out, 0); // parameter 2
    u16(out, 1); // timing mode
    u16(out, 0); // timing
    u32(out, 0); // duration
    u16(out, 100); // probability 1
    u16(out, 0); // probability 2
    resref(out, "");
    u32(out, 0); // # dice thrown
    u32(out, 0); // dice size
    u32(out, 0); // save type
    u32(out, 0); // save bonus
    u32(out, 0); // special
    u32(out, 0); // primary type
    pad(out, 12);
    u32(out, 0); // parent resource lowest level
    u32(out, 0); // parent resource highest level
    u32(out, 0); // resistance
    u32(out, 0); // parameter 3
    u32(out, 0); // parameter 4
    pad(out, 8);
    resref(out, ""); // parent resource
    u32(out, 0); // resource flags
    u32(out, 0); // projectile
    pad(out, 136);
}

/// An item with one ability owning one effect, plus one equipped effect,
/// in the canonical dense layout.
pub fn itm() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(b"ITM V1  ");
    u32(&mut out, 100); // general name
    u32(&mut out, 101); // identified name
    resref(&mut out, ""); // used up item
    u32(&mut out, 0x40); // flags: magical
    u16(&mut out, 20); // category
    u32(&mut out, 0); // unusable by
    out.extend(b"SS"); // equipped appearance
    u16(&mut out, 0); // minimum level
    u16(&mut out, 0); // minimum strength
    pad(&mut out, 10); // strength bonus .. weapon proficiency
    u16(&mut out, 0); // minimum charisma
    u32(&mut out, 1000); // price
    u16(&mut out, 1); // stack amount
    resref(&mut out, "ISW1H01");
    u16(&mut out, 0); // lore to identify
    resref(&mut out, "GSW1H01");
    u32(&mut out, 3); // weight
    u32(&mut out, 200); // general description
    u32(&mut out, 201); // identified description
    resref(&mut out, ""); // description icon
    u32(&mut out, 1); // enchantment
    u32(&mut out, 0x72); // abilities offset
    u16(&mut out, 1); // # abilities
    u32(&mut out, 0xAA); // effects offset
    u16(&mut out, 1); // first equipped effect
    u16(&mut out, 1); // # equipped effects
    assert_eq!(out.len(), 0x72);

    // Ability 0: melee, effects 0..1
    out.push(1); // type
    out.push(0); // identify to use
    out.push(1); // location: weapon
    out.push(0); // alternative dice sides
    resref(&mut out, "");
    out.push(1); // target
    out.push(1); // # targets
    u16(&mut out, 1); // range
    out.push(0); // launcher required
    out.push(0); // alternative # dice thrown
    out.push(4); // speed factor
    out.push(0); // alternative damage bonus
    i16(&mut out, 1); // thac0 bonus
    out.push(8); // dice sides
    out.push(1); // # dice thrown
    i16(&mut out, 1); // damage bonus
    u16(&mut out, 3); // damage type: slashing
    u16(&mut out, 1); // # effects
    u16(&mut out, 0); // first effect index
    u16(&mut out, 0); // # charges
    u16(&mut out, 0); // charge depletion
    u32(&mut out, 1); // flags: add strength bonus
    u16(&mut out, 0); // projectile animation
    pad(&mut out, 6); // melee animation
    u16(&mut out, 0); // arrow qualifier
    u16(&mut out, 0); // bolt qualifier
    u16(&mut out, 0); // bullet qualifier
    pad(&mut out, 2);
    assert_eq!(out.len(), 0xAA);

    effect_v1(&mut out, 12); // ability effect: damage
    effect_v1(&mut out, 144); // equipped effect
    out
}

/// A spell with one ability owning one effect and one casting effect.
///
/// With `torment` the ability record carries the trailing duration field
/// of that game variant.
pub fn spl(torment: bool) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(b"SPL V1  ");
    u32(&mut out, 100); // general name
    u32(&mut out, 101); // identified name
    resref(&mut out, ""); // completion sound
    u32(&mut out, 0x200); // flags: hostile
    u16(&mut out, 1); // spell type: wizard
    u32(&mut out, 0); // exclusion flags
    u16(&mut out, 18); // casting graphics
    out.push(0); // minimum level
    out.push(2); // primary type
    pad(&mut out, 8); // minimums
    pad(&mut out, 6);
    u32(&mut out, 2); // spell level
    u16(&mut out, 1); // stack amount
    resref(&mut out, "SPWI201");
    u16(&mut out, 0); // lore to identify
    resref(&mut out, ""); // ground icon
    pad(&mut out, 4);
    u32(&mut out, 200); // spell description
    u32(&mut out, 201); // identified description
    resref(&mut out, ""); // description icon
    pad(&mut out, 4);
    let ability_size = if torment { 44 } else { 40 };
    u32(&mut out, 0x72); // abilities offset
    u16(&mut out, 1); // # abilities
    u32(&mut out, 0x72 + ability_size); // effects offset
    u16(&mut out, 1); // first casting effect
    u16(&mut out, 1); // # casting effects
    assert_eq!(out.len(), 0x72);

    // Ability 0: effects 0..1
    out.push(1); // type
    out.push(0);
    u16(&mut out, 0); // location
    resref(&mut out, "");
    out.push(1); // target
    out.push(1); // # targets
    u16(&mut out, 30); // range
    u16(&mut out, 2); // level required
    u16(&mut out, 5); // casting speed
    i16(&mut out, 0); // thac0 bonus
    u16(&mut out, 6); // dice sides
    u16(&mut out, 1); // # dice thrown
    i16(&mut out, 0); // damage bonus
    u16(&mut out, 0); // damage type
    u16(&mut out, 1); // # effects
    u16(&mut out, 0); // first effect index
    u16(&mut out, 0); // # charges
    u16(&mut out, 0); // charge depletion
    u16(&mut out, 1); // projectile
    pad(&mut out, 2);
    if torment {
        u32(&mut out, 5); // duration rounds
    }
    assert_eq!(out.len() as u32, 0x72 + ability_size);

    effect_v1(&mut out, 12); // ability effect
    effect_v1(&mut out, 174); // casting effect
    out
}

/// A creature with one known spell, one memorization level owning one
/// memorized spell, one effect, two items and the item slot block.
///
/// `effect_version` selects the 48 byte (0) or 264 byte (1) effect
/// layout. Item slots: Weapon 1 holds item 0, Inventory 1 holds item 1,
/// every other slot is empty.
pub fn cre(effect_version: u8) -> Vec<u8> {
    let effect_size: u32 = if effect_version == 1 { 264 } else { 48 };
    let known_off: u32 = 0x2d4;
    let memo_off = known_off + 12;
    let memorized_off = memo_off + 16;
    let effects_off = memorized_off + 12;
    let items_off = effects_off + effect_size;
    let slots_off = items_off + 2 * 20;

    let mut out = Vec::new();
    out.extend(b"CRE V1.0");
    u32(&mut out, 100); // long name
    u32(&mut out, 101); // short name
    u32(&mut out, 0); // flags
    u32(&mut out, 2000); // xp value
    u32(&mut out, 0); // xp (power level)
    u32(&mut out, 50); // gold
    u32(&mut out, 0); // status
    u16(&mut out, 20); // current hp
    u16(&mut out, 20); // maximum hp
    u32(&mut out, 0x6404); // animation
    out.extend([30, 25, 57, 12, 23, 28, 0]); // colors
    out.push(effect_version);
    resref(&mut out, "PORTS");
    resref(&mut out, "PORTL");
    out.push(10); // reputation
    out.push(0); // hide in shadows
    i16(&mut out, 6); // natural ac
    i16(&mut out, 6); // effective ac
    i16(&mut out, 0); // crushing
    i16(&mut out, 0); // missile
    i16(&mut out, 0); // piercing
    i16(&mut out, 0); // slashing
    out.push(18); // thac0
    out.push(1); // # attacks
    out.extend([14, 16, 15, 17, 17]); // saves
    pad(&mut out, 11); // resistances
    pad(&mut out, 7); // skills
    out.push(0); // fatigue
    out.push(0); // intoxication
    out.push(0); // luck
    out.extend([1, 0, 0, 0, 0, 0, 0, 1]); // proficiencies
    pad(&mut out, 17);
    out.push(0); // tracking
    pad(&mut out, 28);
    assert_eq!(out.len(), 0xa4);
    for i in 0..100u32 {
        u32(&mut out, 300 + i); // soundset strings
    }
    assert_eq!(out.len(), 0x234);
    out.extend([7, 0, 0]); // levels per class
    out.push(1); // sex
    out.extend([16, 0, 10, 12, 15, 14, 9]); // ability scores
    out.push(10); // morale
    out.push(8); // morale break
    out.push(255); // racial enemy
    u16(&mut out, 60); // morale recovery
    u32(&mut out, 0); // kit
    resref(&mut out, ""); // override script
    resref(&mut out, ""); // class script
    resref(&mut out, ""); // race script
    resref(&mut out, ""); // general script
    resref(&mut out, "WTASIGHT"); // default script
    out.push(255); // enemy-ally
    out.push(1); // general
    out.push(1); // race
    out.push(2); // class
    out.push(0); // specifics
    out.push(1); // gender
    pad(&mut out, 5); // object references
    out.push(33); // alignment
    u16(&mut out, 0); // global identifier
    u16(&mut out, 0); // local identifier
    text(&mut out, "None", 32); // death variable
    u32(&mut out, known_off);
    u32(&mut out, 1); // # known spells
    u32(&mut out, memo_off);
    u32(&mut out, 1); // # memorization info
    u32(&mut out, memorized_off);
    u32(&mut out, 1); // # memorized spells
    u32(&mut out, slots_off);
    u32(&mut out, items_off);
    u32(&mut out, 2); // # items
    u32(&mut out, effects_off);
    u32(&mut out, 1); // # effects
    resref(&mut out, "GUARD"); // dialogue
    assert_eq!(out.len(), 0x2d4);

    // Known spell
    resref(&mut out, "SPPR101");
    u16(&mut out, 0); // level
    u16(&mut out, 1); // type: priest

    // Memorization info: level 1 priest, memorized spells 0..1
    u16(&mut out, 1);
    u16(&mut out, 2);
    u16(&mut out, 2);
    u16(&mut out, 1);
    u32(&mut out, 0); // first memorized spell index
    u32(&mut out, 1); // # memorized spells

    // Memorized spell
    resref(&mut out, "SPPR101");
    u32(&mut out, 1); // memorized

    if effect_version == 1 {
        effect_v2(&mut out, 0);
    } else {
        effect_v1(&mut out, 0);
    }

    // Items
    resref(&mut out, "SW1H01");
    u16(&mut out, 0); // expiration
    u16(&mut out, 1); // quantity 1
    u16(&mut out, 0);
    u16(&mut out, 0);
    u32(&mut out, 1); // identified
    resref(&mut out, "POTN08");
    u16(&mut out, 0);
    u16(&mut out, 5);
    u16(&mut out, 0);
    u16(&mut out, 0);
    u32(&mut out, 1);

    // Item slots: Weapon 1 = item 0, Inventory 1 = item 1
    for slot in 0..38 {
        match slot {
            9 => i16(&mut out, 0),
            21 => i16(&mut out, 1),
            _ => i16(&mut out, -1),
        }
    }
    i16(&mut out, 0); // weapon slot selected
    i16(&mut out, 0); // weapon ability selected

    assert_eq!(out.len() as u32, slots_off + 80);
    out
}
