//! **DLG V1.0** dialogue resources.
//!
//! A dialogue is a graph of NPC states and player responses, with the
//! trigger and action scripts stored as trailing source text after the
//! fixed records.
//!
//! ## Header
//!
//! | Offset | Size | Field                    |
//! |--------|------|--------------------------|
//! | 0x0000 | 4    | Signature (`DLG `)       |
//! | 0x0004 | 4    | Version (`V1.0`)         |
//! | 0x0008 | 4    | # states                 |
//! | 0x000c | 4    | States offset            |
//! | 0x0010 | 4    | # responses              |
//! | 0x0014 | 4    | Responses offset         |
//! | 0x0018 | 4    | State triggers offset    |
//! | 0x001c | 4    | # state triggers         |
//! | 0x0020 | 4    | Response triggers offset |
//! | 0x0024 | 4    | # response triggers      |
//! | 0x0028 | 4    | Actions offset           |
//! | 0x002c | 4    | # actions                |
//! | 0x0030 | 4    | Threat response (only when the state section starts past 0x30) |
//!
//! ## Records
//!
//! - **State** (16 bytes): text strref, first response index, response
//!   count, state trigger index (-1 for none).
//! - **Response** (32 bytes): flags, text strref, journal strref,
//!   response trigger index (live while flag bit 1 is set), action index
//!   (live while flag bit 2 is set), next dialogue resref, next state
//!   index (live unless flag bit 3 marks the dialogue as ending).
//! - **State trigger / Response trigger / Action** (8 bytes each):
//!   offset and length of the record's script source in the trailing
//!   text region. The text regions follow the fixed records in exactly
//!   that order.

use crate::field::{BitLabels, RefGate, RefPolicy};
use crate::schema::{
    flags, pool_cnt, pool_idx, pool_start, resref, sec_cnt, sec_off, strref, text, text_len,
    text_off, CountSource, ExtWhen, HeaderExt, MemberPlan, ResourcePlan, Schema, SectionPlan,
};
use crate::types::{EngineProfile, ResourceType, StructKind};

/// Interruption behavior bits of the optional header field.
const THREAT_FLAGS: BitLabels = &[(0, "Enemy()"), (1, "EscapeArea()"), (2, "Nothing")];

const RESPONSE_FLAGS: BitLabels = &[
    (0, "Has text"),
    (1, "Has trigger"),
    (2, "Has action"),
    (3, "Terminates dialogue"),
    (4, "Has journal entry"),
];

static SCHEMA: Schema = Schema {
    rtype: ResourceType::Dlg,
    signature: b"DLG ",
    versions: &[b"V1.0"],
    plan,
};

/// The DLG schema.
pub fn schema() -> &'static Schema {
    &SCHEMA
}

fn plan(_version: &[u8; 4], _profile: EngineProfile) -> ResourcePlan {
    ResourcePlan {
        header: vec![
            text("Signature", 4),
            text("Version", 4),
            sec_cnt("# states", StructKind::State, 4),
            sec_off("States offset", StructKind::State),
            sec_cnt("# responses", StructKind::Response, 4),
            sec_off("Responses offset", StructKind::Response),
            sec_off("State triggers offset", StructKind::StateTrigger),
            sec_cnt("# state triggers", StructKind::StateTrigger, 4),
            sec_off("Response triggers offset", StructKind::ResponseTrigger),
            sec_cnt("# response triggers", StructKind::ResponseTrigger, 4),
            sec_off("Actions offset", StructKind::Action),
            sec_cnt("# actions", StructKind::Action, 4),
        ],
        header_ext: vec![HeaderExt {
            when: ExtWhen::SectionOffsetBeyond {
                of: StructKind::State,
                beyond: 0x30,
            },
            fields: vec![flags("Threat response", 4, THREAT_FLAGS)],
        }],
        sections: vec![
            SectionPlan {
                kind: StructKind::State,
                label: "State",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(vec![
                    strref("Text"),
                    pool_start("First response index", StructKind::Response, 4),
                    pool_cnt("# responses", StructKind::Response, 4),
                    pool_idx(
                        "Trigger index",
                        StructKind::StateTrigger,
                        4,
                        RefGate::NonNegative,
                        RefPolicy::ClearToNone,
                    ),
                ]),
            },
            SectionPlan {
                kind: StructKind::Response,
                label: "Response",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(vec![
                    flags("Flags", 4, RESPONSE_FLAGS),
                    strref("Text"),
                    strref("Journal text"),
                    pool_idx(
                        "Trigger index",
                        StructKind::ResponseTrigger,
                        4,
                        RefGate::FlagSet {
                            field: "Flags",
                            bit: 1,
                        },
                        RefPolicy::ClearFlag {
                            field: "Flags",
                            bit: 1,
                        },
                    ),
                    pool_idx(
                        "Action index",
                        StructKind::Action,
                        4,
                        RefGate::FlagSet {
                            field: "Flags",
                            bit: 2,
                        },
                        RefPolicy::ClearFlag {
                            field: "Flags",
                            bit: 2,
                        },
                    ),
                    resref("Next dialogue"),
                    pool_idx(
                        "Next state index",
                        StructKind::State,
                        4,
                        RefGate::FlagClear {
                            field: "Flags",
                            bit: 3,
                        },
                        RefPolicy::Forbid,
                    ),
                ]),
            },
            SectionPlan {
                kind: StructKind::StateTrigger,
                label: "State trigger",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(vec![text_off("Offset"), text_len("Length")]),
            },
            SectionPlan {
                kind: StructKind::ResponseTrigger,
                label: "Response trigger",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(vec![text_off("Offset"), text_len("Length")]),
            },
            SectionPlan {
                kind: StructKind::Action,
                label: "Action",
                count: CountSource::HeaderField,
                member: MemberPlan::Fields(vec![text_off("Offset"), text_len("Length")]),
            },
        ],
        trailing: vec![
            StructKind::StateTrigger,
            StructKind::ResponseTrigger,
            StructKind::Action,
        ],
    }
}
