//! Shipped format layout tables.
//!
//! Each module carries the layout knowledge for one resource type as
//! plain data: a [`Schema`] naming the accepted signature and versions,
//! and the plan hook that builds the concrete field layout for a parsed
//! version and game variant. The reader and writer never hold format
//! specific code; adding a format means adding a table here.

pub mod cre;
pub mod dlg;
pub mod itm;
pub mod spl;

use crate::field::BitLabels;
use crate::schema::{dec, dec_signed, flags, resref, unknown, FieldPlan, Schema};
use crate::types::ResourceType;

/// The schema shipped for `rtype`.
pub fn schema_for(rtype: ResourceType) -> &'static Schema {
    match rtype {
        ResourceType::Dlg => dlg::schema(),
        ResourceType::Itm => itm::schema(),
        ResourceType::Spl => spl::schema(),
        ResourceType::Cre => cre::schema(),
    }
}

/// Saving throw bits shared by every effect layout.
pub(crate) const SAVE_FLAGS: BitLabels = &[
    (0, "Spells"),
    (1, "Breath"),
    (2, "Death"),
    (3, "Wands"),
    (4, "Polymorph"),
];

/// The 48 byte applied effect layout items, spells and creatures share.
pub(crate) fn effect_fields_v1() -> Vec<FieldPlan> {
    vec![
        dec("Opcode", 2),
        dec("Target", 1),
        dec("Power", 1),
        dec("Parameter 1", 4),
        dec("Parameter 2", 4),
        dec("Timing mode", 1),
        dec("Resistance", 1),
        dec("Duration", 4),
        dec("Probability 1", 1),
        dec("Probability 2", 1),
        resref("Resource"),
        dec("# dice thrown", 4),
        dec("Dice size", 4),
        flags("Save type", 4, SAVE_FLAGS),
        dec_signed("Save bonus", 4),
        unknown("Unused", 4),
    ]
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{effect_fields_v1, schema_for};
    use crate::schema::fields_size;
    use crate::types::ResourceType;

    #[test]
    fn every_resource_type_has_a_schema() {
        for rtype in [
            ResourceType::Dlg,
            ResourceType::Itm,
            ResourceType::Spl,
            ResourceType::Cre,
        ] {
            let schema = schema_for(rtype);
            assert_eq!(schema.rtype, rtype);
            assert!(!schema.versions.is_empty());
        }
    }

    #[test]
    fn shared_effect_layout_is_48_bytes() {
        assert_eq!(fields_size(&effect_fields_v1()), 48);
    }
}
