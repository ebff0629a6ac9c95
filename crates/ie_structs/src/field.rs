//! Leaf field datatypes: decoding, rendering and edit rules.
//!
//! Every leaf stores either a sign extended integer or its raw bytes.
//! Numeric fields are little endian and 1, 2, 3 or 4 bytes wide; any
//! other width is refused at encode time. Text keeps its original bytes
//! verbatim until edited, so unusual padding survives a round trip.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::symbols::SymbolRegistry;
use crate::types::StructKind;

/// Static labels for the bits of a flags field, `(bit, label)` pairs.
pub type BitLabels = &'static [(u8, &'static str)];

/// One component of a packed numeric field.
///
/// Components occupy consecutive bit ranges starting at bit 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PackedPart {
    /// Display label
    pub label: &'static str,
    /// Width in bits
    pub bits: u32,
}

/// How a singular index reference decides it is live.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RefGate {
    /// Live while the stored value is zero or greater
    NonNegative,
    /// Live while `bit` is set in the sibling flags field `field`
    FlagSet { field: &'static str, bit: u8 },
    /// Live while `bit` is clear in the sibling flags field `field`
    FlagClear { field: &'static str, bit: u8 },
}

/// What happens to a live reference whose target is being removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RefPolicy {
    /// Store -1
    ClearToNone,
    /// Store 0 and clear `bit` in the sibling flags field `field`
    ClearFlag { field: &'static str, bit: u8 },
    /// Refuse the removal unless the caller accepts a dangling -1
    Forbid,
}

/// Datatype of a leaf field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Little endian integer rendered in decimal
    Dec {
        /// Sign extend when set
        signed: bool,
    },
    /// Little endian integer rendered in hexadecimal
    Hex,
    /// Index into the game's string table
    StrRef,
    /// Fixed width single byte text
    Text,
    /// Eight byte resource name
    ResRef,
    /// Reserved bytes kept verbatim
    Unknown,
    /// Bit set with stable labels
    Flags {
        /// Known bits
        labels: BitLabels,
    },
    /// Value resolved against a named symbol table at render time
    Ident {
        /// Table name inside the [`SymbolRegistry`]
        table: &'static str,
    },
    /// Small unsigned components packed into one integer
    Packed {
        /// Components, lowest bits first
        parts: &'static [PackedPart],
    },
    /// Absolute file offset of a section
    SectionOffset {
        /// Section the offset locates
        of: StructKind,
    },
    /// Number of members in a section
    SectionCount {
        /// Section the count measures
        of: StructKind,
    },
    /// First member of a range owned inside the `of` section
    PoolStart {
        /// Section the range lives in
        of: StructKind,
    },
    /// Length of the range declared by the sibling start field
    PoolCount {
        /// Section the range lives in
        of: StructKind,
    },
    /// Index of a single member of the `of` section
    PoolIndex {
        /// Section the index points into
        of: StructKind,
        /// Liveness rule
        gate: RefGate,
        /// Removal rule for a live reference at the removed index
        on_removed: RefPolicy,
    },
    /// Absolute file offset of the owning member's trailing text
    TextOffset,
    /// Byte length of the owning member's trailing text
    TextLength,
}

impl FieldKind {
    /// Whether values of this kind are stored as integers.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Text | Self::ResRef | Self::Unknown)
    }

    /// Whether integer values of this kind sign extend.
    pub fn is_signed(self) -> bool {
        matches!(self, Self::Dec { signed: true } | Self::PoolIndex { .. })
    }
}

/// Stored value of a leaf field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldData {
    /// Numeric kinds
    Int(i64),
    /// Text, resref and unknown kinds
    Bytes(Box<[u8]>),
}

/// A leaf of the structure tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Datatype
    pub kind: FieldKind,
    /// Width in bytes
    pub size: usize,
    pub(crate) data: FieldData,
}

fn width_mask(size: usize) -> i64 {
    (1i64 << (8 * size as u32)) - 1
}

/// Decodes a little endian integer of 1 to 4 bytes.
pub(crate) fn decode_int(raw: &[u8], signed: bool) -> Result<i64> {
    match raw.len() {
        1..=4 if signed => Ok(LittleEndian::read_int(raw, raw.len())),
        1..=4 => Ok(LittleEndian::read_uint(raw, raw.len()) as i64),
        other => Err(Error::UnsupportedFieldWidth(other)),
    }
}

/// Encodes a little endian integer into 1 to 4 bytes.
pub(crate) fn encode_int(out: &mut [u8], value: i64) -> Result<()> {
    match out.len() {
        len @ 1..=4 => {
            let masked = (value & width_mask(len)) as u64;
            LittleEndian::write_uint(out, masked, len);
            Ok(())
        }
        other => Err(Error::UnsupportedFieldWidth(other)),
    }
}

fn int_bounds(size: usize, signed: bool) -> (i64, i64) {
    let bits = 8 * size as u32;
    if signed {
        (-(1i64 << (bits - 1)), (1i64 << (bits - 1)) - 1)
    } else {
        (0, (1i64 << bits) - 1)
    }
}

/// Decodes one latin-1 byte run into text, keeping every byte.
pub(crate) fn latin1_to_string(raw: &[u8]) -> String {
    raw.iter().map(|&b| char::from(b)).collect()
}

/// Encodes text back to latin-1, refusing characters above U+00FF.
pub(crate) fn string_to_latin1(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .map_err(|_| Error::ValueRejected(format!("{c:?} is not a single byte character")))
        })
        .collect()
}

impl Field {
    /// Decodes a field of `kind` from exactly `size` bytes.
    pub(crate) fn from_bytes(kind: FieldKind, size: usize, raw: &[u8]) -> Result<Self> {
        debug_assert_eq!(raw.len(), size);
        let data = if kind.is_numeric() {
            FieldData::Int(decode_int(raw, kind.is_signed())?)
        } else {
            FieldData::Bytes(raw.into())
        };
        Ok(Self { kind, size, data })
    }

    /// A freshly inserted member's value for this kind.
    ///
    /// Index references default to their dead state, everything else to
    /// zero bytes.
    pub(crate) fn empty(kind: FieldKind, size: usize) -> Self {
        let data = if kind.is_numeric() {
            let initial = match kind {
                FieldKind::PoolIndex {
                    on_removed: RefPolicy::ClearToNone,
                    ..
                } => -1,
                _ => 0,
            };
            FieldData::Int(initial)
        } else {
            FieldData::Bytes(vec![0u8; size].into())
        };
        Self { kind, size, data }
    }

    /// The integer value of a numeric field.
    pub fn int(&self) -> i64 {
        match &self.data {
            FieldData::Int(v) => *v,
            FieldData::Bytes(_) => unreachable!("byte field asked for an integer value"),
        }
    }

    /// The raw bytes of a text, resref or unknown field.
    pub fn bytes(&self) -> &[u8] {
        match &self.data {
            FieldData::Bytes(raw) => raw,
            FieldData::Int(_) => unreachable!("numeric field asked for raw bytes"),
        }
    }

    /// Emits the field's bytes into `out`, which must be `size` long.
    pub(crate) fn encode_into(&self, out: &mut [u8]) -> Result<()> {
        match &self.data {
            FieldData::Int(v) => encode_int(out, *v),
            FieldData::Bytes(raw) => {
                out.copy_from_slice(raw);
                Ok(())
            }
        }
    }

    /// Replaces a numeric value, refusing values outside the stored width.
    pub fn set_int(&mut self, value: i64) -> Result<()> {
        if !self.kind.is_numeric() {
            return Err(Error::ValueRejected(format!(
                "{:?} fields do not take numbers",
                self.kind
            )));
        }
        let (min, max) = int_bounds(self.size, self.kind.is_signed());
        if value < min || value > max {
            return Err(Error::ValueRejected(format!(
                "{value} does not fit {} bytes ({min}..={max})",
                self.size
            )));
        }
        self.data = FieldData::Int(value);
        Ok(())
    }

    /// Parses text input for a numeric field.
    ///
    /// Hexadecimal fields accept a `0x` prefix or a trailing `h`, both
    /// optional. On any parse failure the previous value stays.
    pub fn set_int_text(&mut self, text: &str) -> Result<()> {
        let trimmed = text.trim();
        let parsed = if matches!(self.kind, FieldKind::Hex) {
            let digits = trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
                .or_else(|| trimmed.strip_suffix('h'))
                .or_else(|| trimmed.strip_suffix('H'))
                .unwrap_or(trimmed);
            i64::from_str_radix(digits, 16)
        } else {
            trimmed.parse::<i64>()
        };
        match parsed {
            Ok(value) => self.set_int(value),
            Err(_) => Err(Error::ValueRejected(format!(
                "{trimmed:?} is not a number"
            ))),
        }
    }

    /// Replaces a text or resref value.
    ///
    /// Input longer than the field is refused rather than truncated;
    /// shorter input is padded with NUL bytes. Resource names also refuse
    /// control characters.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let encoded = match self.kind {
            FieldKind::Text => string_to_latin1(text)?,
            FieldKind::ResRef => {
                let encoded = string_to_latin1(text)?;
                if encoded.iter().any(|&b| b < 0x20) {
                    return Err(Error::ValueRejected(
                        "resource names cannot hold control characters".to_string(),
                    ));
                }
                encoded
            }
            _ => {
                return Err(Error::ValueRejected(format!(
                    "{:?} fields do not take text",
                    self.kind
                )))
            }
        };
        if encoded.len() > self.size {
            return Err(Error::ValueRejected(format!(
                "{} bytes do not fit a {} byte field",
                encoded.len(),
                self.size
            )));
        }
        let mut raw = encoded;
        raw.resize(self.size, 0);
        self.data = FieldData::Bytes(raw.into());
        Ok(())
    }

    /// Whether `bit` is set in a flags field.
    pub fn flag(&self, bit: u8) -> bool {
        self.int() & (1 << bit) != 0
    }

    /// Sets or clears one bit of a flags field.
    pub fn set_flag_bit(&mut self, bit: u8, on: bool) -> Result<()> {
        if !matches!(self.kind, FieldKind::Flags { .. }) {
            return Err(Error::ValueRejected(format!(
                "{:?} fields have no flag bits",
                self.kind
            )));
        }
        if usize::from(bit) >= 8 * self.size {
            return Err(Error::ValueRejected(format!(
                "bit {bit} is outside a {} byte field",
                self.size
            )));
        }
        let mut value = self.int();
        if on {
            value |= 1 << bit;
        } else {
            value &= !(1 << bit);
        }
        self.data = FieldData::Int(value);
        Ok(())
    }

    /// Extracts one component of a packed field.
    pub fn packed_part(&self, part: usize) -> Result<i64> {
        let FieldKind::Packed { parts } = self.kind else {
            return Err(Error::ValueRejected(format!(
                "{:?} fields have no packed components",
                self.kind
            )));
        };
        let Some(shift) = packed_shift(parts, part) else {
            return Err(Error::ValueRejected(format!("no component {part}")));
        };
        let mask = (1i64 << parts[part].bits) - 1;
        Ok((self.int() >> shift) & mask)
    }

    /// Stores one component of a packed field.
    ///
    /// Values outside the component's bit range clamp to its bounds.
    pub fn set_packed_part(&mut self, part: usize, value: i64) -> Result<()> {
        let FieldKind::Packed { parts } = self.kind else {
            return Err(Error::ValueRejected(format!(
                "{:?} fields have no packed components",
                self.kind
            )));
        };
        let Some(shift) = packed_shift(parts, part) else {
            return Err(Error::ValueRejected(format!("no component {part}")));
        };
        let max = (1i64 << parts[part].bits) - 1;
        let clamped = value.clamp(0, max);
        let mask = max << shift;
        let combined = (self.int() & !mask) | (clamped << shift);
        self.data = FieldData::Int(combined);
        Ok(())
    }

    /// Copies another field's value into this one.
    ///
    /// Only the value moves; the receiving slot keeps its name, offset and
    /// position. Source and target must share datatype and width.
    pub fn paste_from(&mut self, source: &Field) -> Result<()> {
        if self.kind != source.kind || self.size != source.size {
            return Err(Error::ValueRejected(format!(
                "cannot paste a {:?} of {} bytes over a {:?} of {} bytes",
                source.kind, source.size, self.kind, self.size
            )));
        }
        self.data = source.data.clone();
        Ok(())
    }

    /// Renders the value for display, resolving identifiers against
    /// `symbols`.
    pub fn render(&self, symbols: &SymbolRegistry) -> String {
        match self.kind {
            FieldKind::Dec { .. }
            | FieldKind::StrRef
            | FieldKind::SectionCount { .. }
            | FieldKind::PoolStart { .. }
            | FieldKind::PoolCount { .. }
            | FieldKind::PoolIndex { .. }
            | FieldKind::TextLength => self.int().to_string(),
            FieldKind::Hex | FieldKind::SectionOffset { .. } | FieldKind::TextOffset => {
                format!("{:#x}", self.int())
            }
            FieldKind::Text | FieldKind::ResRef => {
                let raw = self.bytes();
                let end = raw.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
                latin1_to_string(&raw[..end])
            }
            FieldKind::Unknown => self
                .bytes()
                .iter()
                .map(|b| format!("{b:02x}"))
                .collect::<Vec<_>>()
                .join(" "),
            FieldKind::Flags { labels } => render_flags(self.int(), self.size, labels),
            FieldKind::Ident { table } => {
                let value = self.int();
                match symbols.resolve(table, value) {
                    Some(symbol) => format!("{symbol} ({value})"),
                    None => {
                        tracing::debug!(table, value, "no symbol for value");
                        value.to_string()
                    }
                }
            }
            FieldKind::Packed { parts } => {
                let mut shift = 0;
                let mut rendered = Vec::with_capacity(parts.len());
                for part in parts {
                    let mask = (1i64 << part.bits) - 1;
                    rendered.push(format!("{} {}", part.label, (self.int() >> shift) & mask));
                    shift += part.bits;
                }
                rendered.join(", ")
            }
        }
    }
}

fn packed_shift(parts: &[PackedPart], part: usize) -> Option<u32> {
    if part >= parts.len() {
        return None;
    }
    Some(parts[..part].iter().map(|p| p.bits).sum())
}

fn render_flags(value: i64, size: usize, labels: BitLabels) -> String {
    let mut named = Vec::new();
    for bit in 0..(8 * size) as u8 {
        if value & (1 << bit) == 0 {
            continue;
        }
        match labels.iter().find(|(b, _)| *b == bit) {
            Some((_, label)) => named.push((*label).to_string()),
            None => named.push(format!("bit {bit}")),
        }
    }
    if named.is_empty() {
        format!("{value:#x}")
    } else {
        format!("{value:#x} ({})", named.join(" | "))
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{decode_int, encode_int, Field, FieldKind, PackedPart, RefGate, RefPolicy};
    use crate::error::{Error, Result};
    use crate::symbols::SymbolRegistry;
    use crate::types::StructKind;

    #[test]
    fn three_byte_integers_round_trip() -> Result<()> {
        let raw = [0x34, 0x12, 0x80];
        assert_eq!(decode_int(&raw, false)?, 0x80_1234);
        assert_eq!(decode_int(&raw, true)?, -0x7f_edcc);

        let mut out = [0u8; 3];
        encode_int(&mut out, 0x80_1234)?;
        assert_eq!(out, raw);
        encode_int(&mut out, -0x7f_edcc)?;
        assert_eq!(out, raw);
        Ok(())
    }

    #[test]
    fn five_byte_width_is_refused() {
        let raw = [0u8; 5];
        assert!(matches!(
            decode_int(&raw, false),
            Err(Error::UnsupportedFieldWidth(5))
        ));
        let mut out = [0u8; 5];
        assert!(matches!(
            encode_int(&mut out, 1),
            Err(Error::UnsupportedFieldWidth(5))
        ));
    }

    #[test]
    fn hex_input_takes_prefix_or_suffix() -> Result<()> {
        let mut field = Field::from_bytes(FieldKind::Hex, 2, &[0, 0])?;
        field.set_int_text("1f4h")?;
        assert_eq!(field.int(), 0x1f4);
        field.set_int_text("0x20")?;
        assert_eq!(field.int(), 0x20);
        field.set_int_text(" 7fff ")?;
        assert_eq!(field.int(), 0x7fff);
        Ok(())
    }

    #[test]
    fn rejected_input_keeps_the_previous_value() -> Result<()> {
        let mut field = Field::from_bytes(FieldKind::Dec { signed: false }, 2, &[0x39, 0x05])?;
        assert!(field.set_int_text("twelve").is_err());
        assert!(field.set_int_text("70000").is_err());
        assert_eq!(field.int(), 1337);
        Ok(())
    }

    #[test]
    fn signed_bounds_follow_the_width() -> Result<()> {
        let mut field = Field::from_bytes(FieldKind::Dec { signed: true }, 1, &[0xff])?;
        assert_eq!(field.int(), -1);
        field.set_int(-128)?;
        assert!(field.set_int(-129).is_err());
        field.set_int(127)?;
        assert!(field.set_int(128).is_err());
        Ok(())
    }

    #[test]
    fn text_pads_short_and_refuses_long() -> Result<()> {
        let mut field = Field::from_bytes(FieldKind::Text, 8, b"OLDVALUE")?;
        field.set_text("ab")?;
        assert_eq!(field.bytes(), b"ab\0\0\0\0\0\0");
        assert!(field.set_text("muchtoolong").is_err());
        assert_eq!(field.bytes(), b"ab\0\0\0\0\0\0");
        Ok(())
    }

    #[test]
    fn latin1_text_survives_a_round_trip() -> Result<()> {
        let raw = [0x46, 0xe9, 0xe8, 0x72, 0x00, 0x00, 0x00, 0x00];
        let mut field = Field::from_bytes(FieldKind::Text, 8, &raw)?;
        let rendered = field.render(&SymbolRegistry::new());
        assert_eq!(rendered, "Féèr");
        field.set_text(&rendered)?;
        assert_eq!(field.bytes(), &raw);
        Ok(())
    }

    #[test]
    fn packed_components_clamp_to_their_bits() -> Result<()> {
        const PARTS: &[PackedPart] = &[
            PackedPart {
                label: "Melee",
                bits: 3,
            },
            PackedPart {
                label: "Ranged",
                bits: 5,
            },
        ];
        let mut field = Field::from_bytes(FieldKind::Packed { parts: PARTS }, 1, &[0])?;

        field.set_packed_part(0, 7)?;
        assert_eq!(field.packed_part(0)?, 7);

        field.set_packed_part(0, 8)?;
        assert_eq!(field.packed_part(0)?, 7);

        field.set_packed_part(1, -3)?;
        assert_eq!(field.packed_part(1)?, 0);

        field.set_packed_part(1, 31)?;
        assert_eq!(field.int(), 0b11111_111);
        Ok(())
    }

    #[test]
    fn flags_render_labels_and_fall_back_to_bit_numbers() -> Result<()> {
        const LABELS: &[(u8, &str)] = &[(0, "Cursed"), (2, "Magical")];
        let field = Field::from_bytes(FieldKind::Flags { labels: LABELS }, 1, &[0b0000_1101])?;
        assert_eq!(
            field.render(&SymbolRegistry::new()),
            "0xd (Cursed | Magical | bit 3)"
        );
        Ok(())
    }

    #[test]
    fn paste_requires_matching_shape() -> Result<()> {
        let source = Field::from_bytes(FieldKind::Dec { signed: false }, 2, &[0x2a, 0x00])?;
        let mut target = Field::from_bytes(FieldKind::Dec { signed: false }, 2, &[0x00, 0x01])?;
        target.paste_from(&source)?;
        assert_eq!(target.int(), 42);

        let mut other_width = Field::from_bytes(FieldKind::Dec { signed: false }, 4, &[0; 4])?;
        assert!(other_width.paste_from(&source).is_err());
        Ok(())
    }

    #[test]
    fn dead_index_defaults_follow_their_policy() {
        let cleared = Field::empty(
            FieldKind::PoolIndex {
                of: StructKind::StateTrigger,
                gate: RefGate::NonNegative,
                on_removed: RefPolicy::ClearToNone,
            },
            4,
        );
        assert_eq!(cleared.int(), -1);

        let flagged = Field::empty(
            FieldKind::PoolIndex {
                of: StructKind::Action,
                gate: RefGate::FlagSet {
                    field: "Flags",
                    bit: 2,
                },
                on_removed: RefPolicy::ClearFlag {
                    field: "Flags",
                    bit: 2,
                },
            },
            4,
        );
        assert_eq!(flagged.int(), 0);
    }
}
