//! Symbol tables for identifier fields.
//!
//! The engine ships IDS files: plain text, one `value symbol` pair per
//! line, holding the names scripts and stat fields refer to by number.
//! A [`SymbolRegistry`] is a constructed value the caller fills with the
//! tables it wants resolved; nothing here touches the file system or any
//! global state.

use indexmap::IndexMap;
use winnow::ascii::{digit1, hex_digit1, space1};
use winnow::combinator::{alt, opt, preceded, rest, separated_pair};
use winnow::prelude::*;
use winnow::PResult;
use winnow::Parser;

/// One parsed IDS file: value to symbol, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    entries: IndexMap<i64, Box<str>>,
}

fn ids_value(input: &mut &str) -> PResult<i64> {
    alt((
        preceded(alt(("0x", "0X")), hex_digit1)
            .try_map(|digits: &str| i64::from_str_radix(digits, 16)),
        (opt('-'), digit1).take().try_map(str::parse::<i64>),
    ))
    .parse_next(input)
}

fn ids_line(input: &mut &str) -> PResult<(i64, Box<str>)> {
    separated_pair(
        ids_value,
        space1,
        rest.verify_map(|tail: &str| {
            let symbol = tail.trim();
            (!symbol.is_empty()).then(|| symbol.into())
        }),
    )
    .parse_next(input)
}

/// The optional first line: a bare entry count or an `IDS V1.0` tag.
fn is_preamble(number: usize, line: &str) -> bool {
    number == 0 && (line.starts_with("IDS") || line.parse::<u64>().is_ok())
}

impl SymbolTable {
    /// Parses IDS text, keeping every well formed line.
    ///
    /// Blank and malformed lines are skipped, the first symbol for a
    /// value wins when a file maps it twice.
    pub fn parse(text: &str) -> Self {
        let mut entries = IndexMap::new();
        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || is_preamble(number, trimmed) {
                continue;
            }
            match ids_line.parse(trimmed) {
                Ok((value, symbol)) => {
                    entries.entry(value).or_insert(symbol);
                }
                Err(_) => tracing::debug!(line = number + 1, "skipping malformed ids line"),
            }
        }
        Self { entries }
    }

    /// The symbol mapped to `value`, if the file named one.
    pub fn symbol(&self, value: i64) -> Option<&str> {
        self.entries.get(&value).map(AsRef::as_ref)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every `(value, symbol)` pair in file order.
    pub fn entries(&self) -> impl Iterator<Item = (i64, &str)> {
        self.entries.iter().map(|(&v, s)| (v, s.as_ref()))
    }
}

/// Named symbol tables, usually one per IDS file.
///
/// Table names are case insensitive and stored lower case; identifier
/// fields name the table they resolve against, e.g. `ea` or `animate`.
#[derive(Debug, Clone, Default)]
pub struct SymbolRegistry {
    tables: IndexMap<Box<str>, SymbolTable>,
}

impl SymbolRegistry {
    /// An empty registry; identifier fields render numerically until
    /// tables are inserted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a table under `name`.
    pub fn insert(&mut self, name: &str, table: SymbolTable) {
        self.tables.insert(name.to_ascii_lowercase().into(), table);
    }

    /// The table registered under `name`, if any.
    pub fn table(&self, name: &str) -> Option<&SymbolTable> {
        self.tables.get(name.to_ascii_lowercase().as_str())
    }

    /// Resolves `value` against the table registered under `name`.
    pub fn resolve(&self, name: &str, value: i64) -> Option<&str> {
        self.table(name)?.symbol(value)
    }

    /// Names of every registered table, in insertion order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(AsRef::as_ref)
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table is registered at all.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Drops every registered table.
    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
