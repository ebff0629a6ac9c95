pub mod diff;
pub mod dump;
pub mod verify;

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use ie_structs::{
    read_resource, EngineProfile, ResourceTree, ResourceType, SymbolRegistry, SymbolTable,
};
use itertools::Itertools;
use miette::{Context, IntoDiagnostic, Result};
use walkdir::WalkDir;

#[derive(clap::Subcommand)]
pub enum ResCommands {
    /// Print every field of a resource file
    Dump(dump::DumpArgs),
    /// Check that resources survive a read/write round trip
    Verify(verify::VerifyArgs),
    /// Compare two resource files field by field
    Diff(diff::DiffArgs),
}

impl ResCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            ResCommands::Dump(dump) => dump.handle(),
            ResCommands::Verify(verify) => verify.handle(),
            ResCommands::Diff(diff) => diff.handle(),
        }
    }
}

/// Game variant to resolve layouts for
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Baldur's Gate
    Bg1,
    /// Baldur's Gate II
    #[default]
    Bg2,
    /// Planescape: Torment
    Pst,
    /// Icewind Dale
    Iwd,
}

impl From<Profile> for EngineProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Bg1 => EngineProfile::BaldursGate,
            Profile::Bg2 => EngineProfile::BaldursGate2,
            Profile::Pst => EngineProfile::Torment,
            Profile::Iwd => EngineProfile::IcewindDale,
        }
    }
}

/// Resolves the resource type from a path's file extension.
pub(crate) fn resource_type(path: &Path) -> Result<ResourceType> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    ResourceType::parse(ext).context(format!("path: {}", path.display()))
}

/// Reads and parses one resource file.
pub(crate) fn load(path: &Path, profile: EngineProfile) -> Result<ResourceTree> {
    let rtype = resource_type(path)?;
    let data = fs::read(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))?;
    let tree =
        read_resource(&data, rtype, profile).context(format!("path: {}", path.display()))?;
    Ok(tree)
}

/// Loads every IDS file under `dir` into a registry, keyed by file stem.
pub(crate) fn load_symbols(dir: &Path) -> Result<SymbolRegistry> {
    let mut registry = SymbolRegistry::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.into_diagnostic()?;
        let path = entry.path();
        let is_ids = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ids"));
        if !entry.file_type().is_file() || !is_ids {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let raw = fs::read(path)
            .into_diagnostic()
            .context(format!("path: {}", path.display()))?;
        // IDS files are latin-1 in the wild; lossy is good enough here.
        let table = SymbolTable::parse(&String::from_utf8_lossy(&raw));
        tracing::debug!(table = stem, entries = table.len(), "loaded symbol table");
        registry.insert(stem, table);
    }
    Ok(registry)
}

/// One display row of a resource dump.
pub(crate) struct Row {
    pub offset: usize,
    pub name: String,
    pub value: String,
}

/// Every leaf field of the tree as a display row, in offset order, with
/// member fields qualified by their owning structure. Trailing script
/// text follows as one row per owning member.
pub(crate) fn field_rows(tree: &ResourceTree, symbols: &SymbolRegistry) -> Vec<Row> {
    let mut rows = Vec::new();
    for id in tree.flat_list() {
        let Some(field) = tree.as_field(id) else {
            continue;
        };
        let chain = tree.struct_chain(id);
        let name = chain[1..].iter().map(|&link| tree.name(link)).join("/");
        rows.push(Row {
            offset: tree.offset(id),
            name,
            value: field.render(symbols),
        });
    }
    for &member in tree.children(tree.root()) {
        let Some(text) = tree.text(member) else {
            continue;
        };
        let offset = tree
            .attribute(member, "Offset")
            .and_then(|id| tree.as_field(id))
            .map_or(0, |f| f.int() as usize);
        rows.push(Row {
            offset,
            name: format!("{}/Script text", tree.name(member)),
            value: text,
        });
    }
    rows
}
