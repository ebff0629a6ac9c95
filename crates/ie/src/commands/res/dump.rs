use std::path::PathBuf;

use clap::Args;
use ie_structs::SymbolRegistry;
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;

use super::{field_rows, load, load_symbols, Profile};

#[derive(Args)]
pub struct DumpArgs {
    /// An input resource file (.dlg, .itm, .spl or .cre)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Game variant to resolve the layout for
    #[arg(short, long, value_enum, default_value_t = Profile::Bg2)]
    profile: Profile,

    /// A directory of IDS files to resolve identifier fields against
    #[arg(short, long, value_name = "DIR")]
    ids: Option<PathBuf>,

    /// Emit JSON instead of a table
    #[arg(short, long)]
    json: bool,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let tree = load(&self.input, self.profile.into())?;
        let symbols = match &self.ids {
            Some(dir) => load_symbols(dir)?,
            None => SymbolRegistry::new(),
        };
        let rows = field_rows(&tree, &symbols);

        if self.json {
            let fields: Vec<_> = rows
                .iter()
                .map(|row| {
                    serde_json::json!({
                        "offset": row.offset,
                        "name": row.name,
                        "value": row.value,
                    })
                })
                .collect();
            let document = serde_json::json!({
                "type": tree.resource_type(),
                "profile": tree.profile(),
                "size": tree.total_size(),
                "fields": fields,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&document).into_diagnostic()?
            );
            return Ok(());
        }

        println!(
            "{} ({} bytes, profile {})",
            tree.resource_type().to_string().bold(),
            tree.total_size(),
            tree.profile()
        );
        for row in &rows {
            println!(
                "{}  {:<48} {}",
                format!("{:#08x}", row.offset).dimmed(),
                row.name,
                row.value
            );
        }
        Ok(())
    }
}
