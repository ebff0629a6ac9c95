use std::path::PathBuf;

use clap::Args;
use ie_structs::{ResourceTree, SymbolRegistry};
use itertools::Itertools;
use miette::Result;
use owo_colors::OwoColorize;
use similar::{ChangeTag, TextDiff};

use super::{field_rows, load, load_symbols, Profile};

#[derive(Args)]
pub struct DiffArgs {
    /// An input resource file
    #[arg(short, long, value_name = "FILE")]
    left: PathBuf,

    /// An input resource file
    #[arg(short, long, value_name = "FILE")]
    right: PathBuf,

    /// Game variant to resolve layouts for
    #[arg(short, long, value_enum, default_value_t = Profile::Bg2)]
    profile: Profile,

    /// A directory of IDS files to resolve identifier fields against
    #[arg(short, long, value_name = "DIR")]
    ids: Option<PathBuf>,
}

/// One line per field, offsets left out so a structural shift in one
/// file does not drown the comparison in offset churn.
fn render(tree: &ResourceTree, symbols: &SymbolRegistry) -> String {
    let mut text = field_rows(tree, symbols)
        .iter()
        .map(|row| format!("{} = {}", row.name, row.value))
        .join("\n");
    text.push('\n');
    text
}

impl DiffArgs {
    pub fn handle(&self) -> Result<()> {
        let left = load(&self.left, self.profile.into())?;
        let right = load(&self.right, self.profile.into())?;
        let symbols = match &self.ids {
            Some(dir) => load_symbols(dir)?,
            None => SymbolRegistry::new(),
        };

        let old = render(&left, &symbols);
        let new = render(&right, &symbols);
        let diff = TextDiff::from_lines(&old, &new);
        if diff.ratio() >= 1.0 {
            println!("files match");
            return Ok(());
        }

        for (index, group) in diff.grouped_ops(3).iter().enumerate() {
            if index > 0 {
                println!("{}", "...".dimmed());
            }
            for op in group {
                for change in diff.iter_changes(op) {
                    match change.tag() {
                        ChangeTag::Delete => print!("{}", format!("- {change}").red()),
                        ChangeTag::Insert => print!("{}", format!("+ {change}").green()),
                        ChangeTag::Equal => print!("{}", format!("  {change}").dimmed()),
                    }
                }
            }
        }
        Ok(())
    }
}
