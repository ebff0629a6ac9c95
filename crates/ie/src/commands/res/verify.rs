use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use ie_structs::{read_resource, to_bytes, EngineProfile, ResourceType};
use miette::{miette, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use walkdir::WalkDir;

use super::{resource_type, Profile};

#[derive(Args)]
pub struct VerifyArgs {
    /// Resource files or directories to scan for them
    #[arg(value_name = "PATH", required = true)]
    inputs: Vec<PathBuf>,

    /// Game variant to resolve layouts for
    #[arg(short, long, value_enum, default_value_t = Profile::Bg2)]
    profile: Profile,
}

enum Outcome {
    /// The write reproduced the input byte for byte.
    Identical,
    /// The input had slack; the write is a stable dense layout.
    Canonicalized { input: usize, written: usize },
    Failed(miette::Report),
}

fn verify_file(path: &Path, profile: EngineProfile) -> Outcome {
    match check(path, profile) {
        Ok(outcome) => outcome,
        Err(report) => Outcome::Failed(report),
    }
}

fn check(path: &Path, profile: EngineProfile) -> Result<Outcome> {
    let rtype = resource_type(path)?;
    let data = fs::read(path).into_diagnostic()?;
    let mut tree = read_resource(&data, rtype, profile)?;
    let written = to_bytes(&mut tree)?;
    if written == data {
        return Ok(Outcome::Identical);
    }

    // The writer always emits the dense layout, so a file with slack
    // between sections can never match byte for byte. It still has to
    // settle: writing the rewritten bytes again must be a fixpoint.
    let mut reread = read_resource(&written, rtype, profile)?;
    let again = to_bytes(&mut reread)?;
    if again == written {
        Ok(Outcome::Canonicalized {
            input: data.len(),
            written: written.len(),
        })
    } else {
        Err(miette!("rewriting the canonical layout changed it again"))
    }
}

impl VerifyArgs {
    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for input in &self.inputs {
            if !input.is_dir() {
                files.push(input.clone());
                continue;
            }
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.into_diagnostic()?;
                let known = entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(ResourceType::from_extension)
                    .is_some();
                if entry.file_type().is_file() && known {
                    files.push(entry.path().to_path_buf());
                }
            }
        }
        Ok(files)
    }

    pub fn handle(&self) -> Result<()> {
        let files = self.collect_files()?;
        if files.is_empty() {
            return Err(miette!("no resource files to verify"));
        }

        let mut identical = 0usize;
        let mut canonicalized = 0usize;
        let mut failed = 0usize;
        for file in &files {
            match verify_file(file, self.profile.into()) {
                Outcome::Identical => {
                    identical += 1;
                    println!("{} {}", "ok".green(), file.display());
                }
                Outcome::Canonicalized { input, written } => {
                    canonicalized += 1;
                    println!(
                        "{} {} ({input} bytes, {written} canonical)",
                        "normalized".yellow(),
                        file.display()
                    );
                }
                Outcome::Failed(report) => {
                    failed += 1;
                    println!("{} {}: {report}", "failed".red(), file.display());
                }
            }
        }

        println!(
            "{} files: {identical} identical, {canonicalized} normalized, {failed} failed",
            files.len()
        );
        if failed > 0 {
            return Err(miette!("{failed} of {} files failed verification", files.len()));
        }
        Ok(())
    }
}
