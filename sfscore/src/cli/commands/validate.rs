//! Validate command - check submissions without scoring them

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use super::super::output::color;
use super::super::utils::format_error;
use crate::eval::edl::validate_edl;
use crate::eval::submission::{find_package, parse_submission};

/// Check a submission file or package without scoring it
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Situation frame JSON files, or package directories holding one
    /// `.json` and one `.tab` file
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs) -> Result<(), String> {
    let mut failures = 0;
    for path in &args.paths {
        match check(path) {
            Ok(summary) => println!("{} {}: {}", color("32", "ok"), path.display(), summary),
            Err(e) => {
                failures += 1;
                println!("{} {}: {}", color("31", "FAIL"), path.display(), e);
            }
        }
    }
    if failures > 0 {
        return Err(format!("{} of {} inputs failed validation", failures, args.paths.len()));
    }
    Ok(())
}

fn check(path: &Path) -> Result<String, String> {
    if path.is_dir() {
        let (json, tab) = find_package(path).map_err(|e| e.to_string())?;
        let frames = check_json(&json)?;
        let text = fs::read_to_string(&tab)
            .map_err(|e| format_error("read EDL file", &format!("{}: {}", tab.display(), e)))?;
        let rows = validate_edl(&text).map_err(|e| e.to_string())?;
        Ok(format!("{} frames, {} EDL rows", frames, rows))
    } else {
        check_json(path).map(|n| format!("{} frames", n))
    }
}

fn check_json(path: &Path) -> Result<usize, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format_error("read file", &format!("{}: {}", path.display(), e)))?;
    parse_submission(&text)
        .map(|frames| frames.len())
        .map_err(|e| e.to_string())
}
