use crate::github::Issue;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Empties `dir` by removing and recreating it. A failed removal (usually
/// because the directory does not exist yet) is only logged.
pub fn reset_dir(dir: &Path) -> anyhow::Result<()> {
    if let Err(e) = fs::remove_dir_all(dir) {
        log::debug!("could not remove {}: {e}", dir.display());
    }
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(())
}

/// Writes each issue to `<dir>/<number>.json` and returns the paths in issue order.
pub fn write_issues(dir: &Path, issues: &[Issue]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::with_capacity(issues.len());

    for issue in issues {
        log::debug!("{:?}", issue.html_url);
        let file_path = dir.join(format!("{}.json", issue.number));
        let json = serde_json::to_string(issue)?;
        fs::write(&file_path, json)
            .with_context(|| format!("failed to write {}", file_path.display()))?;
        files.push(file_path);
    }

    for entry in fs::read_dir(dir)? {
        log::debug!("Wrote file: {}", entry?.path().display());
    }

    Ok(files)
}

/// Publishes a named step output. Appends `name=value` to the runner's output
/// file when one is configured, otherwise prints it.
pub fn set_output(output_file: Option<&Path>, name: &str, value: &str) -> anyhow::Result<()> {
    match output_file {
        Some(path) => {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open output file {}", path.display()))?;
            writeln!(file, "{name}={value}")?;
        }
        None => println!("{name}={value}"),
    }
    Ok(())
}

/// Formats a run failure as a runner `::error::` annotation. The whole
/// context chain is kept and the message is escaped so multi-line causes
/// stay in one annotation.
pub fn error_annotation(err: &anyhow::Error) -> String {
    let message = format!("{err:#}")
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    format!("::error::{message}")
}
