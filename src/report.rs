//! Rendering of per-file results
//!
//! One line (or short block) per result, whichever operation produced it.
//! For `diff`, successful fetches are additionally compared against the local
//! file with the system `diff`, ignoring whitespace, blank lines and comment
//! lines.

use anyhow::Context;
use console::style;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::Result;
use crate::operations::FileOperationResult;

/// Arguments passed to `diff` before the `-` (stdin) and local path operands
const DIFF_ARGS: [&str; 4] = [
    "--ignore-all-space",
    "--ignore-blank-lines",
    "--ignore-matching-lines",
    r"^[[:space:]]\+#",
];

/// Which command the results belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Results of uploading local files
    Upload,
    /// Results of fetching remote files for comparison
    Diff,
}

/// What a single result was rendered as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Upload succeeded
    Uploaded,
    /// Remote and local content are equivalent
    Matches,
    /// Remote and local content differ
    Differs,
    /// The operation (or the comparison) failed
    Failed,
}

/// Tally of rendered outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Successful uploads
    pub uploaded: usize,
    /// Files with no difference
    pub matched: usize,
    /// Files that differ
    pub differed: usize,
    /// Failures of any kind
    pub failed: usize,
}

impl Summary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Uploaded => self.uploaded += 1,
            Outcome::Matches => self.matched += 1,
            Outcome::Differs => self.differed += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Total results seen
    #[must_use]
    pub const fn total(&self) -> usize {
        self.uploaded + self.matched + self.differed + self.failed
    }
}

enum DiffStatus {
    Same,
    Different(String),
}

/// Writes one outcome per result to `out`
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    mode: ReportMode,
    debug: bool,
    diff_program: String,
    summary: Summary,
}

impl<W: Write> Reporter<W> {
    /// Reporter for `mode`; `debug` echoes diff output
    pub fn new(out: W, mode: ReportMode, debug: bool) -> Self {
        Self {
            out,
            mode,
            debug,
            diff_program: "diff".to_string(),
            summary: Summary::default(),
        }
    }

    /// Use a different diff executable
    #[must_use]
    pub fn with_diff_program(mut self, program: impl Into<String>) -> Self {
        self.diff_program = program.into();
        self
    }

    /// Outcomes rendered so far
    pub const fn summary(&self) -> Summary {
        self.summary
    }

    /// Render one result
    ///
    /// # Errors
    ///
    /// Only fails if the output cannot be written; operation and diff
    /// failures are rendered, not returned.
    pub async fn handle(&mut self, result: FileOperationResult, version: u32) -> Result<Outcome> {
        let outcome = match (self.mode, &result.outcome) {
            (ReportMode::Upload, Err(error)) => {
                writeln!(
                    self.out,
                    "Whoops, the file '{}' didn't upload to version '{version}' because of the following error:\n\t{}\n",
                    style(&result.name).yellow(),
                    style(error).red()
                )?;
                Outcome::Failed
            }
            (ReportMode::Upload, Ok(_)) => {
                writeln!(
                    self.out,
                    "Yay, the file '{}' in version '{}' was updated successfully",
                    style(&result.name).green(),
                    style(version).yellow()
                )?;
                Outcome::Uploaded
            }
            (ReportMode::Diff, Err(error)) => {
                writeln!(
                    self.out,
                    "\nWhoops, the file '{}' couldn't be retrieved from version '{version}':\n\t{}",
                    style(&result.name).yellow(),
                    style(error).red()
                )?;
                Outcome::Failed
            }
            (ReportMode::Diff, Ok(remote)) => self.compare(&result, remote, version).await?,
        };

        self.summary.record(outcome);
        Ok(outcome)
    }

    async fn compare(
        &mut self,
        result: &FileOperationResult,
        remote: &str,
        version: u32,
    ) -> Result<Outcome> {
        match run_diff(&self.diff_program, remote, &result.path).await {
            Ok(DiffStatus::Same) => {
                writeln!(
                    self.out,
                    "{}",
                    style(format!(
                        "\nNo difference between the version ({version}) of '{}' and the version found locally\n\t{}",
                        result.name,
                        result.path.display()
                    ))
                    .green()
                )?;
                Ok(Outcome::Matches)
            }
            Ok(DiffStatus::Different(output)) => {
                writeln!(
                    self.out,
                    "{}",
                    style(format!(
                        "\nThere was a difference between the version ({version}) of '{}' and the version found locally\n\t{}",
                        result.name,
                        result.path.display()
                    ))
                    .red()
                )?;
                if self.debug {
                    writeln!(self.out, "\n{output}")?;
                }
                Ok(Outcome::Differs)
            }
            Err(err) => {
                writeln!(
                    self.out,
                    "\nUnable to compare '{}' against {}:\n\t{}",
                    style(&result.name).yellow(),
                    result.path.display(),
                    style(format!("{err:#}")).red()
                )?;
                Ok(Outcome::Failed)
            }
        }
    }

    /// Print the closing summary line and hand back the tally
    ///
    /// # Errors
    ///
    /// Fails if the output cannot be written.
    pub fn finish(mut self) -> Result<Summary> {
        let s = self.summary;
        let failed = if s.failed > 0 {
            style(s.failed).red().to_string()
        } else {
            style(s.failed).green().to_string()
        };

        match self.mode {
            ReportMode::Upload => writeln!(
                self.out,
                "\n{} Upload summary: {} successful, {failed} failed",
                style("→").cyan(),
                style(s.uploaded).green()
            )?,
            ReportMode::Diff => writeln!(
                self.out,
                "\n{} Diff summary: {} matching, {} different, {failed} failed",
                style("→").cyan(),
                style(s.matched).green(),
                style(s.differed).yellow()
            )?,
        }
        self.out.flush()?;
        Ok(s)
    }
}

/// Feed `remote` to `diff` on stdin and compare it with `local`
async fn run_diff(program: &str, remote: &str, local: &Path) -> anyhow::Result<DiffStatus> {
    let mut child = Command::new(program)
        .args(DIFF_ARGS)
        .arg("-")
        .arg(local)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to run '{program}'"))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow::anyhow!("failed to open {program} stdin"))?;
    let remote = remote.to_owned();
    drop(tokio::spawn(async move {
        if let Err(err) = stdin.write_all(remote.as_bytes()).await {
            debug!(error = %err, "diff closed stdin early");
        }
        let _ = stdin.shutdown().await;
    }));

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("failed waiting for '{program}'"))?;

    match output.status.code() {
        Some(0) => Ok(DiffStatus::Same),
        Some(1) => Ok(DiffStatus::Different(
            String::from_utf8_lossy(&output.stdout).into_owned(),
        )),
        _ => Err(anyhow::anyhow!(
            "'{program}' exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn result(path: PathBuf, outcome: std::result::Result<String, String>) -> FileOperationResult {
        FileOperationResult {
            name: crate::operations::logical_name(&path),
            path,
            outcome,
        }
    }

    fn rendered(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.out).unwrap()
    }

    fn diff_available() -> bool {
        std::process::Command::new("diff")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    #[tokio::test]
    async fn upload_success_and_failure_lines() {
        console::set_colors_enabled(false);
        let mut reporter = Reporter::new(Vec::new(), ReportMode::Upload, false);

        let ok = reporter
            .handle(result(PathBuf::from("vcl/main.vcl"), Ok("body".into())), 4)
            .await
            .unwrap();
        let failed = reporter
            .handle(result(PathBuf::from("vcl/bad.vcl"), Err("error: boom".into())), 4)
            .await
            .unwrap();

        assert_eq!(ok, Outcome::Uploaded);
        assert_eq!(failed, Outcome::Failed);
        assert_eq!(reporter.summary().total(), 2);
        let out = rendered(reporter);
        assert!(out.contains("Yay, the file 'main' in version '4' was updated successfully"));
        assert!(out.contains("the file 'bad' didn't upload to version '4'"));
        assert!(out.contains("error: boom"));
    }

    #[tokio::test]
    async fn diff_fetch_error_is_reported_without_running_diff() {
        console::set_colors_enabled(false);
        let mut reporter = Reporter::new(Vec::new(), ReportMode::Diff, false)
            .with_diff_program("definitely-not-a-diff-binary");

        let outcome = reporter
            .handle(result(PathBuf::from("x/main.vcl"), Err("error: not found".into())), 2)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert!(rendered(reporter).contains("couldn't be retrieved from version '2'"));
    }

    #[tokio::test]
    async fn missing_diff_tool_is_a_failed_comparison() {
        console::set_colors_enabled(false);
        let mut reporter = Reporter::new(Vec::new(), ReportMode::Diff, false)
            .with_diff_program("definitely-not-a-diff-binary");

        let outcome = reporter
            .handle(result(PathBuf::from("x/main.vcl"), Ok("remote".into())), 2)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Failed);
        assert!(rendered(reporter).contains("Unable to compare 'main'"));
    }

    #[tokio::test]
    async fn diff_ignores_whitespace_and_comment_lines() {
        if !diff_available() {
            return;
        }
        console::set_colors_enabled(false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.vcl");
        std::fs::write(&path, "sub vcl_recv {\n  set req.http.X = \"1\";\n}\n").unwrap();
        let remote = "sub vcl_recv {\n\n    set req.http.X   = \"1\";\n  # a comment\n}\n";

        let mut reporter = Reporter::new(Vec::new(), ReportMode::Diff, false);
        let outcome = reporter
            .handle(result(path, Ok(remote.into())), 3)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Matches);
        assert!(rendered(reporter).contains("No difference between the version (3) of 'main'"));
    }

    #[tokio::test]
    async fn diff_reports_real_changes_and_echoes_in_debug() {
        if !diff_available() {
            return;
        }
        console::set_colors_enabled(false);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.vcl");
        std::fs::write(&path, "set req.http.X = \"1\";\n").unwrap();

        let mut reporter = Reporter::new(Vec::new(), ReportMode::Diff, true);
        let outcome = reporter
            .handle(result(path, Ok("set req.http.X = \"2\";\n".into())), 3)
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Differs);
        let out = rendered(reporter);
        assert!(out.contains("There was a difference between the version (3) of 'main'"));
        assert!(out.contains("\"2\""));
    }

    #[test]
    fn finish_prints_summary() {
        console::set_colors_enabled(false);
        let mut out = Vec::new();
        let mut reporter = Reporter::new(&mut out, ReportMode::Diff, false);
        reporter.summary.record(Outcome::Matches);
        reporter.summary.record(Outcome::Differs);
        reporter.summary.record(Outcome::Differs);

        let summary = reporter.finish().unwrap();

        assert_eq!(summary.differed, 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Diff summary: 1 matching, 2 different, 0 failed"));
    }
}
