//! Per-run outcome accounting shared by both pipelines.

use std::fmt;

/// At most this many error messages are printed; the rest are counted.
const ERROR_SAMPLE_CAP: usize = 10;

/// What a pipeline did (or, in dry-run, would do) with one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created,
    Updated,
    Linked,
    Skipped,
}

/// Counts and collected row errors for one reconciliation pass.
#[derive(Debug, Default)]
pub struct RunReport {
    pub created: usize,
    pub updated: usize,
    pub linked: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
    /// Set when the run made no persistent changes.
    pub dry_run: bool,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Created => self.created += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Linked => self.linked += 1,
            RowOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Record a row failure. `row` is the 1-based CSV line number
    /// (the header is line 1, so data rows start at 2).
    pub fn record_error(&mut self, row: usize, message: impl fmt::Display) {
        self.errors.push(format!("Row {row}: {message}"));
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "DRY RUN - no changes were made")?;
        }
        writeln!(f, "Created: {}", self.created)?;
        writeln!(f, "Updated: {}", self.updated)?;
        writeln!(f, "Linked:  {}", self.linked)?;
        writeln!(f, "Skipped: {}", self.skipped)?;
        writeln!(f, "Errors:  {}", self.errors.len())?;
        for error in self.errors.iter().take(ERROR_SAMPLE_CAP) {
            writeln!(f, "  - {error}")?;
        }
        if self.errors.len() > ERROR_SAMPLE_CAP {
            writeln!(
                f,
                "  ... and {} more errors",
                self.errors.len() - ERROR_SAMPLE_CAP
            )?;
        }
        Ok(())
    }
}
