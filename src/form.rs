//! The merge form: step-by-step selections and the Run action.
//!
//! The visible steps are derived from what has been selected so far, never
//! toggled directly, so the progression can be driven and tested without any
//! rendering layer. Both the terminal wizard and `docmerge run` go through
//! [`MergeForm`].

use crate::config::{DEFAULT_PREFIX, DEFAULT_SHEET_NAME};
use crate::error::{MergeError, MergeResult};
use crate::filler::fill_documents;
use crate::host::{DocumentApp, SpreadsheetApp};
use crate::loader::load_records;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// How far the user has progressed through the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Only the spreadsheet step is shown.
    #[default]
    Initial,
    /// Template step revealed.
    SpreadsheetChosen,
    /// Output step revealed.
    TemplateChosen,
    /// Run enabled.
    AllChosen,
}

impl Stage {
    pub fn template_step_visible(self) -> bool {
        self >= Stage::SpreadsheetChosen
    }

    pub fn output_step_visible(self) -> bool {
        self >= Stage::TemplateChosen
    }

    pub fn run_enabled(self) -> bool {
        self == Stage::AllChosen
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selections {
    pub spreadsheet: Option<PathBuf>,
    pub sheet_name: String,
    pub template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub prefix: String,
}

impl Default for Selections {
    fn default() -> Self {
        Self {
            spreadsheet: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            template: None,
            output_dir: None,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl Selections {
    /// Stage implied by the current selections alone.
    pub fn stage(&self) -> Stage {
        match (&self.spreadsheet, &self.template, &self.output_dir) {
            (Some(_), Some(_), Some(_)) => Stage::AllChosen,
            (Some(_), Some(_), None) => Stage::TemplateChosen,
            (Some(_), None, _) => Stage::SpreadsheetChosen,
            (None, _, _) => Stage::Initial,
        }
    }
}

/// Result of the Run action, ready to be shown as a dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Success { count: usize, files: Vec<PathBuf> },
    Failure { message: String },
    /// Run requested before every step was completed.
    Incomplete,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }

    pub fn title(&self) -> &'static str {
        match self {
            RunOutcome::Success { .. } => "Done",
            RunOutcome::Failure { .. } => "Error",
            RunOutcome::Incomplete => "Missing selections",
        }
    }

    pub fn message(&self) -> String {
        match self {
            RunOutcome::Success { count, .. } => {
                format!("Successfully generated {} document(s)!", count)
            }
            RunOutcome::Failure { message } => message.clone(),
            RunOutcome::Incomplete => {
                "Please select the spreadsheet, the Word template and the output folder!"
                    .to_string()
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MergeForm {
    selections: Selections,
    stage: Stage,
    progress: f64,
}

impl MergeForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    /// Progress of the current run in `0.0..=1.0`; zero outside a run.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// `None` means the picker was cancelled and changes nothing.
    pub fn pick_spreadsheet(&mut self, path: Option<PathBuf>) -> Stage {
        if let Some(path) = path {
            self.selections.spreadsheet = Some(path);
        }
        self.refresh()
    }

    pub fn pick_template(&mut self, path: Option<PathBuf>) -> MergeResult<Stage> {
        if !self.stage.template_step_visible() {
            return Err(MergeError::StepNotAvailable(
                "choose a spreadsheet before the template".to_string(),
            ));
        }
        if let Some(path) = path {
            self.selections.template = Some(path);
        }
        Ok(self.refresh())
    }

    pub fn pick_output_dir(&mut self, path: Option<PathBuf>) -> MergeResult<Stage> {
        if !self.stage.output_step_visible() {
            return Err(MergeError::StepNotAvailable(
                "choose a template before the output folder".to_string(),
            ));
        }
        if let Some(path) = path {
            self.selections.output_dir = Some(path);
        }
        Ok(self.refresh())
    }

    pub fn set_sheet_name(&mut self, name: impl Into<String>) {
        self.selections.sheet_name = name.into();
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.selections.prefix = prefix.into();
    }

    fn refresh(&mut self) -> Stage {
        let next = self.stage.max(self.selections.stage());
        if next != self.stage {
            debug!(from = ?self.stage, to = ?next, "form stage advanced");
            self.stage = next;
        }
        self.stage
    }

    /// Load the spreadsheet and fill every document, blocking until done.
    ///
    /// The caller passes freshly started host instances; both are quit
    /// before returning, whatever the outcome, and quit failures are ignored.
    /// `on_progress` sees every progress update, including the final reset to
    /// zero. Selections are kept for the next run.
    pub fn run<S, D, P>(
        &mut self,
        spreadsheet: &mut S,
        documents: &mut D,
        mut on_progress: P,
    ) -> RunOutcome
    where
        S: SpreadsheetApp,
        D: DocumentApp,
        P: FnMut(f64),
    {
        if !self.stage.run_enabled() {
            warn!(stage = ?self.stage, "run requested with incomplete selections");
            return RunOutcome::Incomplete;
        }

        let outcome = match self.execute(spreadsheet, documents, &mut on_progress) {
            Ok(files) => {
                info!(count = files.len(), "merge finished");
                RunOutcome::Success {
                    count: files.len(),
                    files,
                }
            }
            Err(e) => {
                error!(error = ?e, "merge failed");
                RunOutcome::Failure {
                    message: e.to_string(),
                }
            }
        };

        if let Err(e) = spreadsheet.quit() {
            debug!(error = %e, "ignoring spreadsheet host quit failure");
        }
        if let Err(e) = documents.quit() {
            debug!(error = %e, "ignoring document host quit failure");
        }

        self.progress = 0.0;
        on_progress(0.0);
        outcome
    }

    fn execute<S, D, P>(
        &mut self,
        spreadsheet: &mut S,
        documents: &mut D,
        on_progress: &mut P,
    ) -> MergeResult<Vec<PathBuf>>
    where
        S: SpreadsheetApp,
        D: DocumentApp,
        P: FnMut(f64),
    {
        let selections = self.selections.clone();
        let (Some(data), Some(template), Some(out_dir)) = (
            selections.spreadsheet.as_deref(),
            selections.template.as_deref(),
            selections.output_dir.as_deref(),
        ) else {
            return Err(MergeError::Validation(
                "spreadsheet, template and output folder are required".to_string(),
            ));
        };

        let records = load_records(spreadsheet, data, &selections.sheet_name)?;
        if records.is_empty() {
            return Err(MergeError::NoRecords);
        }

        self.progress = 0.0;
        on_progress(0.0);

        let progress = &mut self.progress;
        fill_documents(
            documents,
            template,
            out_dir,
            &records.records,
            &selections.prefix,
            |p| {
                *progress = p;
                on_progress(p);
            },
        )
    }
}

/// Selections given all at once, applied in step order.
pub fn form_from_paths(
    spreadsheet: &Path,
    sheet_name: &str,
    template: &Path,
    output_dir: &Path,
    prefix: &str,
) -> MergeResult<MergeForm> {
    let mut form = MergeForm::new();
    form.set_sheet_name(sheet_name);
    form.set_prefix(prefix);
    form.pick_spreadsheet(Some(spreadsheet.to_path_buf()));
    form.pick_template(Some(template.to_path_buf()))?;
    form.pick_output_dir(Some(output_dir.to_path_buf()))?;
    Ok(form)
}
