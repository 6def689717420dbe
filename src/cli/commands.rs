use crate::config::{DEFAULT_SHEET_NAME, USAGE_INSTRUCTIONS};
use crate::docx::{DocxApp, DocxPackage};
use crate::error::{MergeError, MergeResult};
use crate::excel::{write_sample_workbook, CalamineApp, SAMPLE_FIELDS};
use crate::form::{form_from_paths, MergeForm, RunOutcome, Stage};
use crate::loader::load_records;
use crate::types::RecordSet;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

const PROGRESS_STEPS: u64 = 1000;

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(PROGRESS_STEPS);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {percent:>3}% {msg}")
        .map(|s| s.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// Run the form with fresh host instances, drawing a progress bar.
fn run_form(form: &mut MergeForm) -> RunOutcome {
    let pb = progress_bar();
    let mut spreadsheet = CalamineApp::new();
    let mut documents = DocxApp::new();
    let outcome = form.run(&mut spreadsheet, &mut documents, |ratio| {
        pb.set_position((ratio * PROGRESS_STEPS as f64).round() as u64);
    });
    pb.finish_and_clear();
    outcome
}

/// Print a run outcome the way a dialog would show it. Failures go to stderr.
pub fn show_outcome(outcome: &RunOutcome, verbose: bool) -> MergeResult<()> {
    if outcome.is_success() {
        write_outcome(&mut std::io::stdout().lock(), outcome, verbose)
    } else {
        write_outcome(&mut std::io::stderr().lock(), outcome, verbose)
    }
}

/// Execute the run command
pub fn run(
    data: PathBuf,
    sheet: String,
    template: PathBuf,
    out: PathBuf,
    prefix: String,
    verbose: bool,
) -> MergeResult<RunOutcome> {
    println!("{}", "📄 docmerge - Generating documents".bold().green());
    println!("   Data:     {} (sheet: {})", data.display(), sheet.cyan());
    println!("   Template: {}", template.display());
    println!("   Output:   {} (prefix: {})", out.display(), prefix.cyan());
    println!();

    let mut form = form_from_paths(&data, &sheet, &template, &out, &prefix)?;
    let outcome = run_form(&mut form);
    show_outcome(&outcome, verbose)?;
    Ok(outcome)
}

/// Execute the interactive wizard on stdin/stdout
pub fn wizard(verbose: bool) -> MergeResult<RunOutcome> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    wizard_with(stdin.lock(), stdout.lock(), verbose)
}

/// Wizard over arbitrary input/output.
///
/// Each step is asked for only once the previous one is complete. An empty
/// answer to a picker re-asks it; free-text fields keep their default.
/// Closed input before the first run is an error. After a run the
/// selections can be run again as they are or adjusted first.
pub fn wizard_with<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    verbose: bool,
) -> MergeResult<RunOutcome> {
    writeln!(output, "{}", "📄 docmerge - Batch document generator".bold().green())?;
    writeln!(output, "\n{}\n", USAGE_INSTRUCTIONS)?;

    let mut form = MergeForm::new();

    while form.stage() == Stage::Initial {
        let path = ask_file(&mut input, &mut output, "📊 Spreadsheet file")?;
        form.pick_spreadsheet(path);
    }
    if let Some(sheet) = ask(
        &mut input,
        &mut output,
        &format!("   Worksheet name [{}]", form.selections().sheet_name),
    )?
    .filter(|s| !s.is_empty())
    {
        form.set_sheet_name(sheet);
    }

    while form.stage() == Stage::SpreadsheetChosen {
        let path = ask_file(&mut input, &mut output, "📑 Word template")?;
        form.pick_template(path)?;
    }

    while form.stage() == Stage::TemplateChosen {
        let path = ask(&mut input, &mut output, "📂 Output folder")?
            .ok_or_else(input_closed)?;
        form.pick_output_dir((!path.is_empty()).then(|| PathBuf::from(path)))?;
    }
    if let Some(prefix) = ask(
        &mut input,
        &mut output,
        &format!("   File prefix [{}]", form.selections().prefix),
    )?
    .filter(|s| !s.is_empty())
    {
        form.set_prefix(prefix);
    }

    loop {
        writeln!(output)?;
        let outcome = run_form(&mut form);
        write_outcome(&mut output, &outcome, verbose)?;

        let next = ask(
            &mut input,
            &mut output,
            "\n[r] run again  [a] adjust selections  [q] quit [q]",
        )?;
        match next.as_deref() {
            Some("r") | Some("R") => {}
            Some("a") | Some("A") => adjust_selections(&mut input, &mut output, &mut form)?,
            _ => return Ok(outcome),
        }
    }
}

/// Re-ask every selection with its current value as the default.
fn adjust_selections<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    form: &mut MergeForm,
) -> MergeResult<()> {
    writeln!(output, "   Press Enter to keep the current value.")?;
    let current = form.selections().clone();

    let spreadsheet = ask_optional_file(
        input,
        output,
        &format!("📊 Spreadsheet file [{}]", shown(&current.spreadsheet)),
    )?;
    form.pick_spreadsheet(spreadsheet);

    if let Some(sheet) = ask(
        input,
        output,
        &format!("   Worksheet name [{}]", current.sheet_name),
    )?
    .filter(|s| !s.is_empty())
    {
        form.set_sheet_name(sheet);
    }

    let template = ask_optional_file(
        input,
        output,
        &format!("📑 Word template [{}]", shown(&current.template)),
    )?;
    form.pick_template(template)?;

    let out_dir = ask(
        input,
        output,
        &format!("📂 Output folder [{}]", shown(&current.output_dir)),
    )?
    .filter(|s| !s.is_empty())
    .map(PathBuf::from);
    form.pick_output_dir(out_dir)?;

    if let Some(prefix) = ask(input, output, &format!("   File prefix [{}]", current.prefix))?
        .filter(|s| !s.is_empty())
    {
        form.set_prefix(prefix);
    }
    Ok(())
}

fn shown(path: &Option<PathBuf>) -> String {
    path.as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

fn write_outcome<W: Write>(output: &mut W, outcome: &RunOutcome, verbose: bool) -> MergeResult<()> {
    let label = match outcome {
        RunOutcome::Success { .. } => format!("✅ {}:", outcome.title()).bold().green(),
        RunOutcome::Failure { .. } => format!("❌ {}:", outcome.title()).bold().red(),
        RunOutcome::Incomplete => format!("⚠️  {}:", outcome.title()).bold().yellow(),
    };
    writeln!(output, "{} {}", label, outcome.message())?;
    if let (true, RunOutcome::Success { files, .. }) = (verbose, outcome) {
        for file in files {
            writeln!(output, "   {}", file.display())?;
        }
    }
    Ok(())
}

fn input_closed() -> MergeError {
    MergeError::Validation("input closed before all steps were completed".to_string())
}

/// Prompt and read one trimmed line, `None` at end of input. Surrounding
/// quotes (as added by terminal drag and drop) are removed.
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> MergeResult<Option<String>> {
    write!(output, "{}: ", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(trimmed);
    Ok(Some(unquoted.to_string()))
}

/// Ask for an existing file. An empty answer counts as a cancelled picker.
fn ask_file<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> MergeResult<Option<PathBuf>> {
    let answer = ask(input, output, label)?.ok_or_else(input_closed)?;
    existing_file(output, answer)
}

/// Like [`ask_file`], but closed input also counts as keeping the current file.
fn ask_optional_file<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> MergeResult<Option<PathBuf>> {
    match ask(input, output, label)? {
        Some(answer) => existing_file(output, answer),
        None => Ok(None),
    }
}

fn existing_file<W: Write>(output: &mut W, answer: String) -> MergeResult<Option<PathBuf>> {
    if answer.is_empty() {
        return Ok(None);
    }
    let path = PathBuf::from(answer);
    if !path.is_file() {
        writeln!(output, "   {} {}", "File not found:".yellow(), path.display())?;
        return Ok(None);
    }
    Ok(Some(path))
}

/// Execute the preview command
pub fn preview(data: PathBuf, sheet: String, json: bool) -> MergeResult<()> {
    let records = load_records(&mut CalamineApp::new(), &data, &sheet)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{}", "🔍 docmerge - Record preview".bold().green());
    println!("   File: {} (sheet: {})", data.display(), sheet.cyan());
    println!(
        "   {} field(s), {} record(s)\n",
        records.fields.len(),
        records.len()
    );
    print!("{}", format_table(&records));
    Ok(())
}

/// Records as an aligned text table, one row per record.
pub fn format_table(records: &RecordSet) -> String {
    let columns: Vec<&str> = {
        let mut seen: Vec<&str> = Vec::new();
        for field in &records.fields {
            if !seen.contains(&field.as_str()) {
                seen.push(field);
            }
        }
        seen
    };

    let index_width = records.len().to_string().len().max(1);
    let widths: Vec<usize> = columns
        .iter()
        .map(|name| {
            records
                .iter()
                .map(|r| r.get(name).unwrap_or("").chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| pad(name, *w))
        .collect();
    out.push_str(&format!("{}  {}\n", pad("#", index_width), header.join("  ").trim_end()));

    for (idx, record) in records.iter().enumerate() {
        let cells: Vec<String> = columns
            .iter()
            .zip(&widths)
            .map(|(name, w)| pad(record.get(name).unwrap_or(""), *w))
            .collect();
        out.push_str(&format!(
            "{}  {}\n",
            pad(&(idx + 1).to_string(), index_width),
            cells.join("  ").trim_end()
        ));
    }
    out
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// Fields and bookmarks compared; names only on one side are never written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkReport {
    pub matched: Vec<String>,
    pub fields_without_bookmark: Vec<String>,
    pub bookmarks_without_field: Vec<String>,
}

pub fn compare_fields(fields: &[String], bookmarks: &[String]) -> BookmarkReport {
    let mut report = BookmarkReport {
        matched: Vec::new(),
        fields_without_bookmark: Vec::new(),
        bookmarks_without_field: Vec::new(),
    };
    for field in fields {
        if report.matched.contains(field) || report.fields_without_bookmark.contains(field) {
            continue;
        }
        if bookmarks.contains(field) {
            report.matched.push(field.clone());
        } else {
            report.fields_without_bookmark.push(field.clone());
        }
    }
    report.bookmarks_without_field = bookmarks
        .iter()
        .filter(|b| !fields.contains(b))
        .cloned()
        .collect();
    report
}

/// Execute the bookmarks command
pub fn bookmarks(template: PathBuf, data: Option<PathBuf>, sheet: String) -> MergeResult<()> {
    let package = DocxPackage::open(&template)?;
    let names = package.bookmark_names();

    println!("{}", "🔖 docmerge - Template bookmarks".bold().green());
    println!("   Template: {}\n", template.display());

    if names.is_empty() {
        println!("   {}", "No bookmarks found".yellow());
    }
    for name in &names {
        let current = package.bookmark_text(name).unwrap_or_default();
        println!("   {} = {:?}", name.bright_blue(), current);
    }

    let Some(data) = data else {
        return Ok(());
    };

    let records = load_records(&mut CalamineApp::new(), &data, &sheet)?;
    let report = compare_fields(&records.fields, &names);

    println!("\n{}", "📋 Field coverage:".bold().cyan());
    println!("   Filled: {}", report.matched.len().to_string().green());
    for field in &report.fields_without_bookmark {
        println!("   {} field '{}' has no bookmark (ignored)", "⚠️".yellow(), field);
    }
    for bookmark in &report.bookmarks_without_field {
        println!("   {} bookmark '{}' has no field (left unchanged)", "ℹ️".cyan(), bookmark);
    }
    Ok(())
}

/// Execute the init command
pub fn init(dir: PathBuf, force: bool) -> MergeResult<()> {
    fs::create_dir_all(&dir)?;
    let workbook = dir.join("sample.xlsx");
    let template = dir.join("template.docx");

    if !force {
        for path in [&workbook, &template] {
            if path.exists() {
                return Err(MergeError::Validation(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
        }
    }

    write_sample_workbook(&workbook)?;
    DocxPackage::sample("Sample letter", &SAMPLE_FIELDS)?.save(&template)?;

    println!("{}", "✨ docmerge - Sample files created".bold().green());
    println!("   {}", workbook.display());
    println!("   {}", template.display());
    println!("\nTry:");
    println!(
        "   docmerge run --data {} --sheet {} --template {} --out {}",
        workbook.display(),
        DEFAULT_SHEET_NAME,
        template.display(),
        display_join(&dir, "out")
    );
    Ok(())
}

fn display_join(dir: &Path, child: &str) -> String {
    dir.join(child).display().to_string()
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
