use std::fmt::Write as _;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use super::model::Spectrum;

pub const HEADER_START: &str = "# ------------------- HEADER ------------------- #";
pub const HEADER_END: &str = "# ----------------- END HEADER ----------------- #";
/// Comment column width before wrapping.
pub const COMMENT_WIDTH: usize = 29;
/// Prefix of wrapped comment lines; lines the text up under `# Comment:`.
const COMMENT_CONTINUATION: &str = "#                   ";
const DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Everything the export header records besides the data itself.
#[derive(Debug, Clone)]
pub struct ExportHeader {
    pub spectrometer: String,
    pub date: DateTime<Local>,
    pub integration_time_ms: f64,
    pub averaging: u32,
    pub comment: String,
}

impl ExportHeader {
    /// Render the header block for `file_name` describing `rows` samples.
    pub fn render(&self, file_name: &str, rows: usize) -> String {
        let comment = wrap_comment(&self.comment, COMMENT_WIDTH)
            .join(&format!("\n{COMMENT_CONTINUATION}"));
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{HEADER_START}");
        let _ = writeln!(out, "# Filename:         {file_name}");
        let _ = writeln!(out, "# Spectrometer:     {}", self.spectrometer);
        let _ = writeln!(out, "# Date:             {}", self.date.format(DATE_FORMAT));
        // `{:?}` keeps the decimal point: `100.0 ms`.
        let _ = writeln!(out, "# Integration time: {:?} ms", self.integration_time_ms);
        let _ = writeln!(out, "# Averaging:        {}", self.averaging);
        let _ = writeln!(out, "# Number of rows:   {rows}");
        let _ = writeln!(out, "# Comment:          {comment}");
        let _ = writeln!(out, "{HEADER_END}");
        let _ = writeln!(out);
        out
    }
}

/// Greedy word wrap in the manner of Python's `textwrap.fill`: every
/// whitespace character becomes a space, spacing inside a line is kept,
/// whitespace at line breaks is dropped and over-long words are split to
/// fill the current line.
pub fn wrap_comment(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);

    // Alternating runs of spaces and non-spaces, reversed so `pop` yields
    // the next one.
    let mut chunks: Vec<Vec<char>> = Vec::new();
    for c in text.chars() {
        let c = if c.is_whitespace() { ' ' } else { c };
        match chunks.last_mut() {
            Some(last) if (last[0] == ' ') == (c == ' ') => last.push(c),
            _ => chunks.push(vec![c]),
        }
    }
    chunks.reverse();

    let mut lines = Vec::new();
    while !chunks.is_empty() {
        if !lines.is_empty() && chunks.last().is_some_and(|c| c[0] == ' ') {
            chunks.pop();
        }
        let mut line: Vec<char> = Vec::new();
        while let Some(chunk) = chunks.pop() {
            if line.len() + chunk.len() <= width {
                line.extend(chunk);
            } else {
                chunks.push(chunk);
                break;
            }
        }
        if let Some(chunk) = chunks.last_mut() {
            if chunk.len() > width {
                let rest = chunk.split_off(width - line.len());
                line.append(chunk);
                *chunk = rest;
            }
        }
        while line.last() == Some(&' ') {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(line.into_iter().collect());
        }
    }
    lines
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// `%.18e` as numpy writes it: signed exponent with at least two digits.
pub fn format_scientific(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{v:.18e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => s,
    }
}

// ---------------------------------------------------------------------------
// File output
// ---------------------------------------------------------------------------

/// Append `.txt` when the chosen path has no extension.
pub fn with_default_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("txt")
    }
}

/// Write header and `wavelength intensity` rows to `path`.
pub fn write_spectrum(path: &Path, header: &ExportHeader, spectrum: &Spectrum) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    out.write_all(header.render(&file_name, spectrum.len()).as_bytes())
        .context("writing header")?;
    for [x, y] in spectrum.points() {
        writeln!(out, "{} {}", format_scientific(x), format_scientific(y))
            .context("writing data row")?;
    }
    out.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}
