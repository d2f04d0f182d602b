use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::Spectrum;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a two-column (wavelength, intensity) spectrum. Dispatch by extension.
///
/// Supported formats:
/// * `.csv` – comma separated, optional header row
/// * anything else – whitespace / comma / semicolon separated text, `#`
///   comments (the export header is one big comment block)
pub fn load_two_column(path: &Path) -> Result<Spectrum> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => load_csv_rows(path)?,
        _ => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_text_rows(&text)?
        }
    };

    let mut wavelengths = Vec::with_capacity(rows.len());
    let mut intensities = Vec::with_capacity(rows.len());
    for (line, cols) in rows {
        if cols.len() < 2 {
            bail!("line {line}: expected two columns, found {}", cols.len());
        }
        wavelengths.push(cols[0]);
        intensities.push(cols[1]);
    }
    if wavelengths.is_empty() {
        bail!("{}: no data rows", path.display());
    }
    Spectrum::new(wavelengths, intensities)
}

/// Load the first column of a text file (one value per line is fine).
pub fn load_first_column(path: &Path) -> Result<Vec<f64>> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_text_rows(&text)?
        .into_iter()
        .filter_map(|(_, cols)| cols.first().copied())
        .collect())
}

// ---------------------------------------------------------------------------
// Plain text
// ---------------------------------------------------------------------------

/// Parse numeric rows, keeping 1-based line numbers for error messages.
pub fn parse_text_rows(text: &str) -> Result<Vec<(usize, Vec<f64>)>> {
    let mut rows = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cols = line
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                tok.parse::<f64>()
                    .with_context(|| format!("line {line_no}: '{tok}' is not a number"))
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push((line_no, cols));
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn load_csv_rows(path: &Path) -> Result<Vec<(usize, Vec<f64>)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let line_no = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(row_no + 1);
        let parsed: Result<Vec<f64>> = record
            .iter()
            .filter(|f| !f.is_empty())
            .map(|f| {
                f.parse::<f64>()
                    .with_context(|| format!("line {line_no}: '{f}' is not a number"))
            })
            .collect();
        match parsed {
            Ok(cols) if cols.is_empty() => continue,
            Ok(cols) => rows.push((line_no, cols)),
            // A non-numeric first record is a header row.
            Err(_) if rows.is_empty() && row_no == 0 => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn text_skips_comments_and_blank_lines() {
        let path = temp_file(
            "rusty_spectro_loader_text.txt",
            "# header\n#   more header\n\n500.0 1.5\n500.5\t2.5  # trailing\n501.0, 3.5\n",
        );
        let sp = load_two_column(&path).unwrap();
        assert_eq!(sp.wavelengths(), &[500.0, 500.5, 501.0]);
        assert_eq!(sp.intensities(), &[1.5, 2.5, 3.5]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn extra_columns_are_ignored() {
        let path = temp_file("rusty_spectro_loader_extra.txt", "1 2 3\n4 5 6\n");
        let sp = load_two_column(&path).unwrap();
        assert_eq!(sp.intensities(), &[2.0, 5.0]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_cell_reports_line() {
        let path = temp_file("rusty_spectro_loader_bad.txt", "1.0 2.0\n3.0 abc\n");
        let err = load_two_column(&path).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn single_column_is_rejected() {
        let path = temp_file("rusty_spectro_loader_one.txt", "1.0\n2.0\n");
        assert!(load_two_column(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn empty_file_is_rejected() {
        let path = temp_file("rusty_spectro_loader_empty.txt", "# only a header\n");
        assert!(load_two_column(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn csv_with_header_row() {
        let path = temp_file(
            "rusty_spectro_loader.csv",
            "wavelength,intensity\n400.0,10\n401.0,11\n",
        );
        let sp = load_two_column(&path).unwrap();
        assert_eq!(sp.wavelengths(), &[400.0, 401.0]);
        assert_eq!(sp.intensities(), &[10.0, 11.0]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn first_column_only() {
        let path = temp_file("rusty_spectro_loader_axis.txt", "400\n401 9\n402\n");
        assert_eq!(load_first_column(&path).unwrap(), vec![400.0, 401.0, 402.0]);
        let _ = std::fs::remove_file(&path);
    }
}
