//! This module assembles the consolidated sample sheet for the uploader:
//! per-sample rows are harvested from the per-batch sheets on the NAS,
//! rewritten to the requested identifiers and appended to a copy of the
//! local template sheet.

use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::models::{MetadataRow, SamplePair, SampleRequest};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Number of columns in the uploader's sheet template.
const TEMPLATE_COLS: usize = 10;

/// Builds the sheet row for one request.
///
/// Merge samples have no sheet on the NAS, so their row is synthesized.
/// Everything else is looked up in the batch sheet discovered next to the
/// reads: the first data row whose first field contains the sample name is
/// rewritten to the requested identifiers. Returns `Ok(None)` when no row
/// matches; the caller reports those samples separately.
pub fn build_row(pair: &SamplePair, request: &SampleRequest) -> Result<Option<MetadataRow>> {
    if request.sample_name.contains("MER") {
        return Ok(Some(merge_row(request)));
    }

    let sheet = match pair.sheet.as_ref() {
        Some(sheet) => sheet,
        None => return Ok(None),
    };

    let input = File::open(sheet)
        .map_err(|e| format!("Cannot open source sheet {}: {}", sheet.display(), e))?;
    for line in BufReader::new(input).lines() {
        let line = line?;
        let mut row: Vec<String> = line.split(',').map(|f| f.to_string()).collect();

        // Section markers, column headers and blank lines carry no sample
        if row.len() <= 8 {
            continue;
        }
        if !row[0].contains(&request.sample_name) {
            continue;
        }

        if row.len() > TEMPLATE_COLS {
            warn!(
                "{}: source row has {} columns, cutting back to {}",
                request.sample_name,
                row.len(),
                TEMPLATE_COLS
            );
            row.truncate(TEMPLATE_COLS);
        }
        row.resize(TEMPLATE_COLS, String::new());

        row[0] = request.sample_id.clone();
        row[1] = request.sample_id.clone();
        row[8] = request.sample_project.clone();
        row[9] = request.sample_name.clone();
        return Ok(Some(row));
    }

    Ok(None)
}

/// Default row for merge samples.
fn merge_row(request: &SampleRequest) -> MetadataRow {
    vec![
        request.sample_id.clone(),      // Sample_ID
        request.sample_id.clone(),      // Sample_Name
        String::new(),                  // Sample_Plate
        String::new(),                  // Sample_Well
        "na".to_string(),               // I7_Index_ID
        "na".to_string(),               // index
        "na".to_string(),               // I5_Index_ID
        "na".to_string(),               // index2
        request.sample_project.clone(), // Sample_Project
        request.sample_name.clone(),    // Description
    ]
}

/// Copies the local template sheet into the destination root and returns
/// the path the collected rows will be appended to.
pub fn copy_template(template: &Path, dest_root: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dest_root)?;
    let target = dest_root.join("SampleSheet.csv");
    info!(
        "Copying the template sheet {} to {}",
        template.display(),
        target.display()
    );
    fs::copy(template, &target)
        .map_err(|e| format!("Cannot copy template sheet {}: {}", template.display(), e))?;
    Ok(target)
}

/// Appends the collected rows to the destination sheet, comma-delimited and
/// in collection order.
pub fn append_rows(sheet: &Path, rows: &[MetadataRow]) -> Result<()> {
    let mut output = OpenOptions::new().append(true).open(sheet)?;
    for row in rows {
        writeln!(output, "{}", row.join(","))?;
    }
    Ok(())
}
