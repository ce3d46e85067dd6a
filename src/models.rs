use std::path::PathBuf;

/// A single extraction request as recorded upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRequest {
    /// Identifier the files are stored under on the NAS
    pub sample_name: String,
    /// Identifier the copied files are renamed to
    pub sample_id: String,
    pub sample_project: String,
}

impl SampleRequest {
    /// Parses a `name,id,project` intake line. Tab-separated lines work as
    /// well since request lists tend to come out of spreadsheets.
    pub fn from_line(line: &str) -> Option<SampleRequest> {
        let parts: Vec<&str> = line
            .split(|c| c == ',' || c == '\t')
            .map(|p| p.trim())
            .collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(SampleRequest {
            sample_name: parts[0].to_string(),
            sample_id: parts[1].to_string(),
            sample_project: parts[2].to_string(),
        })
    }
}

/// Files discovered on the NAS for one request.
#[derive(Debug, Default)]
pub struct SamplePair {
    /// Read files, forward and reverse when complete
    pub reads: Vec<PathBuf>,

    /// Per-batch sample sheet sitting next to the reads
    pub sheet: Option<PathBuf>,
}

impl SamplePair {
    pub fn both_found(&self) -> bool {
        self.reads.len() == 2
    }
}

/// One row of the 10-column uploader sample sheet.
pub type MetadataRow = Vec<String>;

/// Outcome of an extraction run.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Samples with a read file that was absent or failed to copy
    pub missing: Vec<String>,

    /// Samples whose row was not found in any source sheet
    pub unmatched: Vec<String>,
}
