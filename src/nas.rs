//! Locates read pairs and their per-batch sample sheets on the NAS backup
//! trees. Each identifier convention maps to a fixed-depth wildcard pattern
//! under the mount root.

use std::error::Error;
use std::path::{Path, PathBuf};

use glob::glob;
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::SamplePair;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Fallback tree for identifiers that match no known convention.
static DEFAULT_TREE: &str = "External_MiSeq_Backup/*/*/*.fastq.gz";

lazy_static! {
    /// Identifier convention -> backup tree, checked in order.
    static ref CONVENTIONS: Vec<(Regex, &'static str)> = vec![
        (Regex::new("SEQ").unwrap(), "MiSeq_Backup/*/*.fastq.gz"),
        (Regex::new("OLF").unwrap(), "External_MiSeq_Backup/*/*/*/*.fastq.gz"),
        (Regex::new("MER").unwrap(), "merge_Backup/*.fastq.gz"),
    ];
}

/// Selects the backup tree pattern to search for a sample identifier.
pub fn resolve(nas_mnt: &Path, sample_name: &str) -> String {
    let tree = CONVENTIONS
        .iter()
        .find(|(re, _)| re.is_match(sample_name))
        .map_or(DEFAULT_TREE, |(_, tree)| *tree);
    nas_mnt.join(tree).display().to_string()
}

/// Expands a backup tree pattern and picks up the read files belonging to
/// one sample, along with the sample sheet of the batch they came from.
///
/// Candidates are sorted before the scan so discovery does not depend on
/// directory enumeration order. The scan stops as soon as both reads of the
/// pair are present. Finding fewer than two reads is not an error here.
pub fn locate(sample_name: &str, pattern: &str) -> Result<SamplePair> {
    let mut candidates: Vec<PathBuf> = glob(pattern)?.filter_map(|p| p.ok()).collect();
    candidates.sort();

    let mut pair = SamplePair::default();
    for path in candidates {
        let text = path.display().to_string();
        if !text.contains(sample_name) {
            continue;
        }

        // The batch sheet sits in the directory part leading up to the
        // sample name
        if pair.sheet.is_none() {
            let dir = text.split(sample_name).next().unwrap_or_default();
            pair.sheet = Some(Path::new(dir).join("SampleSheet.csv"));
        }

        pair.reads.push(path);
        if pair.both_found() {
            break;
        }
    }

    Ok(pair)
}
