//! Moves requested read pairs from the NAS backup trees into an uploader
//! staging directory and collects their sample sheet rows on the way.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{ExtractReport, MetadataRow, SamplePair, SampleRequest};
use crate::{nas, samplesheet};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Directory below the destination root the uploader expects reads in.
static BASECALLS_DIR: &str = "Data/Intensities/BaseCalls";

/// Read files that make up a complete pair.
const READS_PER_PAIR: usize = 2;

pub struct Extractor {
    nas_mnt: PathBuf,
    dest_root: PathBuf,
    template: PathBuf,
    basecalls: PathBuf,
    missing: Vec<String>,
    unmatched: Vec<String>,
    rows: Vec<MetadataRow>,
}

impl Extractor {
    pub fn new(nas_mnt: &Path, dest_root: &Path, template: &Path) -> Self {
        Extractor {
            nas_mnt: nas_mnt.to_path_buf(),
            dest_root: dest_root.to_path_buf(),
            template: template.to_path_buf(),
            basecalls: dest_root.join(BASECALLS_DIR),
            missing: Vec::new(),
            unmatched: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Processes all requests in order, one sample end-to-end at a time,
    /// and returns the partial-failure report. Files copied for earlier
    /// samples stay in place when a later sample fails.
    pub fn run(mut self, requests: &[SampleRequest]) -> Result<ExtractReport> {
        if requests.is_empty() {
            return Err(Box::from("No input samples were found"));
        }

        info!(
            "Found information about {} sample pairs to move",
            requests.len()
        );
        fs::create_dir_all(&self.basecalls)?;

        for (idx, request) in requests.iter().enumerate() {
            info!(
                "Moving set {} of {} for {}",
                idx + 1,
                requests.len(),
                request.sample_name
            );

            let pattern = nas::resolve(&self.nas_mnt, &request.sample_name);
            let pair = nas::locate(&request.sample_name, &pattern)?;
            self.copy_pair(&pair, request);

            match samplesheet::build_row(&pair, request)? {
                Some(row) => self.rows.push(row),
                None => {
                    warn!(
                        "{}: no matching row in any source sheet",
                        request.sample_name
                    );
                    self.unmatched.push(request.sample_name.clone());
                }
            }
        }

        let sheet = samplesheet::copy_template(&self.template, &self.dest_root)?;
        samplesheet::append_rows(&sheet, &self.rows)?;
        info!("Completed moving the requested files.");

        let mut report = ExtractReport {
            missing: self.missing,
            unmatched: self.unmatched,
        };
        report.missing.sort_unstable();
        report.missing.dedup();
        report.unmatched.sort_unstable();
        report.unmatched.dedup();
        Ok(report)
    }

    /// Copies the discovered reads of one pair under the uploader's naming
    /// convention. Failures are recorded per sample rather than raised, and
    /// an absent mate counts as a failed copy as well.
    fn copy_pair(&mut self, pair: &SamplePair, request: &SampleRequest) {
        for path in &pair.reads {
            // R2 marks the reverse read, everything else counts as forward
            let read_tag = if path.display().to_string().contains("R2") {
                "_R2"
            } else {
                "_R1"
            };
            let target = self.basecalls.join(format!(
                "{}_S1_L001{}_001.fastq.gz",
                request.sample_id, read_tag
            ));

            info!("Copying {} to {}", path.display(), target.display());
            if let Err(e) = fs::copy(path, &target) {
                error!(
                    "{}: could not copy {} to {}: {}",
                    request.sample_name,
                    path.display(),
                    self.basecalls.display(),
                    e
                );
                self.missing.push(request.sample_name.clone());
            }
        }

        for _ in pair.reads.len()..READS_PER_PAIR {
            error!(
                "{}: incomplete pair, found {} of {} read files on the NAS",
                request.sample_name,
                pair.reads.len(),
                READS_PER_PAIR
            );
            self.missing.push(request.sample_name.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, id: &str, project: &str) -> SampleRequest {
        SampleRequest {
            sample_name: name.to_string(),
            sample_id: id.to_string(),
            sample_project: project.to_string(),
        }
    }

    fn write_template(dir: &Path) -> Result<PathBuf> {
        let template = dir.join("template.csv");
        fs::write(
            &template,
            "[Data]\nSample_ID,Sample_Name,Sample_Plate,Sample_Well,I7_Index_ID,index,I5_Index_ID,index2,Sample_Project,Description\n",
        )?;
        Ok(template)
    }

    #[test]
    fn copy_pair_produces_both_read_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let src = dir.path().join("src");
        fs::create_dir_all(&src)?;
        let r1 = src.join("SEQ100_S1_L001_R1_001.fastq.gz");
        let r2 = src.join("SEQ100_S1_L001_R2_001.fastq.gz");
        fs::write(&r1, b"fwd")?;
        fs::write(&r2, b"rev")?;

        let dest = dir.path().join("out");
        let mut extractor = Extractor::new(dir.path(), &dest, Path::new("unused"));
        fs::create_dir_all(&extractor.basecalls)?;

        let pair = SamplePair {
            reads: vec![r1, r2],
            sheet: None,
        };
        extractor.copy_pair(&pair, &request("SEQ100", "NEWID", "ProjY"));

        assert!(extractor.missing.is_empty());
        let basecalls = dest.join(BASECALLS_DIR);
        assert!(basecalls.join("NEWID_S1_L001_R1_001.fastq.gz").is_file());
        assert!(basecalls.join("NEWID_S1_L001_R2_001.fastq.gz").is_file());
        Ok(())
    }

    #[test]
    fn incomplete_pair_is_recorded_missing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let src = dir.path().join("src");
        fs::create_dir_all(&src)?;
        let r1 = src.join("SEQ200_S1_L001_R1_001.fastq.gz");
        fs::write(&r1, b"fwd")?;

        let dest = dir.path().join("out");
        let mut extractor = Extractor::new(dir.path(), &dest, Path::new("unused"));
        fs::create_dir_all(&extractor.basecalls)?;

        let pair = SamplePair {
            reads: vec![r1],
            sheet: None,
        };
        extractor.copy_pair(&pair, &request("SEQ200", "ID2", "ProjY"));
        assert_eq!(extractor.missing, vec!["SEQ200"]);

        // the read that does exist was still copied
        assert!(dest
            .join(BASECALLS_DIR)
            .join("ID2_S1_L001_R1_001.fastq.gz")
            .is_file());

        extractor.copy_pair(&SamplePair::default(), &request("SEQ201", "ID3", "ProjY"));
        assert_eq!(extractor.missing, vec!["SEQ200", "SEQ201", "SEQ201"]);
        Ok(())
    }

    #[test]
    fn empty_request_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = Extractor::new(dir.path(), &dir.path().join("out"), Path::new("unused"));
        assert!(extractor.run(&[]).is_err());
    }

    #[test]
    fn end_to_end_extraction() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nas = dir.path().join("nas");

        // one regular sample with a batch sheet next to its reads
        let run = nas.join("MiSeq_Backup/run1");
        fs::create_dir_all(&run)?;
        fs::write(run.join("SEQ100_S1_L001_R1_001.fastq.gz"), b"fwd")?;
        fs::write(run.join("SEQ100_S1_L001_R2_001.fastq.gz"), b"rev")?;
        fs::write(
            run.join("SampleSheet.csv"),
            "[Header]\nChemistry,Amplicon\n[Data]\n\
             Sample_ID,Sample_Name,Sample_Plate,Sample_Well,I7_Index_ID,index,I5_Index_ID,index2,Sample_Project,Description\n\
             SEQ100,SEQ100,P1,A1,i1,idx1,i2,idx2,ProjX,descOld\n",
        )?;

        // one merge sample, which has no sheet on the NAS at all
        let merge = nas.join("merge_Backup");
        fs::create_dir_all(&merge)?;
        fs::write(merge.join("MER200_S1_L001_R1_001.fastq.gz"), b"fwd")?;
        fs::write(merge.join("MER200_S1_L001_R2_001.fastq.gz"), b"rev")?;

        let template = write_template(dir.path())?;
        let dest = dir.path().join("out");

        let requests = vec![
            request("SEQ100", "NEWID", "ProjY"),
            request("MER200", "M2", "ProjZ"),
        ];
        let report = Extractor::new(&nas, &dest, &template).run(&requests)?;

        assert!(report.missing.is_empty());
        assert!(report.unmatched.is_empty());

        let basecalls = dest.join(BASECALLS_DIR);
        for name in &[
            "NEWID_S1_L001_R1_001.fastq.gz",
            "NEWID_S1_L001_R2_001.fastq.gz",
            "M2_S1_L001_R1_001.fastq.gz",
            "M2_S1_L001_R2_001.fastq.gz",
        ] {
            assert!(basecalls.join(name).is_file(), "missing {}", name);
        }

        let sheet = fs::read_to_string(dest.join("SampleSheet.csv"))?;
        let lines: Vec<&str> = sheet.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[2],
            "NEWID,NEWID,P1,A1,i1,idx1,i2,idx2,ProjY,SEQ100"
        );
        assert_eq!(lines[3], "M2,M2,,,na,na,na,na,ProjZ,MER200");
        Ok(())
    }

    #[test]
    fn vanished_sample_lands_in_both_lists() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nas = dir.path().join("nas");
        fs::create_dir_all(nas.join("MiSeq_Backup"))?;

        let template = write_template(dir.path())?;
        let dest = dir.path().join("out");

        let report = Extractor::new(&nas, &dest, &template)
            .run(&[request("SEQ404", "ID", "ProjY")])?;

        assert_eq!(report.missing, vec!["SEQ404"]);
        assert_eq!(report.unmatched, vec!["SEQ404"]);

        // the run still completes with a valid, row-less sheet
        let sheet = fs::read_to_string(dest.join("SampleSheet.csv"))?;
        assert_eq!(sheet.lines().count(), 2);
        Ok(())
    }
}
