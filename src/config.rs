
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
pub struct Opt {
    /// NAS mount root holding the sequencing backup trees
    #[structopt(default_value = "/mnt/nas", long, parse(from_os_str))]
    pub nas: PathBuf,

    /// Destination root for the uploader directory tree
    #[structopt(short, long, parse(from_os_str))]
    pub output: PathBuf,

    /// Local template sheet copied to the destination root
    #[structopt(default_value = "SampleSheet.csv", long, parse(from_os_str))]
    pub template: PathBuf,

    /// Request list with one name,id,project triple per line, or - for stdin
    pub requests: String,
}
