#[macro_use]
extern crate log;

mod config;
mod extract;
mod models;
mod nas;
mod samplesheet;

use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader};

use env_logger::Env;
use structopt::StructOpt;

use crate::models::SampleRequest;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Collects sample requests from either stdin or a file argument.
fn read_requests(source: &str) -> Result<Vec<SampleRequest>> {
    let mut requests: Vec<SampleRequest> = Vec::new();

    if source == "-" {
        for line in std::io::stdin().lock().lines() {
            collect_request(&line?, &mut requests);
        }
    } else {
        let f = File::open(source)?;
        for line in BufReader::new(f).lines() {
            collect_request(&line?, &mut requests);
        }
    }

    Ok(requests)
}

fn collect_request(line: &str, requests: &mut Vec<SampleRequest>) {
    if line.trim().is_empty() || line.starts_with('#') {
        return;
    }
    match SampleRequest::from_line(line) {
        Some(request) => requests.push(request),
        None => error!("Ignoring malformed request line: {}", line),
    }
}

fn main() -> Result<()> {
    let opt = config::Opt::from_args();

    // set up logging
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let requests = read_requests(&opt.requests)?;

    let extractor = extract::Extractor::new(&opt.nas, &opt.output, &opt.template);
    let report = extractor.run(&requests)?;

    if report.missing.is_empty() {
        info!("All requested read files were copied.");
    } else {
        warn!(
            "{} samples had read files that could not be copied:",
            report.missing.len()
        );
        for name in &report.missing {
            println!("{}", name);
        }
    }

    if !report.unmatched.is_empty() {
        warn!(
            "No sheet row was found for: {}",
            report.unmatched.join(", ")
        );
    }

    Ok(())
}
