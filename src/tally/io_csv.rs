// Primitives for reading the long-format ballot table from CSV files.

use std::io::Read;
use std::path::Path;

use log::debug;
use snafu::prelude::*;

use ballot_compare::RankedRow;

use crate::tally::*;

/// Reads the ballot table at `path`. The file must carry a header row with
/// the columns `ballot_id`, `rank` and `candidate`; a `weight` column is
/// optional and defaults to 1.
pub fn read_ranked_csv(path: &str) -> TallyResult<Vec<RankedRow>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    parse_rows(rdr)
}

pub fn parse_rows<R: Read>(mut rdr: csv::Reader<R>) -> TallyResult<Vec<RankedRow>> {
    let headers = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1usize })?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
    let ballot_idx = column("ballot_id").context(CsvLineInvalidSnafu {
        lineno: 1usize,
        reason: "missing required column ballot_id",
    })?;
    let rank_idx = column("rank").context(CsvLineInvalidSnafu {
        lineno: 1usize,
        reason: "missing required column rank",
    })?;
    let candidate_idx = column("candidate").context(CsvLineInvalidSnafu {
        lineno: 1usize,
        reason: "missing required column candidate",
    })?;
    let weight_idx = column("weight");

    let mut res: Vec<RankedRow> = Vec::new();
    for (idx, record_r) in rdr.into_records().enumerate() {
        // Line 1 is the header.
        let lineno = idx + 2;
        let record = record_r.context(CsvLineParseSnafu { lineno })?;
        debug!("parse_rows: line {}: {:?}", lineno, record);

        let ballot_id = record.get(ballot_idx).context(CsvLineInvalidSnafu {
            lineno,
            reason: "row too short",
        })?;
        let rank_s = record.get(rank_idx).context(CsvLineInvalidSnafu {
            lineno,
            reason: "row too short",
        })?;
        let rank = rank_s.parse::<u32>().ok().context(CsvLineInvalidSnafu {
            lineno,
            reason: format!("rank is not a positive integer: {:?}", rank_s),
        })?;
        let candidate = record.get(candidate_idx).context(CsvLineInvalidSnafu {
            lineno,
            reason: "row too short",
        })?;
        if candidate.is_empty() {
            return CsvLineInvalidSnafu {
                lineno,
                reason: "empty candidate name",
            }
            .fail();
        }
        let weight: u64 = match weight_idx {
            Some(w_idx) => {
                let weight_s = record.get(w_idx).context(CsvLineInvalidSnafu {
                    lineno,
                    reason: "row too short",
                })?;
                weight_s.parse::<u64>().ok().context(CsvLineInvalidSnafu {
                    lineno,
                    reason: format!("weight is not a non-negative integer: {:?}", weight_s),
                })?
            }
            None => 1,
        };

        res.push(RankedRow {
            ballot_id: ballot_id.to_string(),
            rank,
            candidate: candidate.to_string(),
            weight,
        });
    }
    Ok(res)
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(path)
        .to_string()
}
