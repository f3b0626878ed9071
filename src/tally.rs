use log::{info, warn};

use ballot_compare::{run_method_comparison, Builder};
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod io_csv;
pub mod report;

#[derive(Debug, Snafu)]
pub enum TallyError {
    #[snafu(display("Error opening ballot file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading ballot file at line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Ballot file line {lineno}: {reason}"))]
    CsvLineInvalid { lineno: usize, reason: String },
    #[snafu(display("Error reading summary file"))]
    OpeningJson { source: std::io::Error },
    #[snafu(display("Error writing summary file"))]
    WritingJson { source: std::io::Error },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Ballot data rejected: {source}"))]
    Aggregation {
        source: ballot_compare::CompareErrors,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type TallyResult<T> = Result<T, TallyError>;

/// Runs the whole comparison: ingest the ballot table, rank it under the four
/// methods, print the report and optionally write or check the JSON summary.
pub fn run_tally(args: &Args) -> TallyResult<()> {
    let rows = io_csv::read_ranked_csv(&args.input)?;
    info!("run_tally: read {} rows from {}", rows.len(), args.input);

    let mut builder = Builder::new();
    for row in rows.iter() {
        builder.add_row(&row.ballot_id, row.rank, &row.candidate, row.weight);
    }
    let store = builder.build().context(AggregationSnafu {})?;
    info!(
        "run_tally: {} candidates, {} ballot groups, {} voters",
        store.candidates().len(),
        store.groups().len(),
        store.total_weight()
    );

    let result = run_method_comparison(&store).context(AggregationSnafu {})?;

    println!("{}", report::render_markdown(&result, store.total_weight()));
    if args.pairwise {
        println!("{}", report::render_pairwise(&result));
    }

    let election = args
        .election_name
        .clone()
        .unwrap_or_else(|| io_csv::simplify_file_name(&args.input));
    let summary = report::build_summary_js(&election, store.total_weight(), &result);
    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    match args.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => fs::write(path, &pretty_js_stats).context(WritingJsonSnafu {})?,
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(ref_path) = &args.reference {
        let summary_ref = read_summary(ref_path)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_str(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary");
        }
    }

    Ok(())
}

fn read_summary(path: &str) -> TallyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(data.as_bytes())
    }

    const SMALL_ELECTION: &str = "\
ballot_id,rank,candidate,weight
b1,1,Albatross,3
b1,2,Bellbird,3
b1,3,Chaffinch,3
b2,1,Bellbird,2
b2,2,Chaffinch,2
b2,3,Albatross,2
b3,1,Chaffinch,1
b3,2,Albatross,1
b3,3,Bellbird,1
";

    #[test]
    fn parse_rows_small_election() {
        let rows = io_csv::parse_rows(reader(SMALL_ELECTION)).unwrap();
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0].ballot_id, "b1");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].candidate, "Albatross");
        assert_eq!(rows[0].weight, 3);
    }

    #[test]
    fn parse_rows_weight_defaults_to_one() {
        let data = "ballot_id,rank,candidate\nb1,1,Kea\n";
        let rows = io_csv::parse_rows(reader(data)).unwrap();
        assert_eq!(rows[0].weight, 1);
    }

    #[test]
    fn parse_rows_missing_column_is_an_error() {
        let data = "ballot_id,candidate\nb1,Kea\n";
        let res = io_csv::parse_rows(reader(data));
        assert!(matches!(res, Err(TallyError::CsvLineInvalid { lineno: 1, .. })));
    }

    #[test]
    fn parse_rows_bad_rank_is_an_error() {
        let data = "ballot_id,rank,candidate\nb1,first,Kea\n";
        let res = io_csv::parse_rows(reader(data));
        assert!(matches!(res, Err(TallyError::CsvLineInvalid { lineno: 2, .. })));
    }

    #[test]
    fn end_to_end_markdown_report() {
        let rows = io_csv::parse_rows(reader(SMALL_ELECTION)).unwrap();
        let mut builder = Builder::new();
        for row in rows.iter() {
            builder.add_row(&row.ballot_id, row.rank, &row.candidate, row.weight);
        }
        let store = builder.build().unwrap();
        let result = run_method_comparison(&store).unwrap();

        let md = report::render_markdown(&result, store.total_weight());
        assert!(md.contains("| Albatross | 1 | 1 | 1 | 1 |"));
        assert!(md.contains("| Chaffinch | 3 | 3 | 1 | 3 |"));

        let js = report::build_summary_js("test", store.total_weight(), &result);
        assert_eq!(js["methods"]["IR"]["Albatross"], 1);
        assert_eq!(js["methods"]["Plurality"]["Chaffinch"], 3);
        assert_eq!(js["config"]["totalWeight"], 6);
    }

    #[test]
    fn end_to_end_duplicate_rank_is_rejected() {
        let data = "\
ballot_id,rank,candidate
b1,1,Kea
b1,1,Kakapo
b1,2,Tui
";
        let rows = io_csv::parse_rows(reader(data)).unwrap();
        let mut builder = Builder::new();
        for row in rows.iter() {
            builder.add_row(&row.ballot_id, row.rank, &row.candidate, row.weight);
        }
        let res = builder.build().context(AggregationSnafu {});
        assert!(matches!(res, Err(TallyError::Aggregation { .. })));
    }
}
