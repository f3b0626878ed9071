use clap::Parser;

/// Tabulates one ranked-ballot election under four methods (instant-runoff,
/// Copeland, approval, plurality) and compares the resulting rankings.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The CSV file containing the normalized ballot table, one row per
    /// (ballot_id, rank, candidate) with an optional weight column.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// (file path, 'stdout' or empty) If specified, the summary of the comparison will be
    /// written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the summary of a previous run in JSON
    /// format. If provided, birdtally will check that the tabulated output matches the
    /// reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (string, optional) The name of the election, echoed in the JSON summary. Defaults
    /// to the input file name.
    #[clap(long, value_parser)]
    pub election_name: Option<String>,

    /// If passed as an argument, the printed report also includes the pairwise
    /// win/loss matrix.
    #[clap(long, takes_value = false)]
    pub pairwise: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
