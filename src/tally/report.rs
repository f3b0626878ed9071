// Rendering of the comparison outcome: Markdown tables for the terminal and
// a JSON summary for downstream tooling.

use std::collections::HashMap;

use ballot_compare::ComparisonResult;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub election: String,
    #[serde(rename = "totalWeight")]
    pub total_weight: u64,
    pub candidates: usize,
}

/// One Markdown table keyed by candidate with the place under each method,
/// sorted by instant-runoff place. A method missing a candidate shows `-`.
pub fn render_markdown(result: &ComparisonResult, total_weight: u64) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} candidates, {} voters\n\n",
        result.candidates.len(),
        total_weight
    ));
    out.push_str("| Candidate | IR | Copeland | Approval | Plurality |\n");
    out.push_str("|-----------|---:|---------:|---------:|----------:|\n");
    for row in result.table.iter() {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            row.candidate,
            fmt_place(row.ir),
            fmt_place(row.copeland),
            fmt_place(row.approval),
            fmt_place(row.plurality)
        ));
    }
    out
}

fn fmt_place(place: Option<u32>) -> String {
    match place {
        Some(p) => p.to_string(),
        None => "-".to_string(),
    }
}

/// The win/loss matrix: each cell holds the ballot weight preferring the row
/// candidate over the column candidate.
pub fn render_pairwise(result: &ComparisonResult) -> String {
    let mut wins: HashMap<(&str, &str), u64> = HashMap::new();
    for r in result.pairwise.iter() {
        wins.insert((r.bird.as_str(), r.opponent.as_str()), r.n_wins);
    }

    let mut out = String::new();
    out.push_str("| wins over |");
    for name in result.candidates.iter() {
        out.push_str(&format!(" {} |", name));
    }
    out.push('\n');
    out.push_str("|-----------|");
    for _ in result.candidates.iter() {
        out.push_str("---:|");
    }
    out.push('\n');
    for bird in result.candidates.iter() {
        out.push_str(&format!("| {} |", bird));
        for opponent in result.candidates.iter() {
            if bird == opponent {
                out.push_str(" - |");
            } else {
                let w = wins
                    .get(&(bird.as_str(), opponent.as_str()))
                    .copied()
                    .unwrap_or(0);
                out.push_str(&format!(" {} |", w));
            }
        }
        out.push('\n');
    }
    out
}

/// Assembles the JSON summary: the election configuration, one
/// candidate-to-place object per method and the raw pairwise records.
pub fn build_summary_js(election: &str, total_weight: u64, result: &ComparisonResult) -> JSValue {
    let c = SummaryConfig {
        election: election.to_string(),
        total_weight,
        candidates: result.candidates.len(),
    };

    let named = [
        ("IR", &result.ir),
        ("Copeland", &result.copeland),
        ("Approval", &result.approval),
        ("Plurality", &result.plurality),
    ];
    let mut methods: JSMap<String, JSValue> = JSMap::new();
    for (key, placement) in named {
        let mut places: JSMap<String, JSValue> = JSMap::new();
        for (name, place) in placement.iter() {
            places.insert(name.clone(), json!(place));
        }
        methods.insert(key.to_string(), JSValue::Object(places));
    }

    let pairwise: Vec<JSValue> = result
        .pairwise
        .iter()
        .map(|r| {
            json!({
                "bird": r.bird,
                "opponent": r.opponent,
                "nWins": r.n_wins,
                "nLosses": r.n_losses,
            })
        })
        .collect();

    json!({
        "config": c,
        "methods": methods,
        "pairwise": pairwise,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_compare::{run_method_comparison, Builder};

    fn result() -> ComparisonResult {
        let mut builder = Builder::new();
        builder.add_ballot(&["Kea".to_string(), "Tui".to_string()], 3);
        builder.add_ballot(&["Tui".to_string()], 1);
        let store = builder.build().unwrap();
        run_method_comparison(&store).unwrap()
    }

    #[test]
    fn markdown_has_one_row_per_candidate() {
        let md = render_markdown(&result(), 4);
        assert!(md.contains("| Kea | 1 | 1 | 2 | 1 |"));
        assert!(md.contains("| Tui | 2 | 2 | 1 | 2 |"));
    }

    #[test]
    fn pairwise_matrix_cells() {
        let md = render_pairwise(&result());
        // Kea is preferred over Tui on 3 ballots, Tui over Kea on 1.
        assert!(md.contains("| Kea | - | 3 |"));
        assert!(md.contains("| Tui | 1 | - |"));
    }

    #[test]
    fn summary_json_shape() {
        let js = build_summary_js("backyard", 4, &result());
        assert_eq!(js["config"]["election"], "backyard");
        assert_eq!(js["methods"]["Approval"]["Tui"], 1);
        assert_eq!(js["pairwise"].as_array().unwrap().len(), 2);
    }
}
