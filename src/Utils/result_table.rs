/*
Pretty printing of an analysis as a two-column table.
*/
use crate::asymptotic::analysis::Analysis;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, PartialEq, Tabled)]
pub struct ResultRow {
    property: &'static str,
    value: String,
}

fn yes_no(flag: bool) -> String {
    (if flag { "True" } else { "False" }).to_string()
}

pub fn result_rows(analysis: &Analysis) -> Vec<ResultRow> {
    let result = &analysis.result;
    vec![
        ResultRow { property: "f(n)", value: analysis.f.to_string() },
        ResultRow { property: "g(n)", value: analysis.g.to_string() },
        ResultRow { property: "Big-O", value: yes_no(result.big_o) },
        ResultRow { property: "Big-Omega", value: yes_no(result.big_omega) },
        ResultRow { property: "Big-Theta", value: yes_no(result.big_theta) },
        ResultRow { property: "c_O", value: result.c_o.clone() },
        ResultRow { property: "c_Omega", value: result.c_omega.clone() },
        ResultRow { property: "n0", value: result.n0.clone() },
    ]
}

/// the analysis rendered as a rounded table
pub fn result_table(analysis: &Analysis) -> String {
    let mut table = Table::new(result_rows(analysis));
    table.with(Style::modern_rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asymptotic::analysis::analyze;
    use crate::asymptotic::config::AnalysisConfig;

    #[test]
    fn test_result_rows() {
        let analysis = analyze("n + log(n)", &AnalysisConfig::default()).unwrap();
        let rows = result_rows(&analysis);
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[1], ResultRow { property: "g(n)", value: "n".to_string() });
        assert_eq!(rows[4].value, "True");
        assert_eq!(rows[7].value, "symbolic");
    }

    #[test]
    fn test_result_table_contains_every_property() {
        let analysis = analyze("2^n + n", &AnalysisConfig::default()).unwrap();
        let table = result_table(&analysis);
        for property in ["f(n)", "g(n)", "Big-O", "Big-Omega", "Big-Theta", "c_O", "c_Omega", "n0"] {
            assert!(table.contains(property), "{}", property);
        }
        assert!(table.contains("2^n"));
        assert!(table.contains('╭'));
    }
}
