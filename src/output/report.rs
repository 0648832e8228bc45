use std::fmt::Write;

use crate::output::formatter::NormalizedInput;

/// Build a markdown report with a per-input summary table, the normalized
/// SQL, and the preserved literals, unsupported constructs and errors.
pub fn build_report(inputs: &[NormalizedInput]) -> String {
    let mut report = String::new();

    writeln!(report, "# sqlnorm Normalization Report").unwrap();
    writeln!(report).unwrap();

    writeln!(report, "## Summary").unwrap();
    writeln!(report).unwrap();
    writeln!(
        report,
        "| Input | Statements | Substitutions | Preserved | Unsupported |"
    )
    .unwrap();
    writeln!(
        report,
        "|-------|------------|---------------|-----------|-------------|"
    )
    .unwrap();
    for input in inputs {
        match &input.normalization {
            Some(n) => {
                let preserved: usize = n.statements.iter().map(|s| s.preserved.len()).sum();
                let unsupported: usize = n.statements.iter().map(|s| s.unsupported.len()).sum();
                writeln!(
                    report,
                    "| {} | {} | {} | {} | {} |",
                    input.label,
                    n.statements.len(),
                    n.substitution_count(),
                    preserved,
                    unsupported
                )
                .unwrap();
            }
            None => writeln!(report, "| {} | error | - | - | - |", input.label).unwrap(),
        }
    }

    let normalized: Vec<_> = inputs
        .iter()
        .filter_map(|input| input.normalization.as_ref().map(|n| (&input.label, n)))
        .collect();
    if !normalized.is_empty() {
        writeln!(report).unwrap();
        writeln!(report, "## Normalized SQL").unwrap();
        for (label, n) in &normalized {
            writeln!(report).unwrap();
            writeln!(report, "### {label}").unwrap();
            writeln!(report).unwrap();
            writeln!(report, "```sql").unwrap();
            writeln!(report, "{}", n.normalized.trim_end()).unwrap();
            writeln!(report, "```").unwrap();
        }
    }

    let mut preserved = Vec::new();
    let mut unsupported = Vec::new();
    for (label, n) in &normalized {
        for statement in &n.statements {
            for literal in &statement.preserved {
                preserved.push(format!("- {label}: `{}` ({})", literal.text, literal.site));
            }
            for construct in &statement.unsupported {
                unsupported.push(format!(
                    "- {label}: {} (bytes {}..{})",
                    construct.construct, construct.span.start, construct.span.end
                ));
            }
        }
    }
    write_section(&mut report, "Preserved Literals", &preserved);
    write_section(&mut report, "Unsupported Constructs", &unsupported);

    let errors: Vec<String> = inputs
        .iter()
        .filter_map(|input| {
            input
                .error
                .as_ref()
                .map(|error| format!("- **{}**: {error}", input.label))
        })
        .collect();
    write_section(&mut report, "Errors", &errors);

    report
}

fn write_section(report: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    writeln!(report).unwrap();
    writeln!(report, "## {title}").unwrap();
    writeln!(report).unwrap();
    for line in lines {
        writeln!(report, "{line}").unwrap();
    }
}
