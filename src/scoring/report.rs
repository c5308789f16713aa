//! Terminal rendering of an evaluation.

use crate::progress::AgentProgress;

use super::engine::{score_label, EvaluationResult};

/// Render an evaluation as a plain-text report for the terminal.
///
/// `progress` adds the best-score/attempt line when the trainee has history
/// with this persona.
pub fn render(
    result: &EvaluationResult,
    persona_label: &str,
    progress: Option<&AgentProgress>,
) -> String {
    let mut out = String::new();

    out.push_str("══════════════════════════════════════════════════\n");
    out.push_str(&format!("  Conversation Evaluation - {}\n", persona_label));
    out.push_str("══════════════════════════════════════════════════\n\n");

    if result.passed {
        out.push_str("  PASSED!\n");
        out.push_str(&format!(
            "  Congratulations! You've successfully handled the {} customer.\n\n",
            persona_label.to_lowercase()
        ));
    } else {
        out.push_str("  NEEDS IMPROVEMENT\n");
        out.push_str("  You need a score of 80 or higher to pass. Keep practicing!\n\n");
    }

    out.push_str(&format!(
        "  Overall Score: {}/100 ({})\n",
        result.overall,
        score_label(result.overall)
    ));
    if let Some(p) = progress {
        if p.attempts > 1 {
            out.push_str(&format!(
                "  Best score: {}/100 (Attempt {})\n",
                p.best_score, p.attempts
            ));
        }
    }
    out.push('\n');

    out.push_str(&format!(
        "  Problem Resolution  {:>2}/25\n",
        result.problem_resolution
    ));
    out.push_str(&format!("  Empathy             {:>2}/25\n", result.empathy));
    out.push_str(&format!(
        "  Communication       {:>2}/25\n",
        result.communication
    ));
    out.push_str(&format!(
        "  Professionalism     {:>2}/25\n\n",
        result.professionalism
    ));

    push_section(&mut out, "Strengths", &result.strengths);
    push_section(
        &mut out,
        "Areas for Improvement",
        &result.areas_for_improvement,
    );
    push_section(&mut out, "Specific Examples", &result.specific_examples);
    push_section(&mut out, "Recommendations", &result.recommendations);

    out.push_str("Overall Assessment:\n");
    out.push_str(&format!("  {}\n", result.summary));

    out
}

fn push_section(out: &mut String, title: &str, entries: &[String]) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("{}:\n", title));
    for entry in entries {
        out.push_str(&format!("  - {}\n", entry));
    }
    out.push('\n');
}
