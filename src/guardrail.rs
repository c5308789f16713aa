//! Output moderation guardrail boundary.
//!
//! The guardrail is built here and handed opaquely to the transport's connect
//! call; the core never inspects moderation internals. Verdicts come back
//! from the transport attached to customer messages.

use serde::Serialize;

/// Moderation categories the realtime runtime screens persona output for.
const MODERATION_CATEGORIES: &[&str] = &["offensive", "off_brand", "violence"];

/// An output guardrail configuration, opaque to the session core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputGuardrail {
    /// Guardrail identifier understood by the runtime.
    pub name: String,

    /// Name of the company the trainee represents; moderation is phrased
    /// relative to this organization.
    pub company_name: String,

    /// Categories to screen for.
    pub categories: Vec<String>,
}

/// Build the content-moderation guardrail for the given organization.
pub fn moderation_guardrail(company_name: &str) -> OutputGuardrail {
    OutputGuardrail {
        name: "moderation_guardrail".to_string(),
        company_name: company_name.to_string(),
        categories: MODERATION_CATEGORIES.iter().map(|c| c.to_string()).collect(),
    }
}
