//! Keyword sets used by the scoring engine.
//!
//! These are data, not code: the scoring contract in the tests depends on
//! exactly these phrases, so changes here are contract changes and must bump
//! the version tag.

/// Version tag of the shipped keyword sets.
pub const KEYWORD_SETS_VERSION: &str = "1";

/// Disallowed phrases. Any hit trips the rudeness gate and short-circuits
/// positive scoring.
pub const RUDE_PHRASES: &[&str] = &[
    "shut up",
    "whatever",
    "idiot",
    "stupid",
    "useless",
    "can't you understand",
    "are you deaf",
    "hurry up",
    "just do it",
];

/// Phrases that acknowledge the customer's feelings.
pub const EMPATHY_PHRASES: &[&str] = &[
    "i understand",
    "i see",
    "i can imagine",
    "i apologize",
    "you're right",
    "i know this is frustrating",
];

/// Phrases that take ownership of a path to resolution.
pub const RESOLUTION_PHRASES: &[&str] = &[
    "let me check",
    "i can help with that",
    "what i can do is",
    "we can resolve this",
    "let's fix this",
];

/// Phrases that clarify and confirm details.
pub const CLARITY_PHRASES: &[&str] = &[
    "to clarify",
    "just to confirm",
    "let me explain",
    "in other words",
];

/// Courtesy phrases that keep the tone professional.
pub const COURTESY_PHRASES: &[&str] = &[
    "thank you for your patience",
    "i appreciate you",
    "certainly",
    "absolutely",
];
