//! Templated seller-question generation keyed by flag type and recalls.

use crate::domain::{FlagSeverity, RedFlag, VehicleIdentity};
use crate::sources::RecallRecord;

/// Build a deduplicated question list for the buyer to take to the seller.
///
/// Questions come from three places: a baseline set every buyer should ask,
/// flag-specific questions carried on the flags themselves, and one question
/// per open recall campaign.
pub fn generate_questions_for_seller(
    vehicle: &VehicleIdentity,
    red_flags: &[RedFlag],
    recalls: &[RecallRecord],
) -> Vec<String> {
    let mut questions = vec![
        "Can I see the maintenance records?".to_string(),
        "Has the vehicle ever been in an accident?".to_string(),
        format!(
            "How long have you owned the {}?",
            vehicle.label()
        ),
    ];

    // Flag-carried questions first by severity so the most important surface
    // near the top.
    let mut flagged: Vec<&RedFlag> = red_flags
        .iter()
        .filter(|flag| flag.question_to_ask.is_some())
        .collect();
    flagged.sort_by(|a, b| b.severity.cmp(&a.severity));
    for flag in flagged {
        if let Some(question) = &flag.question_to_ask {
            questions.push(question.clone());
        }
    }

    if red_flags
        .iter()
        .any(|flag| flag.severity >= FlagSeverity::High)
    {
        questions.push("Would you agree to an independent pre-purchase inspection?".to_string());
    }

    for recall in recalls {
        questions.push(format!(
            "Has recall {} ({}) been completed?",
            recall.campaign_number,
            recall.component.to_lowercase()
        ));
    }

    dedup_preserving_order(questions)
}

fn dedup_preserving_order(questions: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    questions
        .into_iter()
        .filter(|question| seen.insert(question.clone()))
        .collect()
}
