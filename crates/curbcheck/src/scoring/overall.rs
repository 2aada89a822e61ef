//! Final verdict: weighted sub-scores minus a capped red-flag penalty.

use crate::domain::{
    Confidence, FlagSeverity, OverallResult, Recommendation, RedFlag,
};
use crate::scoring::config::OverallConfig;

/// Sub-scores feeding the verdict. `safety` and `price` may be absent; their
/// weight is redistributed proportionally among the present components.
#[derive(Debug, Clone, Copy)]
pub struct SubScores {
    pub reliability: f64,
    pub longevity: f64,
    pub price: Option<f64>,
    pub safety: Option<f64>,
}

/// Confidence tiers of each sub-result, folded into the 0-1 verdict confidence.
#[derive(Debug, Clone, Copy)]
pub struct SubConfidences {
    pub reliability: Confidence,
    pub lifespan: Confidence,
    pub price: Option<Confidence>,
    pub safety: Option<Confidence>,
}

/// Combine sub-scores and red flags into the final recommendation.
pub fn calculate_overall_score(
    scores: &SubScores,
    confidences: &SubConfidences,
    red_flags: &[RedFlag],
    config: &OverallConfig,
) -> OverallResult {
    let weighted: [(Option<f64>, f64); 4] = [
        (Some(scores.reliability), config.reliability_weight),
        (Some(scores.longevity), config.longevity_weight),
        (scores.price, config.price_weight),
        (scores.safety, config.safety_weight),
    ];

    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for (score, weight) in weighted {
        if let Some(score) = score {
            total += score.clamp(0.0, 10.0) * weight;
            weight_sum += weight;
        }
    }
    let base = if weight_sum > 0.0 { total / weight_sum } else { 0.0 };

    let penalty = flag_penalty(red_flags, config);
    let score = (base - penalty).clamp(0.0, 10.0);

    let has_critical = red_flags
        .iter()
        .any(|flag| flag.severity == FlagSeverity::Critical);

    let recommendation = if score >= config.buy_threshold && !has_critical {
        Recommendation::Buy
    } else if score >= config.maybe_threshold || (has_critical && score >= config.buy_threshold) {
        // A critical flag caps an otherwise-BUY vehicle at MAYBE.
        Recommendation::Maybe
    } else {
        Recommendation::Pass
    };

    let confidence = verdict_confidence(confidences);

    OverallResult {
        score,
        recommendation,
        confidence,
        summary: summarize(score, recommendation, red_flags),
    }
}

fn flag_penalty(red_flags: &[RedFlag], config: &OverallConfig) -> f64 {
    let total: f64 = red_flags
        .iter()
        .map(|flag| match flag.severity {
            FlagSeverity::Low => config.low_flag_penalty,
            FlagSeverity::Medium => config.medium_flag_penalty,
            FlagSeverity::High => config.high_flag_penalty,
            FlagSeverity::Critical => config.critical_flag_penalty,
        })
        .sum();
    total.min(config.flag_penalty_cap)
}

fn verdict_confidence(confidences: &SubConfidences) -> f64 {
    let tiers = [
        Some(confidences.reliability),
        Some(confidences.lifespan),
        confidences.price,
        confidences.safety,
    ];

    let mut total = 0.0;
    let mut count = 0;
    for tier in tiers.into_iter().flatten() {
        total += match tier {
            Confidence::High => 1.0,
            Confidence::Medium => 0.65,
            Confidence::Low => 0.35,
        };
        count += 1;
    }

    // Missing sub-results mean a thinner evidence base.
    let coverage = count as f64 / 4.0;
    if count == 0 {
        0.0
    } else {
        ((total / count as f64) * (0.7 + 0.3 * coverage)).clamp(0.0, 1.0)
    }
}

fn summarize(score: f64, recommendation: Recommendation, red_flags: &[RedFlag]) -> String {
    let verdict = match recommendation {
        Recommendation::Buy => "Solid buy candidate",
        Recommendation::Maybe => "Worth considering with caution",
        Recommendation::Pass => "Recommend passing",
    };

    let worst = red_flags.iter().max_by_key(|flag| flag.severity);
    match worst {
        Some(flag) => format!(
            "{verdict} (score {score:.1}/10). Biggest concern: {}",
            flag.message
        ),
        None => format!("{verdict} (score {score:.1}/10). No red flags detected"),
    }
}
