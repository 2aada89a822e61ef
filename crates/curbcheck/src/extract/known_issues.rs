//! Known-issue extraction: clusters raw NHTSA complaints by component and
//! grades each cluster by frequency and crash/fire/injury density.

use std::collections::BTreeMap;

use crate::domain::{IssueSeverity, KnownIssue};
use crate::sources::ComplaintRecord;

const MAX_SAMPLE_COMPLAINTS: usize = 3;
/// Clusters smaller than this are noise, not a pattern.
const MIN_CLUSTER_SIZE: usize = 3;

/// Cluster complaints into component-level defect patterns.
///
/// Severity is monotonic in cluster size and in the density of complaints
/// carrying crash/fire/injury flags. Output order is by descending severity,
/// then cluster size, so the most serious patterns lead.
pub fn cluster_complaints(complaints: &[ComplaintRecord]) -> Vec<KnownIssue> {
    let mut clusters: BTreeMap<String, Vec<&ComplaintRecord>> = BTreeMap::new();
    for complaint in complaints {
        clusters
            .entry(normalize_component(&complaint.component))
            .or_default()
            .push(complaint);
    }

    let mut issues: Vec<KnownIssue> = clusters
        .into_iter()
        .filter(|(component, members)| {
            !component.is_empty() && members.len() >= MIN_CLUSTER_SIZE
        })
        .map(|(component, members)| build_issue(component, &members))
        .collect();

    issues.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.sample_complaints.len().cmp(&a.sample_complaints.len()))
            .then(a.component.cmp(&b.component))
    });
    issues
}

fn build_issue(component: String, members: &[&ComplaintRecord]) -> KnownIssue {
    let count = members.len();
    let safety_incidents = members
        .iter()
        .filter(|complaint| complaint.crash || complaint.fire || complaint.injuries > 0)
        .count();
    let safety_density = safety_incidents as f64 / count as f64;

    let severity = grade(count, safety_density);

    let sample_complaints = members
        .iter()
        .filter(|complaint| !complaint.summary.trim().is_empty())
        .take(MAX_SAMPLE_COMPLAINTS)
        .map(|complaint| complaint.summary.trim().to_string())
        .collect();

    KnownIssue {
        description: format!(
            "{count} owner complaints reported for {}",
            component.to_lowercase()
        ),
        component,
        severity,
        has_safety_incidents: safety_incidents > 0,
        sample_complaints,
        affected_years: None,
    }
}

fn grade(count: usize, safety_density: f64) -> IssueSeverity {
    let base = if count >= 25 {
        IssueSeverity::Critical
    } else if count >= 12 {
        IssueSeverity::Major
    } else if count >= 5 {
        IssueSeverity::Moderate
    } else {
        IssueSeverity::Minor
    };

    if safety_density >= 0.25 {
        escalate(base)
    } else {
        base
    }
}

fn escalate(severity: IssueSeverity) -> IssueSeverity {
    match severity {
        IssueSeverity::Minor => IssueSeverity::Moderate,
        IssueSeverity::Moderate => IssueSeverity::Major,
        IssueSeverity::Major | IssueSeverity::Critical => IssueSeverity::Critical,
    }
}

/// NHTSA component strings are colon-delimited paths; the first segment is
/// the cluster key.
fn normalize_component(raw: &str) -> String {
    raw.split(':')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_uppercase()
}
