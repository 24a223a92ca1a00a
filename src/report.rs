use std::fmt::Write;

use crate::{
    repair::{RepairStatus, RepairSummary},
    resolver::{GroupOutcome, GroupResolution},
};

fn plugin_label(plugin_id: Option<&str>) -> &str {
    match plugin_id {
        Some(id) if !id.is_empty() => id,
        _ => "-",
    }
}

fn write_group(out: &mut String, group: &GroupResolution) {
    let _ = writeln!(
        out,
        "Fixing: {} ({} preferred assets)",
        group.key, group.preferred_count
    );
    for path in &group.missing_files {
        let _ = writeln!(out, "    Warning: File does not exist: {path}");
    }
    match (group.outcome, group.winner()) {
        (GroupOutcome::NoCandidates, _) | (_, None) => {
            let _ = writeln!(out, "  -> No preferred candidates found, left unchanged");
        }
        (outcome, Some(winner)) => {
            let verb = if outcome == GroupOutcome::WouldResolve {
                "Would set preferred"
            } else {
                "Set preferred"
            };
            let _ = writeln!(out, "    Best asset score: {}", winner.total());
            let _ = writeln!(
                out,
                "  -> {verb}: {} (source: {}, plugin: {})",
                winner.asset.path,
                winner.asset.source,
                plugin_label(winner.asset.plugin_id.as_deref())
            );
        }
    }
}

pub fn format_human_summary(summary: &RepairSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Found {} entity+type combinations with multiple preferred assets",
        summary.conflicts_found
    );
    for group in &summary.groups {
        write_group(&mut out, group);
    }

    let _ = writeln!(out, "\nSummary:");
    let _ = writeln!(out, "  Conflicts found: {}", summary.conflicts_found);
    if summary.dry_run {
        let _ = writeln!(out, "  Conflicts fixed: 0 (dry run)");
    } else {
        let _ = writeln!(out, "  Conflicts fixed: {}", summary.conflicts_fixed);
    }
    if summary.skipped > 0 {
        let _ = writeln!(out, "  Skipped:         {}", summary.skipped);
    }

    let verification = &summary.verification;
    let _ = writeln!(out, "\nVerifying fix...");
    match summary.status {
        RepairStatus::Completed => {
            let _ = writeln!(out, "All conflicts resolved!");
        }
        RepairStatus::DryRun => {
            let _ = writeln!(
                out,
                "Dry run: {} conflicts left in place",
                verification.remaining.len()
            );
        }
        RepairStatus::Unresolved => {
            let _ = writeln!(
                out,
                "ERROR: Still {} conflicts remaining!",
                verification.remaining.len()
            );
            for group in &verification.remaining {
                let _ = writeln!(
                    out,
                    "  - {} ({} preferred)",
                    group.key, group.preferred_count
                );
            }
        }
    }

    let stats = &verification.statistics;
    let _ = writeln!(out, "Statistics:");
    let _ = writeln!(out, "  Total assets: {}", stats.total);
    let _ = writeln!(out, "  Preferred assets: {}", stats.preferred);
    let _ = writeln!(out, "  Non-preferred assets: {}", stats.non_preferred);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{ConflictGroup, ConflictKey, MediaAsset},
        scoring::{RecencyPolicy, ScoreBreakdown, ScoredCandidate},
        verifier::{AssetStatistics, VerificationReport},
    };

    fn winner() -> ScoredCandidate {
        ScoredCandidate {
            asset: MediaAsset {
                id: "a".into(),
                entity_type: "album".into(),
                entity_id: "7".into(),
                asset_type: "cover".into(),
                path: "covers/a.jpg".into(),
                source: "core".into(),
                plugin_id: None,
                created_at: None,
                preferred: true,
            },
            score: ScoreBreakdown {
                file_exists: true,
                existence: 1000,
                source: 80,
                plugin: 10,
                recency: 0,
            },
        }
    }

    fn summary(status: RepairStatus, remaining: Vec<ConflictGroup>) -> RepairSummary {
        RepairSummary {
            status,
            dry_run: status == RepairStatus::DryRun,
            recency: RecencyPolicy::Timestamp,
            conflicts_found: 1,
            conflicts_fixed: usize::from(status != RepairStatus::DryRun),
            skipped: 0,
            groups: vec![GroupResolution {
                key: ConflictKey::new("album", "7", "cover"),
                preferred_count: 3,
                outcome: if status == RepairStatus::DryRun {
                    GroupOutcome::WouldResolve
                } else {
                    GroupOutcome::Resolved
                },
                candidates: vec![winner()],
                missing_files: vec!["covers/b.jpg".into()],
                demoted: 2,
            }],
            before: AssetStatistics::default(),
            verification: VerificationReport {
                remaining,
                statistics: AssetStatistics {
                    total: 3,
                    preferred: 1,
                    non_preferred: 2,
                },
            },
            elapsed_ms: 4,
        }
    }

    #[test]
    fn completed_report_lists_winner_and_statistics() {
        let text = format_human_summary(&summary(RepairStatus::Completed, Vec::new()));
        assert!(text.contains("Found 1 entity+type combinations"));
        assert!(text.contains("Fixing: album/7 type=cover (3 preferred assets)"));
        assert!(text.contains("Warning: File does not exist: covers/b.jpg"));
        assert!(text.contains("Best asset score: 1090"));
        assert!(text.contains("Set preferred: covers/a.jpg (source: core, plugin: -)"));
        assert!(text.contains("Conflicts fixed: 1"));
        assert!(text.contains("All conflicts resolved!"));
        assert!(text.contains("Non-preferred assets: 2"));
    }

    #[test]
    fn unresolved_report_lists_remaining_groups() {
        let remaining = vec![ConflictGroup {
            key: ConflictKey::new("artist", "9", "photo"),
            preferred_count: 2,
        }];
        let text = format_human_summary(&summary(RepairStatus::Unresolved, remaining));
        assert!(text.contains("ERROR: Still 1 conflicts remaining!"));
        assert!(text.contains("  - artist/9 type=photo (2 preferred)"));
    }

    #[test]
    fn dry_run_report_does_not_claim_fixes() {
        let text = format_human_summary(&summary(RepairStatus::DryRun, Vec::new()));
        assert!(text.contains("Would set preferred: covers/a.jpg"));
        assert!(text.contains("Conflicts fixed: 0 (dry run)"));
    }

    #[test]
    fn skipped_group_reports_scanned_count() {
        let mut report = summary(RepairStatus::Completed, Vec::new());
        report.groups[0].outcome = GroupOutcome::NoCandidates;
        report.groups[0].candidates.clear();
        report.groups[0].missing_files.clear();
        let text = format_human_summary(&report);
        assert!(text.contains("Fixing: album/7 type=cover (3 preferred assets)"));
        assert!(text.contains("No preferred candidates found, left unchanged"));
        assert!(!text.contains("Best asset score"));
    }
}
