use std::collections::HashSet;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::dataset::SessionRecord;
use crate::decision::RiskTier;

/// Per-format picks by dataset tier label, in pick order.
const DEMO_QUOTAS: &[(&str, RiskTier, usize)] = &[
    ("live", RiskTier::High, 3),
    ("live", RiskTier::Med, 3),
    ("live", RiskTier::Low, 2),
    ("short_video", RiskTier::High, 1),
    ("short_video", RiskTier::Med, 2),
    ("short_video", RiskTier::Low, 1),
];

/// Picks a small, varied demo set: a mix of formats and labelled tiers, topped
/// up at random. Deterministic for a given `seed`; at most `n` sessions and
/// never the same session id twice, even when the dataset repeats one.
pub fn select_demo_sessions(
    sessions: &[SessionRecord],
    n: usize,
    seed: u64,
) -> Vec<&SessionRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picks: Vec<&SessionRecord> = Vec::new();

    for (format, tier, quota) in DEMO_QUOTAS {
        let group: Vec<&SessionRecord> = sessions
            .iter()
            .filter(|s| s.inputs.content_format.as_str() == *format)
            .collect();
        if group.is_empty() {
            continue;
        }
        let tiered: Vec<&SessionRecord> = group
            .iter()
            .copied()
            .filter(|s| s.labeled_tier == Some(*tier))
            .collect();
        // no session carries this tier: sample the whole format instead
        let pool = if tiered.is_empty() { &group } else { &tiered };
        picks.extend(pool.choose_multiple(&mut rng, *quota).copied());
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut demo: Vec<&SessionRecord> = picks
        .into_iter()
        .filter(|s| seen.insert(s.session_id.as_str()))
        .collect();

    if demo.len() < n {
        let remaining: Vec<&SessionRecord> = sessions
            .iter()
            .filter(|s| seen.insert(s.session_id.as_str()))
            .collect();
        let missing = n - demo.len();
        demo.extend(remaining.choose_multiple(&mut rng, missing).copied());
    }

    demo.truncate(n);
    debug!("Selected {} demo sessions from {}", demo.len(), sessions.len());
    demo
}
