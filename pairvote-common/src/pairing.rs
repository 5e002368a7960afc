//! Pairwise matchup selection
//!
//! Decides which two artifact-generation methods a participant compares next
//! for a given survey component. The scheme is tournament-style: the
//! *champion* is the method the participant preferred in their most recent
//! vote, the *challenger* is a method they have not been shown yet.
//!
//! # Architecture
//!
//! This module contains ONLY pure functions. Persistence and HTTP concerns
//! live elsewhere; callers load the vote history, call [`next_matchup`], and
//! store the result. Every function is deterministic: the presentation order
//! is a stable shuffle seeded from the (participant, component) pair, so the
//! same participant always walks the catalog in the same order regardless of
//! when or where the selection runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Survey components whose artifacts are compared pairwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    MacroActions,
    ConversationState,
    KnowledgeGraph,
}

impl Component {
    /// All components, in canonical order
    pub const ALL: [Component; 3] = [
        Component::MacroActions,
        Component::ConversationState,
        Component::KnowledgeGraph,
    ];

    /// Wire/database identifier for this component
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::MacroActions => "macro_actions",
            Component::ConversationState => "conversation_state",
            Component::KnowledgeGraph => "knowledge_graph",
        }
    }

    /// Parse a wire/database identifier
    pub fn parse(s: &str) -> Option<Component> {
        match s {
            "macro_actions" => Some(Component::MacroActions),
            "conversation_state" => Some(Component::ConversationState),
            "knowledge_graph" => Some(Component::KnowledgeGraph),
            _ => None,
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pair of methods presented for comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    /// Previously preferred method (or the opening seed)
    pub champion: String,
    /// Method the participant has not been shown before
    pub challenger: String,
}

/// One completed comparison from the participant's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub champion: String,
    pub challenger: String,
    pub winner: String,
}

/// Stable per-participant presentation order for a method catalog
///
/// Fisher-Yates driven by a linear congruential generator seeded from the
/// (participant, component) pair. The same inputs always produce the same
/// order, so matchup selection needs no stored cursor.
///
/// # Examples
///
/// ```
/// use pairvote_common::pairing::{deterministic_order, Component};
/// use uuid::Uuid;
///
/// let methods = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// let participant = Uuid::nil();
///
/// let first = deterministic_order(&methods, participant, Component::MacroActions);
/// let second = deterministic_order(&methods, participant, Component::MacroActions);
/// assert_eq!(first, second);
/// ```
pub fn deterministic_order(
    methods: &[String],
    participant: Uuid,
    component: Component,
) -> Vec<String> {
    let mut order: Vec<String> = methods.to_vec();
    let mut state = seed(participant, component);

    // Fisher-Yates, walking down from the end
    for i in (1..order.len()).rev() {
        state = lcg_next(state);
        let j = (state % (i as u64 + 1)) as usize;
        order.swap(i, j);
    }

    order
}

/// Select the next (champion, challenger) matchup
///
/// `history` must be the participant's votes for this component in submission
/// order. Returns `None` when the component is complete: fewer than two
/// methods in the catalog, or every method already shown.
///
/// # Examples
///
/// ```
/// use pairvote_common::pairing::{next_matchup, Component, VoteOutcome};
/// use uuid::Uuid;
///
/// let methods = vec!["a".to_string(), "b".to_string(), "c".to_string()];
/// let first = next_matchup(&methods, Uuid::nil(), Component::KnowledgeGraph, &[]).unwrap();
/// assert_ne!(first.champion, first.challenger);
/// ```
pub fn next_matchup(
    methods: &[String],
    participant: Uuid,
    component: Component,
    history: &[VoteOutcome],
) -> Option<Matchup> {
    if methods.len() < 2 {
        return None;
    }

    let order = deterministic_order(methods, participant, component);

    let champion = match history.last() {
        Some(last) => last.winner.clone(),
        None => order[0].clone(),
    };

    // Challenger: first method in presentation order the participant has not
    // seen in any prior matchup (and which is not the current champion).
    let challenger = order.iter().find(|m| {
        *m != &champion && !history.iter().any(|v| &v.champion == *m || &v.challenger == *m)
    });

    // For a fresh participant nothing has been seen yet, so order[1] wins the
    // find above; afterwards an exhausted order means the component is done.
    challenger.map(|challenger| Matchup {
        champion,
        challenger: challenger.clone(),
    })
}

/// Fold the (participant, component) identity into a 64-bit seed
///
/// FNV-1a over the participant bytes and the component name. Not
/// cryptographic; it only needs to be stable and well spread.
fn seed(participant: Uuid, component: Component) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in participant.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    for byte in component.as_str().as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// One step of a linear congruential generator (Knuth MMIX constants)
fn lcg_next(state: u64) -> u64 {
    state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407)
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<String> {
        vec![
            "baseline".to_string(),
            "guided".to_string(),
            "refined".to_string(),
            "ensemble".to_string(),
        ]
    }

    fn outcome(champion: &str, challenger: &str, winner: &str) -> VoteOutcome {
        VoteOutcome {
            champion: champion.to_string(),
            challenger: challenger.to_string(),
            winner: winner.to_string(),
        }
    }

    #[test]
    fn component_round_trips_wire_names() {
        for component in Component::ALL {
            assert_eq!(Component::parse(component.as_str()), Some(component));
        }
        assert_eq!(Component::parse("nonsense"), None);
    }

    #[test]
    fn order_is_stable_for_same_participant() {
        let participant = Uuid::new_v4();
        let a = deterministic_order(&catalog(), participant, Component::MacroActions);
        let b = deterministic_order(&catalog(), participant, Component::MacroActions);
        assert_eq!(a, b);
    }

    #[test]
    fn order_is_a_permutation() {
        let mut order = deterministic_order(&catalog(), Uuid::new_v4(), Component::KnowledgeGraph);
        order.sort();
        let mut expected = catalog();
        expected.sort();
        assert_eq!(order, expected);
    }

    #[test]
    fn order_differs_across_components() {
        // Component identity feeds the seed, so the same participant walks
        // each component in its own order. An 8-method catalog makes an
        // accidental collision across all three components implausible.
        let methods: Vec<String> = (0..8).map(|i| format!("method_{}", i)).collect();
        let participant = Uuid::nil();
        let orders: Vec<Vec<String>> = Component::ALL
            .iter()
            .map(|c| deterministic_order(&methods, participant, *c))
            .collect();
        assert!(orders[0] != orders[1] || orders[1] != orders[2]);
    }

    #[test]
    fn first_matchup_uses_first_two_in_order() {
        let participant = Uuid::new_v4();
        let order = deterministic_order(&catalog(), participant, Component::ConversationState);
        let matchup =
            next_matchup(&catalog(), participant, Component::ConversationState, &[]).unwrap();
        assert_eq!(matchup.champion, order[0]);
        assert_eq!(matchup.challenger, order[1]);
    }

    #[test]
    fn champion_is_previous_winner() {
        let participant = Uuid::new_v4();
        let order = deterministic_order(&catalog(), participant, Component::MacroActions);

        let history = vec![outcome(&order[0], &order[1], &order[1])];
        let matchup =
            next_matchup(&catalog(), participant, Component::MacroActions, &history).unwrap();
        assert_eq!(matchup.champion, order[1]);
    }

    #[test]
    fn challenger_is_always_unseen() {
        let participant = Uuid::new_v4();
        let methods = catalog();
        let mut history = Vec::new();

        // Play the whole tournament, champion always retained
        while let Some(matchup) =
            next_matchup(&methods, participant, Component::KnowledgeGraph, &history)
        {
            let seen = history
                .iter()
                .flat_map(|v: &VoteOutcome| [v.champion.clone(), v.challenger.clone()])
                .collect::<Vec<_>>();
            assert!(!seen.contains(&matchup.challenger));
            history.push(outcome(
                &matchup.champion,
                &matchup.challenger,
                &matchup.champion,
            ));
        }

        // Every method was shown exactly once as part of some matchup
        assert_eq!(history.len(), methods.len() - 1);
    }

    #[test]
    fn completes_after_all_methods_seen() {
        let participant = Uuid::new_v4();
        let methods = catalog();
        let mut history = Vec::new();

        while let Some(matchup) =
            next_matchup(&methods, participant, Component::MacroActions, &history)
        {
            // Alternate winners to exercise champion switching
            let winner = if history.len() % 2 == 0 {
                matchup.challenger.clone()
            } else {
                matchup.champion.clone()
            };
            history.push(outcome(&matchup.champion, &matchup.challenger, &winner));
            assert!(history.len() <= methods.len());
        }

        assert!(next_matchup(&methods, participant, Component::MacroActions, &history).is_none());
    }

    #[test]
    fn degenerate_catalogs_produce_no_matchup() {
        let participant = Uuid::new_v4();
        assert!(next_matchup(&[], participant, Component::MacroActions, &[]).is_none());

        let single = vec!["baseline".to_string()];
        assert!(next_matchup(&single, participant, Component::MacroActions, &[]).is_none());
    }

    #[test]
    fn two_method_catalog_yields_single_round() {
        let participant = Uuid::new_v4();
        let methods = vec!["baseline".to_string(), "guided".to_string()];

        let first = next_matchup(&methods, participant, Component::KnowledgeGraph, &[]).unwrap();
        let history = vec![outcome(&first.champion, &first.challenger, &first.champion)];
        assert!(next_matchup(&methods, participant, Component::KnowledgeGraph, &history).is_none());
    }
}
