//! Off-ledger proposal policy
//!
//! Decides whether an address may submit another proposal and whether it has
//! to pay for it:
//! - The first proposal an address ever makes is free
//! - Later proposals carry a minimum fee, paid into the treasury
//! - At most `max_per_day` proposals per address per UTC day
//!
//! The governance program never consults this. It is advisory to the
//! submission surface only.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use echo_core::{format_units, Address, Amount, UNIT};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct PolicyConfig {
    pub max_per_day: usize,
    pub first_proposal_free: bool,
    pub min_fee: Amount,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_per_day: 3,
            first_proposal_free: true,
            // 0.01 units
            min_fee: UNIT / 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDecision {
    pub can_create: bool,
    pub is_free: bool,
    pub proposals_today: usize,
    pub total_proposals: usize,
    /// Base units
    pub min_fee: String,
    pub message: String,
}

impl PolicyDecision {
    /// Fee owed for the next proposal, zero when it is free.
    pub fn fee_due(&self, config: &PolicyConfig) -> Amount {
        if self.is_free {
            0
        } else {
            config.min_fee
        }
    }
}

/// What the policy remembers about one proposer
#[derive(Debug, Default)]
struct ProposerHistory {
    total: usize,
    /// Creation times since the start of the UTC day of the latest one
    recent: Vec<DateTime<Utc>>,
}

/// Per-address proposal history
pub struct ProposalPolicy {
    history: DashMap<Address, ProposerHistory>,
    config: PolicyConfig,
}

impl ProposalPolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            history: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn check(&self, address: &Address, now: DateTime<Utc>) -> PolicyDecision {
        let today_start = start_of_day(now);
        let (proposals_today, total_proposals) = self
            .history
            .get(address)
            .map(|entry| {
                let today = entry.recent.iter().filter(|t| **t >= today_start).count();
                (today, entry.total)
            })
            .unwrap_or((0, 0));

        let min_fee = self.config.min_fee.to_string();

        if proposals_today >= self.config.max_per_day {
            return PolicyDecision {
                can_create: false,
                is_free: false,
                proposals_today,
                total_proposals,
                min_fee,
                message: format!(
                    "Daily limit reached. You can only create {} proposals per day.",
                    self.config.max_per_day
                ),
            };
        }

        let is_free = self.config.first_proposal_free && total_proposals == 0;
        let message = if is_free {
            "Free proposal".to_string()
        } else {
            format!("{} fee required", format_units(self.config.min_fee))
        };

        PolicyDecision {
            can_create: true,
            is_free,
            proposals_today,
            total_proposals,
            min_fee,
            message,
        }
    }

    /// Count a successful proposal creation.
    /// Earlier days are dropped from the per-day record.
    pub fn record(&self, address: Address, now: DateTime<Utc>) {
        let today_start = start_of_day(now);
        let mut entry = self.history.entry(address).or_default();
        entry.total += 1;
        entry.recent.retain(|t| *t >= today_start);
        entry.recent.push(now);
    }

    /// Count a proposal made before the node started. It counts toward the
    /// total but never toward today's cap.
    pub fn restore(&self, address: Address) {
        self.history.entry(address).or_default().total += 1;
    }

    pub fn reset(&self) {
        self.history.clear();
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_first_proposal_is_free() {
        let policy = ProposalPolicy::new(PolicyConfig::default());
        let alice = Address::from_seed("alice");

        let decision = policy.check(&alice, noon());
        assert!(decision.can_create);
        assert!(decision.is_free);
        assert_eq!(decision.fee_due(policy.config()), 0);
        assert_eq!(decision.message, "Free proposal");

        policy.record(alice, noon());
        let decision = policy.check(&alice, noon());
        assert!(decision.can_create);
        assert!(!decision.is_free);
        assert_eq!(decision.fee_due(policy.config()), UNIT / 100);
        assert_eq!(decision.message, "0.01 fee required");
        assert_eq!(decision.total_proposals, 1);
    }

    #[test]
    fn test_daily_cap() {
        let policy = ProposalPolicy::new(PolicyConfig::default());
        let alice = Address::from_seed("alice");
        for i in 0..3 {
            policy.record(alice, noon() + Duration::minutes(i));
        }

        let decision = policy.check(&alice, noon() + Duration::hours(1));
        assert!(!decision.can_create);
        assert_eq!(decision.proposals_today, 3);

        // Other addresses are unaffected
        assert!(policy.check(&Address::from_seed("bob"), noon()).can_create);

        // The cap resets at UTC midnight
        let tomorrow = noon() + Duration::hours(12);
        let decision = policy.check(&alice, tomorrow);
        assert!(decision.can_create);
        assert_eq!(decision.proposals_today, 0);
        assert_eq!(decision.total_proposals, 3);
    }

    #[test]
    fn test_history_keeps_only_the_current_day() {
        let policy = ProposalPolicy::new(PolicyConfig::default());
        let alice = Address::from_seed("alice");
        for day in 0..30 {
            policy.record(alice, noon() + Duration::days(day));
        }
        policy.record(alice, noon() + Duration::days(29) + Duration::hours(1));

        assert_eq!(policy.history.get(&alice).unwrap().recent.len(), 2);

        let decision = policy.check(&alice, noon() + Duration::days(29) + Duration::hours(2));
        assert_eq!(decision.total_proposals, 31);
        assert_eq!(decision.proposals_today, 2);
    }

    #[test]
    fn test_restored_history_is_not_free() {
        let policy = ProposalPolicy::new(PolicyConfig::default());
        let alice = Address::from_seed("alice");
        policy.restore(alice);

        let decision = policy.check(&alice, noon());
        assert!(decision.can_create);
        assert!(!decision.is_free);
        assert_eq!(decision.proposals_today, 0);

        policy.reset();
        assert!(policy.check(&alice, noon()).is_free);
    }
}
