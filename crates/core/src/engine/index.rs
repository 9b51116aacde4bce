//! Lookup structures built once per engine invocation. Nothing here mutates
//! its inputs; all indices borrow the caller's slices for the duration of
//! the call.

use std::collections::HashMap;

use crate::domain::commitment::Commitment;
use crate::domain::opportunity::Opportunity;

/// Opportunity identifier -> ordered linked commitments. Commitments without
/// an opportunity identifier are dropped outright; there is deliberately no
/// fallback matching by account identifier.
#[derive(Debug, Default)]
pub struct CommitmentIndex<'a> {
    by_opportunity: HashMap<&'a str, Vec<&'a Commitment>>,
}

impl<'a> CommitmentIndex<'a> {
    pub fn build(commitments: &'a [Commitment]) -> Self {
        let mut by_opportunity: HashMap<&str, Vec<&Commitment>> = HashMap::new();
        for commitment in commitments {
            if commitment.opportunity_id.is_empty() {
                continue;
            }
            by_opportunity.entry(commitment.opportunity_id.as_str()).or_default().push(commitment);
        }
        Self { by_opportunity }
    }

    pub fn linked(&self, opportunity_id: &str) -> &[&'a Commitment] {
        self.by_opportunity.get(opportunity_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Opportunities keyed by identifier and grouped by account, in input order.
/// Duplicate identifiers resolve last-write-wins, matching the source
/// system's export behavior.
#[derive(Debug, Default)]
pub struct OpportunityDirectory<'a> {
    by_id: HashMap<&'a str, &'a Opportunity>,
    by_account: HashMap<&'a str, Vec<&'a Opportunity>>,
}

impl<'a> OpportunityDirectory<'a> {
    pub fn build(opportunities: &'a [Opportunity]) -> Self {
        let mut by_id: HashMap<&str, &Opportunity> = HashMap::new();
        let mut by_account: HashMap<&str, Vec<&Opportunity>> = HashMap::new();
        for opportunity in opportunities {
            by_id.insert(opportunity.id.as_str(), opportunity);
            if !opportunity.account_id.is_empty() {
                by_account.entry(opportunity.account_id.as_str()).or_default().push(opportunity);
            }
        }
        Self { by_id, by_account }
    }

    pub fn get(&self, opportunity_id: &str) -> Option<&'a Opportunity> {
        self.by_id.get(opportunity_id).copied()
    }

    pub fn in_account(&self, account_id: &str) -> &[&'a Opportunity] {
        self.by_account.get(account_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Auxiliary index produced as a side effect of the unfold pass:
/// performer -> account identifier -> covered opportunity identifiers.
/// Iteration order is deterministic (first-coverage order), so downstream
/// gap detection is stable across runs.
#[derive(Debug, Default)]
pub struct CoverageIndex {
    covered: HashMap<String, HashMap<String, Vec<String>>>,
    performer_order: Vec<String>,
    account_order: HashMap<String, Vec<String>>,
}

impl CoverageIndex {
    pub fn record(&mut self, performer: &str, account_id: &str, opportunity_id: &str) {
        if !self.covered.contains_key(performer) {
            self.performer_order.push(performer.to_owned());
        }
        let accounts = self.covered.entry(performer.to_owned()).or_default();
        if !accounts.contains_key(account_id) {
            self.account_order
                .entry(performer.to_owned())
                .or_default()
                .push(account_id.to_owned());
        }
        let opportunities = accounts.entry(account_id.to_owned()).or_default();
        if !opportunities.iter().any(|id| id == opportunity_id) {
            opportunities.push(opportunity_id.to_owned());
        }
    }

    /// (performer, account id, covered opportunity ids) triples in
    /// first-coverage order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[String])> + '_ {
        self.performer_order.iter().flat_map(move |performer| {
            let accounts = &self.covered[performer];
            self.account_order
                .get(performer)
                .map(Vec::as_slice)
                .unwrap_or(&[])
                .iter()
                .map(move |account_id| {
                    (performer.as_str(), account_id.as_str(), accounts[account_id].as_slice())
                })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.performer_order.is_empty()
    }
}
