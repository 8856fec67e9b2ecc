//! # Attempt Ledger
//!
//! Every attempt the orchestrator knows about, plus the per-product
//! in-flight claim that rejects duplicate submissions.
//!
//! Finished attempts beyond `max_retained` are evicted oldest first.
//! Submitting attempts are never evicted.

use crate::domain::attempt::PurchaseAttempt;
use shared_types::{AttemptId, ProductId};
use std::collections::{HashMap, VecDeque};

#[derive(Debug)]
pub struct AttemptLedger {
    attempts: HashMap<AttemptId, PurchaseAttempt>,
    order: VecDeque<AttemptId>,
    in_flight: HashMap<ProductId, AttemptId>,
    max_retained: usize,
}

impl AttemptLedger {
    pub fn new(max_retained: usize) -> Self {
        Self {
            attempts: HashMap::new(),
            order: VecDeque::new(),
            in_flight: HashMap::new(),
            max_retained: max_retained.max(1),
        }
    }

    /// Record `attempt` and claim its product.
    ///
    /// Returns the id of the attempt already submitting for the product, if any.
    pub fn claim(&mut self, attempt: PurchaseAttempt) -> Result<(), AttemptId> {
        if let Some(existing) = self.in_flight.get(attempt.product_id()) {
            return Err(*existing);
        }
        let id = attempt.id();
        self.in_flight.insert(attempt.product_id().clone(), id);
        self.order.push_back(id);
        self.attempts.insert(id, attempt);
        Ok(())
    }

    /// Drop the claim on `product_id` if `attempt_id` holds it.
    pub fn release(&mut self, product_id: &ProductId, attempt_id: &AttemptId) -> bool {
        if self.in_flight.get(product_id) == Some(attempt_id) {
            self.in_flight.remove(product_id);
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self, product_id: &ProductId) -> Option<AttemptId> {
        self.in_flight.get(product_id).copied()
    }

    pub fn get(&self, id: &AttemptId) -> Option<&PurchaseAttempt> {
        self.attempts.get(id)
    }

    pub fn get_mut(&mut self, id: &AttemptId) -> Option<&mut PurchaseAttempt> {
        self.attempts.get_mut(id)
    }

    /// Attempts for `product_id`, oldest first.
    pub fn attempts_for(&self, product_id: &ProductId) -> Vec<PurchaseAttempt> {
        self.order
            .iter()
            .filter_map(|id| self.attempts.get(id))
            .filter(|a| a.product_id() == product_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Evict the oldest finished attempts beyond the retention cap.
    /// Returns how many were removed.
    pub fn evict_finished(&mut self) -> usize {
        let finished = self
            .attempts
            .values()
            .filter(|a| a.phase().is_terminal())
            .count();
        let mut excess = finished.saturating_sub(self.max_retained);
        if excess == 0 {
            return 0;
        }

        let mut removed = 0;
        let attempts = &mut self.attempts;
        self.order.retain(|id| {
            if excess == 0 {
                return true;
            }
            let terminal = attempts.get(id).is_some_and(|a| a.phase().is_terminal());
            if terminal {
                attempts.remove(id);
                excess -= 1;
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reason::FailureReason;

    fn submitting(product: &str) -> PurchaseAttempt {
        let mut attempt = PurchaseAttempt::new(product.into(), "pm-1".into(), 0);
        attempt.begin().unwrap();
        attempt
    }

    #[test]
    fn test_claim_rejects_second_attempt_for_product() {
        let mut ledger = AttemptLedger::new(10);
        let first = submitting("p1");
        let first_id = first.id();
        ledger.claim(first).unwrap();

        assert_eq!(ledger.claim(submitting("p1")), Err(first_id));
        assert!(ledger.claim(submitting("p2")).is_ok());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_release_only_by_holder() {
        let mut ledger = AttemptLedger::new(10);
        let attempt = submitting("p1");
        let id = attempt.id();
        ledger.claim(attempt).unwrap();

        assert!(!ledger.release(&"p1".into(), &AttemptId::new()));
        assert_eq!(ledger.in_flight(&"p1".into()), Some(id));
        assert!(ledger.release(&"p1".into(), &id));
        assert!(ledger.in_flight(&"p1".into()).is_none());
    }

    #[test]
    fn test_eviction_keeps_newest_finished_and_all_submitting() {
        let mut ledger = AttemptLedger::new(2);
        let mut ids = Vec::new();
        for _ in 0..3 {
            let attempt = submitting("p1");
            let id = attempt.id();
            ledger.claim(attempt).unwrap();
            ledger.get_mut(&id).unwrap().fail(FailureReason::Declined, 1).unwrap();
            ledger.release(&"p1".into(), &id);
            ids.push(id);
        }
        let live = submitting("p2");
        ledger.claim(live).unwrap();

        assert_eq!(ledger.evict_finished(), 1);
        assert!(ledger.get(&ids[0]).is_none());
        assert!(ledger.get(&ids[1]).is_some());
        assert_eq!(ledger.attempts_for(&"p1".into()).len(), 2);
        assert_eq!(ledger.attempts_for(&"p2".into()).len(), 1);
    }
}
