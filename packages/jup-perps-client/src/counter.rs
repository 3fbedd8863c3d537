use std::time::{SystemTime, UNIX_EPOCH};

use anchor_lang::prelude::Pubkey;
use jup_perp_itf::{utils::get_position_request_pk, RequestChange};

use crate::errors::{PerpsError, PerpsResult};

/// Source of the `counter` seed of position requests.
///
/// Every request address is keyed on the counter, so two requests built from the same
/// counter for the same position and change would collide. The counter only moves forward.
#[derive(Debug, Clone)]
pub struct RequestCounter {
    next: u64,
}

impl RequestCounter {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// Start from the current unix time so that consecutive runs never reuse a counter
    pub fn from_clock() -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::new(now)
    }

    pub fn peek(&self) -> u64 {
        self.next
    }

    /// `u64::MAX` is never handed out, the counter stops one short of it
    pub fn next(&mut self) -> PerpsResult<u64> {
        let counter = self.next;
        self.next = counter.checked_add(1).ok_or(PerpsError::CounterExhausted)?;
        Ok(counter)
    }

    /// Consume a counter and return the request address it yields with it
    pub fn next_request_pk(
        &mut self,
        position_pk: &Pubkey,
        request_change: RequestChange,
    ) -> PerpsResult<(Pubkey, u64)> {
        let counter = self.peek();
        let (request_pk, _) = get_position_request_pk(position_pk, counter, request_change)?;
        self.next()?;
        Ok((request_pk, counter))
    }
}
