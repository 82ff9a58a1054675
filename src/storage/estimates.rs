//! Estimate persistence (estimates.json)

use crate::error::SleekError;
use crate::models::{ClientId, Estimate, EstimateId, EstimateStatus};

use super::repository::{JsonRepository, Record};

impl Record for Estimate {
    type Id = EstimateId;

    fn id(&self) -> EstimateId {
        self.id
    }
}

pub type EstimateRepository = JsonRepository<Estimate>;

impl JsonRepository<Estimate> {
    pub fn list(
        &self,
        client: Option<ClientId>,
        status: Option<EstimateStatus>,
    ) -> Result<Vec<Estimate>, SleekError> {
        let mut estimates = self.filter(|e| {
            client.map_or(true, |c| e.client_id == c) && status.map_or(true, |s| e.status == s)
        })?;
        estimates.sort_by(|a, b| {
            a.issue_date
                .cmp(&b.issue_date)
                .then_with(|| a.number.cmp(&b.number))
        });
        Ok(estimates)
    }

    pub fn has_estimates_for(&self, client: ClientId) -> Result<bool, SleekError> {
        self.any(|e| e.client_id == client)
    }

    pub fn max_sequence(&self, prefix: &str) -> Result<u32, SleekError> {
        Ok(self
            .read()?
            .values()
            .filter_map(|e| super::sequence_of(&e.number, prefix))
            .max()
            .unwrap_or(0))
    }

    pub fn resolve(&self, identifier: &str) -> Result<Option<Estimate>, SleekError> {
        let needle = identifier.trim();
        if let Some(estimate) = self.find(|e| e.number.eq_ignore_ascii_case(needle))? {
            return Ok(Some(estimate));
        }
        if let Ok(id) = needle.parse::<EstimateId>() {
            if let Some(estimate) = self.get(id)? {
                return Ok(Some(estimate));
            }
        }
        self.find_unique(needle, |e| e.id.matches_short(needle))
    }
}
