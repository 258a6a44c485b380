use super::prelude::*;
use time::{Date, OffsetDateTime, UtcOffset};

/// Load the quota and reset the counter if a new UTC day has started.
pub fn load_quota<R>(repo: &R, today: Date) -> Result<QuotaState>
where
    R: QuotaRepo,
{
    let state = repo.modify_quota(&mut |state| {
        let reset = state.roll_over(today);
        if reset {
            log::info!("Reset API usage for {}", format_iso_date(today));
        }
        reset
    })?;
    Ok(state)
}

/// Account for one executed lookup.
pub fn record_lookup<R>(repo: &R, today: Date) -> Result<QuotaState>
where
    R: QuotaRepo,
{
    let state = repo.modify_quota(&mut |state| {
        if state.roll_over(today) {
            log::info!("Reset API usage for {}", format_iso_date(today));
        }
        state.increment_usage();
        true
    })?;
    log::debug!("API usage: {}", state.usage);
    Ok(state)
}

pub fn save_api_key<R>(repo: &R, api_key: &str, today: Date) -> Result<QuotaState>
where
    R: QuotaRepo,
{
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(Error::MissingApiKey);
    }
    let state = repo.modify_quota(&mut |state| {
        state.roll_over(today);
        state.api_key = api_key.to_string();
        true
    })?;
    log::info!("API key saved");
    Ok(state)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaStatus {
    pub has_api_key: bool,
    pub used: u32,
    pub remaining: u32,
    pub limit: u32,
    pub reset_in: TimeUntilReset,
}

pub fn quota_status<R>(repo: &R, limit: u32, now: OffsetDateTime) -> Result<QuotaStatus>
where
    R: QuotaRepo,
{
    let today = now.to_offset(UtcOffset::UTC).date();
    let state = load_quota(repo, today)?;
    Ok(QuotaStatus {
        has_api_key: state.has_api_key(),
        used: state.usage,
        remaining: state.remaining(limit),
        limit,
        reset_in: TimeUntilReset::from_now(now),
    })
}
