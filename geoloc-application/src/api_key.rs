use super::*;

/// Store the API key for all following runs.
pub fn save_api_key<R>(quota_repo: &R, api_key: &str) -> Result<QuotaState>
where
    R: QuotaRepo,
{
    Ok(
        usecases::save_api_key(quota_repo, api_key, today_utc()).map_err(|err| {
            warn!("Failed to save API key: {}", err);
            err
        })?,
    )
}

/// Store a key from the environment unless a key is already stored.
///
/// Returns `true` if the key has been stored.
pub fn import_api_key<R>(quota_repo: &R, api_key: &str) -> Result<bool>
where
    R: QuotaRepo,
{
    let state = usecases::load_quota(quota_repo, today_utc())?;
    if state.has_api_key() || api_key.trim().is_empty() {
        return Ok(false);
    }
    save_api_key(quota_repo, api_key)?;
    info!("Imported API key from the environment");
    Ok(true)
}

/// The stored API key, if any.
pub fn stored_api_key<R>(quota_repo: &R) -> Result<Option<String>>
where
    R: QuotaRepo,
{
    let state = usecases::load_quota(quota_repo, today_utc())?;
    Ok(state.has_api_key().then_some(state.api_key))
}

pub fn quota_status<R>(quota_repo: &R, daily_limit: u32) -> Result<usecases::QuotaStatus>
where
    R: QuotaRepo,
{
    Ok(usecases::quota_status(quota_repo, daily_limit, now_utc())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::prelude::*;

    #[test]
    fn save_and_report_api_key() {
        let repo = MemoryQuotaRepo::default();
        assert!(!quota_status(&repo, 100).unwrap().has_api_key);
        save_api_key(&repo, "abc").unwrap();
        let status = quota_status(&repo, 100).unwrap();
        assert!(status.has_api_key);
        assert_eq!(100, status.remaining);
    }

    #[test]
    fn reject_empty_api_key() {
        let repo = MemoryQuotaRepo::default();
        let err = save_api_key(&repo, " ").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn import_api_key_only_once() {
        let repo = MemoryQuotaRepo::default();
        assert!(import_api_key(&repo, "from-env").unwrap());
        assert!(!import_api_key(&repo, "other").unwrap());
        assert_eq!("from-env", repo.stored().unwrap().api_key);
    }

    #[test]
    fn read_stored_api_key() {
        let repo = MemoryQuotaRepo::default();
        assert_eq!(None, stored_api_key(&repo).unwrap());
        let repo = MemoryQuotaRepo::with_api_key("abc");
        assert_eq!(Some("abc".to_string()), stored_api_key(&repo).unwrap());
    }
}
