// Low-level persistence traits.

use crate::entities::*;
use std::{io, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The requested object could not be found")]
    NotFound,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

type Result<T> = std::result::Result<T, Error>;

pub trait QuotaRepo {
    /// `None` if nothing has been stored yet.
    fn load_quota(&self) -> Result<Option<QuotaState>>;
    fn save_quota(&self, state: &QuotaState) -> Result<()>;

    /// Load, modify and store the quota in a single step.
    ///
    /// The closure returns whether it changed the state;
    /// unchanged states are not written back.
    /// Repositories that are shared between threads must override
    /// this method and hold their lock for the whole step.
    fn modify_quota(&self, modify: &mut dyn FnMut(&mut QuotaState) -> bool) -> Result<QuotaState> {
        let mut state = self.load_quota()?.unwrap_or_default();
        if modify(&mut state) {
            self.save_quota(&state)?;
        }
        Ok(state)
    }
}

impl<R> QuotaRepo for &R
where
    R: QuotaRepo + ?Sized,
{
    fn load_quota(&self) -> Result<Option<QuotaState>> {
        (**self).load_quota()
    }
    fn save_quota(&self, state: &QuotaState) -> Result<()> {
        (**self).save_quota(state)
    }
    fn modify_quota(&self, modify: &mut dyn FnMut(&mut QuotaState) -> bool) -> Result<QuotaState> {
        (**self).modify_quota(modify)
    }
}

impl<R> QuotaRepo for Arc<R>
where
    R: QuotaRepo + ?Sized,
{
    fn load_quota(&self) -> Result<Option<QuotaState>> {
        (**self).load_quota()
    }
    fn save_quota(&self, state: &QuotaState) -> Result<()> {
        (**self).save_quota(state)
    }
    fn modify_quota(&self, modify: &mut dyn FnMut(&mut QuotaState) -> bool) -> Result<QuotaState> {
        (**self).modify_quota(modify)
    }
}
