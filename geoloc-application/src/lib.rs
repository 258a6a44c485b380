#[macro_use]
extern crate log;

mod api_key;
mod geocode_csv_file;
mod worker;

pub mod prelude {
    pub use super::{api_key::*, geocode_csv_file::*, worker::*};
}

pub mod error;

pub type Result<T> = std::result::Result<T, error::AppError>;

pub(crate) use geoloc_core::{entities::*, gateways::geocode::*, repositories::*, usecases};

#[cfg(test)]
pub(crate) mod tests;
