mod batch;
mod error;
mod lookup;
mod output;
mod quota;

#[cfg(test)]
pub mod tests;

pub use self::{batch::*, error::Error, lookup::*, output::*, quota::*};

mod prelude {
    pub use super::error::Error;
    pub type Result<T> = std::result::Result<T, Error>;
    pub use crate::{entities::*, gateways::geocode::*, repositories::*};
}
