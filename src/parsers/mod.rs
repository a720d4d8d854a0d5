mod decode;

pub mod ledger;
pub mod ofx;
pub mod traits;

pub mod prelude {
    pub use super::ledger::prelude::*;
    pub use super::ofx::prelude::*;
    pub use super::traits::Parser;
}
