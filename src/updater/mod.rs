mod batch;
mod decision;
mod run;
mod zone;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{run_batch, split_outcomes};
pub use decision::should_update;
pub use run::{run_update, RunFailure, RunOutcome, UpdateRequest};
pub use zone::{update_domain, UpdateResult, AUTH_ERROR};
