//! Scheduled OpenAI organization cost poller.
//!
//! A fetch run reads the admin key from the environment, pages through the
//! `/v1/organization/costs` endpoint for the lookback window and writes shields.io
//! badge JSON for the total cost and the number of cost entries. The publish step
//! commits those files back to the repository, best effort.

pub mod admin_key;
pub mod badge;
pub mod error;
pub mod output;
pub mod poller;
pub mod publish;
pub mod settings;
pub mod usage;

pub use error::{ErrorKind, PollerError};
pub use poller::{run, run_at, PollReport};
pub use publish::{publish, PublishOutcome};
pub use settings::{load_settings, PollerSettings, PublishSettings};
