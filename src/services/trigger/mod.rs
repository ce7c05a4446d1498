//! Trigger dispatch.
//!
//! A trigger is a positive threshold evaluation for one asset in one block. The
//! dispatcher turns it into a purchase attempt and, when live, an alert.

mod dispatcher;
mod error;

pub use dispatcher::{
	purchase_summary, DispatchMode, DispatchOutcome, TriggerDispatcher, TriggerDispatcherTrait,
	TriggerReport,
};
pub use error::TriggerError;
