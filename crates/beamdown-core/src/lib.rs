pub mod catalog;
pub mod config;
pub mod driver;
pub mod errors;
pub mod events;
pub mod job;
pub mod rate;
pub mod simulator;
pub mod size;

pub use catalog::{PlatformCatalog, PlatformEntry};
pub use driver::{DriverCommand, JobOutcome, JobReport, SimulatorDriver};
pub use errors::{SimulatorError, SimulatorResult, SizeLabelError};
pub use events::{ChannelObserver, Notice, NoticeLevel, ProgressUpdate, TransferEvent, TransferObserver};
pub use job::{TransferJob, TransferState};
pub use simulator::{CancelOutcome, Confirmation, SimulatorConfig, TickOutcome, TransferSimulator};
