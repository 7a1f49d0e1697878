pub mod classify;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod download;
pub mod error;
pub mod input;
pub mod operation;
pub mod sensitive;
pub mod status;
pub mod transport;

pub use controller::{DispatchReport, OperationController};
pub use error::{ClientError, Result, TransportError};
pub use operation::OperationKind;
pub use status::{DispatchPhase, StatusMessage};
