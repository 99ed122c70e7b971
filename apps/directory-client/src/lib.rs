//! Client side of the employee directory: transports to the API and the
//! controller that keeps the visible list and dialog state in sync with it.

mod controller;
mod error;
pub mod transport;

pub use controller::{DialogState, DirectoryController, EmployeeDraft, SyncPolicy};
pub use error::{ClientError, ClientResult};
pub use transport::{ApiClient, EmployeeApi, HttpTransport, RouterTransport, Transport};
