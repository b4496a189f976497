pub mod update;
pub mod upload;

pub use update::{UpdateEmployeeCommand, UpdateEmployeeError, UpdateEmployeeResponse};
pub use upload::{UploadEmployeesCommand, UploadEmployeesError, UploadEmployeesResponse};
