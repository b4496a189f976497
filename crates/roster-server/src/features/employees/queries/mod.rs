pub mod duplicates;
pub mod get;
pub mod list;

pub use duplicates::{FindDuplicatesError, FindDuplicatesQuery, FindDuplicatesResponse};
pub use get::{GetEmployeeError, GetEmployeeQuery, GetEmployeeResponse};
pub use list::{
    ListEmployeesError, ListEmployeesQuery, ListEmployeesResponse, PaginationMetadata,
};
