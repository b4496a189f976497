pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{
    UpdateEmployeeCommand, UpdateEmployeeError, UpdateEmployeeResponse, UploadEmployeesCommand,
    UploadEmployeesError, UploadEmployeesResponse,
};

pub use queries::{
    FindDuplicatesError, FindDuplicatesQuery, FindDuplicatesResponse, GetEmployeeError,
    GetEmployeeQuery, GetEmployeeResponse, ListEmployeesError, ListEmployeesQuery,
    ListEmployeesResponse, PaginationMetadata,
};

pub use routes::employees_routes;
