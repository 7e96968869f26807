//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod category;
pub mod group;
pub mod master_account;
pub mod report;
pub mod user;

pub use category::{CategoryError, CategoryRepository, UpdateCategoryInput};
pub use group::{CreateGroupInput, GroupError, GroupRepository, UpdateGroupInput};
pub use master_account::{
    CreateMasterAccountInput, MasterAccountError, MasterAccountRepository,
    UpdateMasterAccountInput,
};
pub use report::{ReportRepository, ReportRepositoryError};
pub use user::{CreateUserInput, UpdateUserInput, UserError, UserRepository};
