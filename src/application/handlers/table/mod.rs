//! Table command and query handlers.

mod create_table;
mod delete_table;
mod queries;
mod set_table_status;

pub use create_table::{CreateTableCommand, CreateTableHandler};
pub use delete_table::DeleteTableHandler;
pub use queries::{GetTableHandler, ListTablesHandler};
pub use set_table_status::{SetTableStatusCommand, SetTableStatusHandler};

use crate::domain::foundation::{DomainError, ErrorCode, Role, TableId};
use crate::domain::table::TableError;

const TABLE_ADMINS: &[Role] = &[Role::Admin, Role::Manager];

fn store_error(table_id: TableId, err: DomainError) -> TableError {
    match err.code {
        ErrorCode::TableNotFound => TableError::NotFound(table_id),
        _ => err.into(),
    }
}
