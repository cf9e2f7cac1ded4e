// handlers/elevated/root/database/mod.rs - Tenant database management handlers
//
// Cross-tenant control-plane operations. All routes in this tree are gated
// to the master role.

pub mod assign; // PUT/DELETE /api/root/databases/:name/users[...]
pub mod create; // POST /api/root/databases
pub mod delete; // DELETE /api/root/databases/:name
pub mod list; //   GET /api/root/databases
pub mod sync; //   POST /api/root/databases/sync

pub use assign::{user_assign, user_revoke};
pub use create::database_create;
pub use delete::database_delete;
pub use list::database_list;
pub use sync::schemas_sync;
