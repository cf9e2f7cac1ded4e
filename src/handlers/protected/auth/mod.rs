pub mod logout;
pub mod switch_database;
pub mod whoami;

pub use logout::session_delete;
pub use switch_database::database_post;
pub use whoami::whoami_get;
