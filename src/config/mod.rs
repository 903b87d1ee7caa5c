pub mod selection;
pub mod user;

pub use selection::{Choice, Database, InitOptions, Migrations, OpenApiMode, Router, Selection};
pub use user::{load_user_config, UserConfig};
