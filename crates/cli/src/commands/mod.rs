pub mod copy_system;
pub mod lookup;
pub mod rebuild_uuid_db;
pub mod util;

pub use copy_system::*;
pub use lookup::*;
pub use rebuild_uuid_db::*;
pub use util::*;
