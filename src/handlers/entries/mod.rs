pub mod collection;
pub mod record;

mod rules;

// Re-export handler functions for use in routing
pub use collection::list as entry_list;
pub use collection::create as entry_create;

pub use record::get as entry_get;
pub use record::put as entry_put;
pub use record::patch as entry_patch;
pub use record::delete as entry_delete;
