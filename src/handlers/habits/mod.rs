pub mod actions;
pub mod collection;
pub mod record;

// Re-export handler functions for use in routing
pub use collection::list as habit_list;
pub use collection::create as habit_create;

pub use record::get as habit_get;
pub use record::put as habit_put;
pub use record::patch as habit_patch;
pub use record::delete as habit_delete;

pub use actions::archive as habit_archive;
pub use actions::unarchive as habit_unarchive;
