pub mod entry;
pub mod habit;

pub use entry::{HabitEntry, NewHabitEntry};
pub use habit::{Habit, HabitType, InvalidHabitType, NewHabit};

/// Records that belong to exactly one user.
pub trait Owned {
    fn owner(&self) -> uuid::Uuid;
}

impl Owned for Habit {
    fn owner(&self) -> uuid::Uuid {
        self.user_id
    }
}

impl Owned for HabitEntry {
    fn owner(&self) -> uuid::Uuid {
        self.user_id
    }
}
