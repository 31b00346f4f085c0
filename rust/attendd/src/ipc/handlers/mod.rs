pub mod core;
pub mod gate;
pub mod lectures;
pub mod limits;
pub mod subjects;
