pub mod entry;
pub mod fiscal;
pub mod goal;
pub mod recurring;
