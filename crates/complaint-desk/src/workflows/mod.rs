pub mod complaints;
pub mod reports;
