pub mod favicon;
pub mod logo;
