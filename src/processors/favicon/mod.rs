pub mod builder;
pub mod icon;
