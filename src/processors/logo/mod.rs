pub mod backend;
pub mod bedrock;
pub mod generator;
pub mod init;
pub mod structs;
