pub mod serve;
pub mod upload;
