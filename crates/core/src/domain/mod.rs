pub mod contract;
pub mod market;
pub mod suggestion;
pub mod token;
