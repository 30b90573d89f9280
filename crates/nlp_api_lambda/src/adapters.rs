pub mod aws;
pub mod provider;
