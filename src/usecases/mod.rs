#[cfg(test)]
pub mod fakes;
pub mod gateways;
pub mod ingest;
pub mod remove;
