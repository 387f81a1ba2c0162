pub mod dimensions;
pub mod format;
pub mod variant;
