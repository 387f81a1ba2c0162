pub mod images;
pub mod s3;
