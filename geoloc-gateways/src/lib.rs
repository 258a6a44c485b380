pub mod csv_file;
pub mod opencage;
pub mod quota_file;
