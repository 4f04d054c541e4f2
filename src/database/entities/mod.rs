pub mod access_codes;
pub mod comments;
pub mod memories;
