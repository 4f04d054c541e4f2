pub mod api;
pub mod assets;
pub mod comments;
pub mod health;
pub mod memories;
pub mod pages;
