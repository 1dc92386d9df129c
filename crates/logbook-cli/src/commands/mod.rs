pub mod config;
pub mod diary;
pub mod index;
pub mod refresh;
pub mod status;
