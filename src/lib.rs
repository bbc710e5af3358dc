pub mod app;
pub mod domain;
pub mod drive;
pub mod error;
pub mod fs_util;
pub mod layout;
pub mod output;
