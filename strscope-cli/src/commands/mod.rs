pub mod check;
pub mod common;
pub mod dump;
pub mod info;
pub mod pack;
pub mod resolve;
