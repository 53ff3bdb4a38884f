pub mod base;
pub mod parser;
pub mod sharesansar;
