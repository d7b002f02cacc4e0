pub mod csrf;
pub mod encryption;
pub mod jwt;
pub mod token;
