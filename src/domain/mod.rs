pub mod credentials;
pub mod message;
