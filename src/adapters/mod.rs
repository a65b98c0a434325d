pub mod aws;
pub mod notify;
pub mod queue;
pub mod secrets;
pub mod speech;
pub mod storage;
