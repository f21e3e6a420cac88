pub mod query;
pub mod storage;
