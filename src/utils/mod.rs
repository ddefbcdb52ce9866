pub mod db_utils;
pub mod inflight;
pub mod month;
