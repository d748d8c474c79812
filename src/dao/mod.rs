/// Player and goal-event records persisted by the stats backends.
pub mod models;
/// Stats store abstraction and its backends.
pub mod stats_store;
/// Storage abstraction layer for database operations.
pub mod storage;
