pub mod async_operation;
pub mod collection;
pub mod execution;
pub mod granule;
pub mod granule_execution;
pub mod ids;
pub mod provider;
pub mod rule;
