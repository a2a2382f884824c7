//! Embassy tasks

pub mod coordinator;
pub mod sensors;

pub use coordinator::coordinator_task;
pub use sensors::{reset_sensor_task, split_sensor_task, start_sensor_task};
