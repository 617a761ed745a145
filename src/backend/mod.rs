// Store backend implementations

pub mod local;
