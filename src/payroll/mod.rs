pub mod calculator;
pub mod metrics;
pub mod renderer;
pub mod service;
pub mod slip_request;
