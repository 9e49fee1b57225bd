pub mod account;
pub mod employee;
pub mod role;
pub mod salary_slip;
