pub mod email_registry;
pub mod lenient;
