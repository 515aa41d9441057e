pub mod controller;
pub mod error;
pub mod store;
pub mod view;
