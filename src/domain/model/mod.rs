pub mod draft;
pub mod id;
pub mod record;
