pub mod models;
pub mod tree;
pub mod view_state;
