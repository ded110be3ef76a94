pub mod context_generator;
pub mod exclusion;
pub mod file_selector;
pub mod navigation;
pub mod selection;
pub mod settings;
pub mod token_counter;
pub mod tree_view;
