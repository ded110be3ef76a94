pub mod file_system;
pub mod ignore_list;
pub mod logger;
#[cfg(test)]
pub mod mem_fs;
pub mod output;
