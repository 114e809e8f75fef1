// Service exports
pub mod output;
pub mod van;

pub use output::{
    append_columns_csv, persist_ward_map, read_csv_columns, read_json, ward_file_name, write_json,
    OutputError,
};
pub use van::{DirectoryApi, VanClient, VanError};
