pub mod data_url;
pub mod lenient;
pub mod upstream;
