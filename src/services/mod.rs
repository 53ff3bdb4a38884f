pub mod data_service;
pub mod dataset_writer;
pub mod date_range;
pub mod normalizer;
