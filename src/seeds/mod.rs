pub mod sample_data_seed;
