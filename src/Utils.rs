//! different utility modules used throughout the project
/// logger setup and saving of sampled bounds into csv
pub mod logger;
/// plot of a function against its Big-O / Big-Omega bounds
pub mod plots;
/// pretty-printing of an analysis as a table
pub mod result_table;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap
pub mod task_parser;
