pub mod analysis;
pub mod category;
pub mod cluster;
pub mod keyword;
pub mod research;
