pub mod geo;
pub mod rupiah;
