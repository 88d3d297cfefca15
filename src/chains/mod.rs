pub mod aptos;
