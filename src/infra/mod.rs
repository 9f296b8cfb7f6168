pub mod hafas;
