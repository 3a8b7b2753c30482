pub mod cathedral;
