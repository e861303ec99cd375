pub mod excel;
