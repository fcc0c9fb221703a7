pub mod identifier_normalizer;
