pub mod group_repository;
pub mod postgres_group_repository;
