pub mod admin_repository;
pub mod category_repository;
pub mod post_repository;

#[cfg(test)]
pub mod testing;
