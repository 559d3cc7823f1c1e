use crate::data::category_repository::CategoryRepository;
use crate::domain::category::{CreateCategoryRequest, NewCategory};
use crate::domain::post::slugify;
use crate::domain::{Category, DomainError};
use std::sync::Arc;

pub struct CategoryService {
    category_repo: Arc<dyn CategoryRepository + Send + Sync>,
}

impl CategoryService {
    pub fn new(category_repo: Arc<dyn CategoryRepository + Send + Sync>) -> Self {
        Self { category_repo }
    }

    pub async fn create_category(
        &self,
        req: CreateCategoryRequest,
    ) -> Result<Category, DomainError> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }

        let slug = slugify(req.slug.as_deref().unwrap_or(&name));
        if slug.is_empty() {
            return Err(DomainError::ValidationError(
                "Category slug must contain at least one letter or digit".to_string(),
            ));
        }

        let category = self
            .category_repo
            .create(NewCategory {
                name,
                slug,
                description: req.description.filter(|d| !d.trim().is_empty()),
                is_active: req.is_active.unwrap_or(true),
            })
            .await?;

        tracing::info!("Category created: id={}, slug={}", category.id, category.slug);

        Ok(category)
    }

    pub async fn list_active(&self) -> Result<Vec<Category>, DomainError> {
        self.category_repo.list_active().await
    }

    /// Inactive categories are hidden from readers.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Category, DomainError> {
        let category = self.category_repo.find_by_slug(slug).await?;
        if !category.is_active {
            return Err(DomainError::CategoryNotFound);
        }
        Ok(category)
    }
}
