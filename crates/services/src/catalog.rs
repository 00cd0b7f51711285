//! Product and category use cases.

use std::sync::Arc;

use domains::filters::ProductFilter;
use domains::{
    CatalogRepo, Category, DomainError, NewCategory, Page, Paginated, Product, ProductInput,
    Result, SubscriptionRepo, User,
};
use tracing::{info, instrument};

use crate::validation::{distinct, max_chars, min_chars, required, single_line};

pub const PRODUCTS_PER_PAGE: u32 = 5;
pub const PRODUCT_NAME_MAX: usize = 50;
pub const PRODUCT_DESCRIPTION_MIN: usize = 20;
pub const CATEGORY_NAME_MAX: usize = 100;

pub struct CatalogService {
    repo: Arc<dyn CatalogRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepo>, subscriptions: Arc<dyn SubscriptionRepo>) -> Self {
        Self {
            repo,
            subscriptions,
        }
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, name: String) -> Result<Category> {
        required("name", &name)?;
        max_chars("name", &name, CATEGORY_NAME_MAX)?;
        single_line("name", &name)?;
        let category = self.repo.create_category(NewCategory { name }).await?;
        info!(category_id = category.id, "category created");
        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.repo.list_categories().await
    }

    /// Deleting a category removes every product filed under it.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: i64) -> Result<()> {
        if !self.repo.delete_category(id).await? {
            return Err(DomainError::NotFound("category", id));
        }
        info!(category_id = id, "category deleted");
        Ok(())
    }

    /// Subscribes the actor if they are not subscribed yet, otherwise unsubscribes.
    #[instrument(skip(self, actor), fields(user_id = actor.id))]
    pub async fn toggle_subscription(&self, actor: &User, category_id: i64) -> Result<bool> {
        self.repo
            .get_category(category_id)
            .await?
            .ok_or(DomainError::NotFound("category", category_id))?;
        let subscribed = self
            .subscriptions
            .toggle_subscription(category_id, actor.id)
            .await?;
        info!(category_id, subscribed, "subscription toggled");
        Ok(subscribed)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: ProductInput) -> Result<Product> {
        validate_product(&input)?;
        self.ensure_category(input.category_id).await?;
        let product = self.repo.create_product(input).await?;
        info!(product_id = product.id, "product created");
        Ok(product)
    }

    pub async fn get_product(&self, id: i64) -> Result<Product> {
        self.repo
            .get_product(id)
            .await?
            .ok_or(DomainError::NotFound("product", id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn update_product(&self, id: i64, input: ProductInput) -> Result<Product> {
        validate_product(&input)?;
        self.ensure_category(input.category_id).await?;
        self.repo
            .update_product(id, input)
            .await?
            .ok_or(DomainError::NotFound("product", id))
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> Result<()> {
        if !self.repo.delete_product(id).await? {
            return Err(DomainError::NotFound("product", id));
        }
        Ok(())
    }

    pub async fn list_products(&self, filter: &ProductFilter, page: u32) -> Result<Paginated<Product>> {
        self.repo
            .list_products(filter, Page::new(page, PRODUCTS_PER_PAGE))
            .await
    }

    async fn ensure_category(&self, id: i64) -> Result<()> {
        match self.repo.get_category(id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::validation(format!("category {id} does not exist"))),
        }
    }
}

/// Form-level checks; name uniqueness is left to the store.
pub fn validate_product(input: &ProductInput) -> Result<()> {
    required("name", &input.name)?;
    max_chars("name", &input.name, PRODUCT_NAME_MAX)?;
    min_chars("description", &input.description, PRODUCT_DESCRIPTION_MIN)?;
    distinct("name", &input.name, "description", &input.description)?;
    if input.quantity < 0 {
        return Err(DomainError::validation("quantity must be zero or greater"));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(DomainError::validation("price must be zero or greater"));
    }
    Ok(())
}
