use async_trait::async_trait;
use domains::filters::ProductFilter;
use domains::{
    CatalogRepo, Category, NewCategory, Page, Paginated, Product, ProductInput, Result,
};
use sqlx::{FromRow, Postgres, QueryBuilder};

use super::{db_error, like_pattern, PgStore};

#[derive(FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    quantity: i32,
    price: f64,
    category_id: i64,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            quantity: row.quantity,
            price: row.price,
            category_id: row.category_id,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, quantity, price, category_id";

fn push_product_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = &filter.name_icontains {
        qb.push(" AND name ILIKE ").push_bind(like_pattern(name));
    }
    if let Some(quantity) = filter.quantity_gt {
        qb.push(" AND quantity > ").push_bind(quantity);
    }
    if let Some(price) = filter.price_lt {
        qb.push(" AND price < ").push_bind(price);
    }
    if let Some(price) = filter.price_gt {
        qb.push(" AND price > ").push_bind(price);
    }
}

#[async_trait]
impl CatalogRepo for PgStore {
    async fn create_category(&self, input: NewCategory) -> Result<Category> {
        sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(input.name)
        .fetch_one(&self.pool)
        .await
        .map(Into::into)
        .map_err(db_error)
    }

    async fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(Into::into))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Products, article links and subscriptions go with it via ON DELETE CASCADE.
    async fn delete_category(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_product(&self, input: ProductInput) -> Result<Product> {
        let query = format!(
            "INSERT INTO products (name, description, quantity, price, category_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PRODUCT_COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(input.name)
            .bind(input.description)
            .bind(input.quantity)
            .bind(input.price)
            .bind(input.category_id)
            .fetch_one(&self.pool)
            .await
            .map(Into::into)
            .map_err(db_error)
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(Into::into))
    }

    async fn update_product(&self, id: i64, input: ProductInput) -> Result<Option<Product>> {
        let query = format!(
            "UPDATE products
             SET name = $2, description = $3, quantity = $4, price = $5, category_id = $6
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .bind(input.name)
            .bind(input.description)
            .bind(input.quantity)
            .bind(input.price)
            .bind(input.category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete_product(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&self, filter: &ProductFilter, page: Page) -> Result<Paginated<Product>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_product_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        push_product_filter(&mut select, filter);
        select
            .push(" ORDER BY name ASC, id ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(Paginated {
            items: rows.into_iter().map(Into::into).collect(),
            page: page.number,
            per_page: page.per_page,
            total,
        })
    }
}
