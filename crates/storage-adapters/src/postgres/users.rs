use async_trait::async_trait;
use domains::{
    Author, NewUser, Permission, RatingTotals, Result, SubscriptionRepo, User,
    UserRepo,
};
use sqlx::FromRow;
use tracing::warn;

use super::{db_error, PgStore};

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    permissions: Vec<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let permissions = row
            .permissions
            .iter()
            .filter_map(|p| match p.parse::<Permission>() {
                Ok(permission) => Some(permission),
                Err(_) => {
                    warn!(user_id = row.id, permission = %p, "ignoring unknown stored permission");
                    None
                }
            })
            .collect();
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            permissions,
        }
    }
}

#[derive(FromRow)]
struct AuthorRow {
    id: i64,
    user_id: i64,
    rating: i32,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            rating: row.rating,
        }
    }
}

#[derive(FromRow)]
struct TotalsRow {
    posts: i64,
    own_comments: i64,
    comments_on_posts: i64,
}

const USER_COLUMNS: &str = "u.id, u.username, u.email, u.password_hash, u.permissions";

#[async_trait]
impl UserRepo for PgStore {
    async fn create_user(&self, input: NewUser) -> Result<User> {
        let permissions: Vec<String> = input
            .permissions
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, email, password_hash, permissions)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, email, password_hash, permissions",
        )
        .bind(input.username)
        .bind(input.email)
        .bind(input.password_hash)
        .bind(permissions)
        .fetch_one(&self.pool)
        .await
        .map(Into::into)
        .map_err(db_error)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = $1");
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(Into::into))
    }

    async fn create_author(&self, user_id: i64) -> Result<Author> {
        sqlx::query_as::<_, AuthorRow>(
            "INSERT INTO authors (user_id) VALUES ($1) RETURNING id, user_id, rating",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map(Into::into)
        .map_err(db_error)
    }

    async fn get_author(&self, id: i64) -> Result<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>("SELECT id, user_id, rating FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(Into::into))
    }

    async fn author_username(&self, author_id: i64) -> Result<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT u.username FROM authors a JOIN users u ON u.id = a.user_id WHERE a.id = $1",
        )
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn rating_totals(&self, author_id: i64) -> Result<RatingTotals> {
        let row = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT
                COALESCE((SELECT SUM(p.rating) FROM posts p WHERE p.author_id = $1), 0)::BIGINT
                    AS posts,
                COALESCE((SELECT SUM(c.rating)
                          FROM comments c
                          JOIN authors a ON a.user_id = c.user_id
                          WHERE a.id = $1), 0)::BIGINT
                    AS own_comments,
                COALESCE((SELECT SUM(c.rating)
                          FROM comments c
                          JOIN posts p ON p.id = c.post_id
                          WHERE p.author_id = $1), 0)::BIGINT
                    AS comments_on_posts
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(RatingTotals {
            posts: row.posts,
            own_comments: row.own_comments,
            comments_on_posts: row.comments_on_posts,
        })
    }

    async fn set_author_rating(&self, author_id: i64, rating: i32) -> Result<Option<Author>> {
        let row = sqlx::query_as::<_, AuthorRow>(
            "UPDATE authors SET rating = $2 WHERE id = $1 RETURNING id, user_id, rating",
        )
        .bind(author_id)
        .bind(rating)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl SubscriptionRepo for PgStore {
    /// Delete-or-insert inside one transaction.
    async fn toggle_subscription(&self, category_id: i64, user_id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let removed = sqlx::query(
            "DELETE FROM category_subscribers WHERE category_id = $1 AND user_id = $2",
        )
        .bind(category_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?
        .rows_affected();

        if removed == 0 {
            sqlx::query("INSERT INTO category_subscribers (category_id, user_id) VALUES ($1, $2)")
                .bind(category_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(removed == 0)
    }

    async fn category_subscribers(&self, category_id: i64) -> Result<Vec<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS}
             FROM users u
             JOIN category_subscribers s ON s.user_id = u.id
             WHERE s.category_id = $1
             ORDER BY u.id"
        );
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn all_subscribers(&self) -> Result<Vec<User>> {
        let query = format!(
            "SELECT {USER_COLUMNS}
             FROM users u
             WHERE EXISTS (SELECT 1 FROM category_subscribers s WHERE s.user_id = u.id)
             ORDER BY u.id"
        );
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
