use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    ArticleRepo, Comment, NewComment, Page, Paginated, Post, PostInput, PostType, Result,
};
use sqlx::{FromRow, PgConnection};

use super::{db_error, PgStore};

#[derive(FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    post_type: String,
    created: DateTime<Utc>,
    title: String,
    text: String,
    rating: i32,
    category_ids: Vec<i64>,
}

impl TryFrom<PostRow> for Post {
    type Error = domains::DomainError;

    fn try_from(row: PostRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            author_id: row.author_id,
            post_type: row.post_type.parse()?,
            created: row.created,
            title: row.title,
            text: row.text,
            rating: row.rating,
            category_ids: row.category_ids,
        })
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    user_id: i64,
    text: String,
    rating: i32,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            post_id: row.post_id,
            user_id: row.user_id,
            text: row.text,
            rating: row.rating,
        }
    }
}

/// Posts with their category ids folded into an array.
const POST_SELECT: &str = "SELECT p.id, p.author_id, p.post_type, p.created, p.title, p.text, p.rating,
        COALESCE(
            array_agg(pc.category_id ORDER BY pc.category_id) FILTER (WHERE pc.category_id IS NOT NULL),
            '{}'
        ) AS category_ids
    FROM posts p
    LEFT JOIN post_categories pc ON pc.post_id = p.id";

async fn link_categories(conn: &mut PgConnection, post_id: i64, category_ids: &[i64]) -> Result<()> {
    sqlx::query("DELETE FROM post_categories WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    if !category_ids.is_empty() {
        sqlx::query(
            "INSERT INTO post_categories (post_id, category_id)
             SELECT $1, UNNEST($2::BIGINT[])",
        )
        .bind(post_id)
        .bind(category_ids)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    }
    Ok(())
}

impl PgStore {
    async fn fetch_post(&self, id: i64) -> Result<Option<Post>> {
        let query = format!("{POST_SELECT} WHERE p.id = $1 GROUP BY p.id");
        let row = sqlx::query_as::<_, PostRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Post::try_from).transpose()
    }
}

#[async_trait]
impl ArticleRepo for PgStore {
    async fn create_post(&self, input: PostInput) -> Result<Post> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO posts (author_id, post_type, title, text)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(input.author_id)
        .bind(input.post_type.as_str())
        .bind(&input.title)
        .bind(&input.text)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error)?;
        link_categories(&mut tx, id, &input.category_ids).await?;

        tx.commit().await.map_err(db_error)?;
        self.fetch_post(id)
            .await?
            .ok_or_else(|| domains::DomainError::Internal(format!("post {id} vanished after insert")))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>> {
        self.fetch_post(id).await
    }

    async fn update_post(&self, id: i64, input: PostInput) -> Result<Option<Post>> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let updated = sqlx::query(
            "UPDATE posts SET author_id = $2, post_type = $3, title = $4, text = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(input.author_id)
        .bind(input.post_type.as_str())
        .bind(&input.title)
        .bind(&input.text)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?
        .rows_affected();
        if updated == 0 {
            return Ok(None);
        }
        link_categories(&mut tx, id, &input.category_ids).await?;

        tx.commit().await.map_err(db_error)?;
        self.fetch_post(id).await
    }

    /// Comments and category links go with it via ON DELETE CASCADE.
    async fn delete_post(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(&self, post_type: Option<PostType>, page: Page) -> Result<Paginated<Post>> {
        let kind = post_type.map(|t| t.as_str());
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE ($1::TEXT IS NULL OR post_type = $1)",
        )
        .bind(kind)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        let query = format!(
            "{POST_SELECT}
             WHERE ($1::TEXT IS NULL OR p.post_type = $1)
             GROUP BY p.id
             ORDER BY p.created DESC, p.id DESC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, PostRow>(&query)
            .bind(kind)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(Paginated {
            items: rows
                .into_iter()
                .map(Post::try_from)
                .collect::<Result<Vec<_>>>()?,
            page: page.number,
            per_page: page.per_page,
            total,
        })
    }

    async fn adjust_post_rating(&self, id: i64, delta: i32) -> Result<Option<i32>> {
        sqlx::query_scalar::<_, i32>("UPDATE posts SET rating = rating + $2 WHERE id = $1 RETURNING rating")
            .bind(id)
            .bind(delta)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn create_comment(&self, input: NewComment) -> Result<Comment> {
        sqlx::query_as::<_, CommentRow>(
            "INSERT INTO comments (post_id, user_id, text)
             VALUES ($1, $2, $3)
             RETURNING id, post_id, user_id, text, rating",
        )
        .bind(input.post_id)
        .bind(input.user_id)
        .bind(input.text)
        .fetch_one(&self.pool)
        .await
        .map(Into::into)
        .map_err(db_error)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            "SELECT id, post_id, user_id, text, rating FROM comments WHERE post_id = $1 ORDER BY id",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn adjust_comment_rating(&self, id: i64, delta: i32) -> Result<Option<i32>> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE comments SET rating = rating + $2 WHERE id = $1 RETURNING rating",
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)
    }
}
