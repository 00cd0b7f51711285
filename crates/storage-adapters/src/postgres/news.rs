use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::filters::NewsFilter;
use domains::{News, NewsInput, NewsRepo, Page, Paginated, Result};
use sqlx::{FromRow, Postgres, QueryBuilder};

use super::{db_error, like_pattern, PgStore};

#[derive(FromRow)]
struct NewsRow {
    id: i64,
    name: String,
    text: String,
    date_published: DateTime<Utc>,
    author_id: i64,
}

impl From<NewsRow> for News {
    fn from(row: NewsRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            text: row.text,
            date_published: row.date_published,
            author_id: row.author_id,
        }
    }
}

const NEWS_COLUMNS: &str = "n.id, n.name, n.text, n.date_published, n.author_id";
const NEWS_FROM: &str = " FROM news n
    JOIN authors a ON a.id = n.author_id
    JOIN users u ON u.id = a.user_id";

fn push_news_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &NewsFilter) {
    qb.push(" WHERE TRUE");
    if let Some(name) = &filter.name_icontains {
        qb.push(" AND n.name ILIKE ").push_bind(like_pattern(name));
    }
    if let Some(author) = &filter.author_icontains {
        qb.push(" AND u.username ILIKE ").push_bind(like_pattern(author));
    }
    if let Some(after) = filter.date_published_gt {
        qb.push(" AND n.date_published > ").push_bind(after);
    }
}

#[async_trait]
impl NewsRepo for PgStore {
    async fn create_news(&self, input: NewsInput) -> Result<News> {
        sqlx::query_as::<_, NewsRow>(
            "INSERT INTO news (name, text, date_published, author_id)
             VALUES ($1, $2, $3, $4)
             RETURNING id, name, text, date_published, author_id",
        )
        .bind(input.name)
        .bind(input.text)
        .bind(input.date_published)
        .bind(input.author_id)
        .fetch_one(&self.pool)
        .await
        .map(Into::into)
        .map_err(db_error)
    }

    async fn get_news(&self, id: i64) -> Result<Option<News>> {
        let row = sqlx::query_as::<_, NewsRow>(
            "SELECT id, name, text, date_published, author_id FROM news WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(Into::into))
    }

    async fn update_news(&self, id: i64, input: NewsInput) -> Result<Option<News>> {
        let row = sqlx::query_as::<_, NewsRow>(
            "UPDATE news
             SET name = $2, text = $3, date_published = $4, author_id = $5
             WHERE id = $1
             RETURNING id, name, text, date_published, author_id",
        )
        .bind(id)
        .bind(input.name)
        .bind(input.text)
        .bind(input.date_published)
        .bind(input.author_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete_news(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_news(&self, page: Page) -> Result<Paginated<News>> {
        self.search_news(&NewsFilter::default(), page).await
    }

    async fn search_news(&self, filter: &NewsFilter, page: Page) -> Result<Paginated<News>> {
        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*){NEWS_FROM}"));
        push_news_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {NEWS_COLUMNS}{NEWS_FROM}"));
        push_news_filter(&mut select, filter);
        select
            .push(" ORDER BY n.date_published DESC, n.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let rows = select
            .build_query_as::<NewsRow>()
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

    async fn published_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<News>> {
        let rows = sqlx::query_as::<_, NewsRow>(
            "SELECT id, name, text, date_published, author_id
             FROM news
             WHERE date_published >= $1 AND date_published < $2
             ORDER BY date_published ASC, id ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_by_author_between(
        &self,
        author_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM news
             WHERE author_id = $1 AND date_published >= $2 AND date_published < $3",
        )
        .bind(author_id)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }
}
