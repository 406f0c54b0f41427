//! Books repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, LibraryStats, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books with pagination
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let (page, per_page) = query.pagination();
        let offset = (page - 1) * per_page;

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref search) = query.search {
            params.push(format!("%{}%", search.to_lowercase()));
            let p = params.len();
            conditions.push(format!(
                "(LOWER(title) LIKE ${p} OR LOWER(author) LIKE ${p} OR LOWER(genre) LIKE ${p} \
                 OR LOWER(description) LIKE ${p} OR LOWER(isbn) LIKE ${p})"
            ));
        }

        if query.available_only.unwrap_or(false) {
            conditions.push("NOT is_checked_out".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM books {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_builder = count_builder.bind(param);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM books {} ORDER BY title, author LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut select_builder = sqlx::query_as::<_, Book>(&select_query);
        for param in &params {
            select_builder = select_builder.bind(param);
        }
        let books = select_builder.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();

        // Empty ISBN strings become NULL to keep the unique index useful
        let isbn = book
            .isbn
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, isbn, genre, publication_year, description,
                is_checked_out, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $7)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(isbn)
        .bind(&book.genre)
        .bind(book.publication_year)
        .bind(&book.description)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update an existing book; absent fields keep their current value
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                genre = COALESCE($5, genre),
                publication_year = COALESCE($6, publication_year),
                description = COALESCE($7, description),
                updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.genre)
        .bind(book.publication_year)
        .bind(&book.description)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Mark a book as checked out to a borrower
    pub async fn set_checked_out(
        &self,
        id: i32,
        borrower_name: &str,
        borrower_email: &str,
        due_date: DateTime<Utc>,
    ) -> AppResult<Book> {
        let now = Utc::now();

        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET is_checked_out = TRUE, borrower_name = $2, borrower_email = $3,
                checkout_date = $4, due_date = $5, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(borrower_name)
        .bind(borrower_email)
        .bind(now)
        .bind(due_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Clear a book's checkout state
    pub async fn clear_checked_out(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET is_checked_out = FALSE, borrower_name = NULL, borrower_email = NULL,
                checkout_date = NULL, due_date = NULL, updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Library-wide counts
    pub async fn stats(&self) -> AppResult<LibraryStats> {
        let total_books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let checked_out_books: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE is_checked_out")
                .fetch_one(&self.pool)
                .await?;

        let overdue_books: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE is_checked_out AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(LibraryStats {
            total_books,
            available_books: total_books - checked_out_books,
            checked_out_books,
            overdue_books,
        })
    }
}
