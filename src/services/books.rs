//! Book catalog service: CRUD, search and checkout/checkin transitions

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CheckoutBook, CreateBook, LibraryStats, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.books.create(&book).await
    }

    pub async fn update(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &book).await
    }

    /// Delete a book; refused while it is checked out
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let book = self.repository.books.get_by_id(id).await?;

        if book.is_checked_out {
            return Err(AppError::BadRequest(
                "Cannot delete a book that is currently checked out".to_string(),
            ));
        }

        self.repository.books.delete(id).await
    }

    /// Check a book out to a borrower
    pub async fn checkout(&self, id: i32, request: CheckoutBook) -> AppResult<Book> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let book = self.repository.books.get_by_id(id).await?;

        if book.is_checked_out {
            return Err(AppError::BadRequest(
                "Book is already checked out".to_string(),
            ));
        }

        self.repository
            .books
            .set_checked_out(
                id,
                &request.borrower_name,
                &request.borrower_email,
                request.due_date(),
            )
            .await
    }

    /// Check a book back in
    pub async fn checkin(&self, id: i32) -> AppResult<Book> {
        let book = self.repository.books.get_by_id(id).await?;

        if !book.is_checked_out {
            return Err(AppError::BadRequest(
                "Book is not checked out".to_string(),
            ));
        }

        self.repository.books.clear_checked_out(id).await
    }

    pub async fn stats(&self) -> AppResult<LibraryStats> {
        self.repository.books.stats().await
    }
}
