//! Book model and related request types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record with embedded checkout state
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
    pub is_checked_out: bool,
    pub borrower_name: Option<String>,
    pub borrower_email: Option<String>,
    pub checkout_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn is_overdue(&self) -> bool {
        match self.due_date {
            Some(due) if self.is_checked_out => Utc::now() > due,
            _ => false,
        }
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
}

/// Update book request; absent fields keep their current value
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<String>,
}

/// Checkout request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutBook {
    #[validate(length(min = 1, message = "Borrower name is required"))]
    pub borrower_name: String,
    #[validate(email(message = "Invalid borrower email"))]
    pub borrower_email: String,
    /// Loan length in days (default 14)
    pub days: Option<i64>,
}

impl CheckoutBook {
    pub fn due_date(&self) -> DateTime<Utc> {
        Utc::now() + Duration::days(self.days.unwrap_or(14))
    }
}

/// Book search and pagination parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Matches title, author, genre, description or ISBN
    pub search: Option<String>,
    pub available_only: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl BookQuery {
    /// Effective (page, per_page), bounded so arbitrary query strings can
    /// never produce a negative LIMIT/OFFSET
    pub fn pagination(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        (page, per_page)
    }
}

/// Library statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct LibraryStats {
    pub total_books: i64,
    pub available_books: i64,
    pub checked_out_books: i64,
    pub overdue_books: i64,
}
