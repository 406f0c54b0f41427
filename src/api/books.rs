//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, CheckoutBook, CreateBook, LibraryStats, UpdateBook},
    models::user::Permission,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List books with search and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<Book>),
        (status = 403, description = "Missing VIEW_BOOK permission")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<Book>>> {
    user.require_permission(Permission::ViewBook)?;

    let (books, total) = state.services.books.search(&query).await?;
    let (page, per_page) = query.pagination();

    Ok(Json(PaginatedResponse {
        items: books,
        total,
        page,
        per_page,
    }))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    user.require_permission(Permission::ViewBook)?;

    let book = state.services.books.get_by_id(id).await?;
    Ok(Json(book))
}

/// Add a new book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing CREATE_BOOK permission")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    user.require_permission(Permission::CreateBook)?;

    let created = state.services.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 403, description = "Missing UPDATE_BOOK permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(book): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    user.require_permission(Permission::UpdateBook)?;

    let updated = state.services.books.update(id, book).await?;
    Ok(Json(updated))
}

/// Delete a book (refused while checked out)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 400, description = "Book is checked out"),
        (status = 403, description = "Missing DELETE_BOOK permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    user.require_permission(Permission::DeleteBook)?;

    state.services.books.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check a book out to a borrower
#[utoipa::path(
    post,
    path = "/books/{id}/checkout",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    request_body = CheckoutBook,
    responses(
        (status = 200, description = "Book checked out", body = Book),
        (status = 400, description = "Book already checked out or invalid borrower"),
        (status = 403, description = "Missing CHECKOUT_BOOK permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn checkout_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<CheckoutBook>,
) -> AppResult<Json<Book>> {
    user.require_permission(Permission::CheckoutBook)?;

    let book = state.services.books.checkout(id, request).await?;
    Ok(Json(book))
}

/// Check a book back in
#[utoipa::path(
    post,
    path = "/books/{id}/checkin",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book checked in", body = Book),
        (status = 400, description = "Book is not checked out"),
        (status = 403, description = "Missing CHECKIN_BOOK permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn checkin_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    user.require_permission(Permission::CheckinBook)?;

    let book = state.services.books.checkin(id).await?;
    Ok(Json(book))
}

/// Library-wide statistics
#[utoipa::path(
    get,
    path = "/books/stats",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Library statistics", body = LibraryStats),
        (status = 403, description = "Missing VIEW_LIBRARY_STATS permission")
    )
)]
pub async fn library_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<LibraryStats>> {
    user.require_permission(Permission::ViewLibraryStats)?;

    let stats = state.services.books.stats().await?;
    Ok(Json(stats))
}
