//! User model, roles and the role/permission matrix

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;

/// User roles, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Librarian,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Member, Role::Librarian, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        }
    }

    /// Permissions granted to this role
    pub fn permissions(&self) -> &'static HashSet<Permission> {
        &ROLE_PERMISSIONS[self]
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(Role::Member),
            "librarian" => Ok(Role::Librarian),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// SQLx conversion for Role (stored as text)
impl sqlx::Type<Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for Role {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Role {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Fine-grained capabilities checked per endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Book permissions
    CreateBook,
    UpdateBook,
    DeleteBook,
    ViewBook,
    // User management permissions
    ManageUsers,
    ViewUsers,
    // Library operations
    CheckoutBook,
    CheckinBook,
    ViewLibraryStats,
}

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::CreateBook,
        Permission::UpdateBook,
        Permission::DeleteBook,
        Permission::ViewBook,
        Permission::ManageUsers,
        Permission::ViewUsers,
        Permission::CheckoutBook,
        Permission::CheckinBook,
        Permission::ViewLibraryStats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateBook => "create_book",
            Permission::UpdateBook => "update_book",
            Permission::DeleteBook => "delete_book",
            Permission::ViewBook => "view_book",
            Permission::ManageUsers => "manage_users",
            Permission::ViewUsers => "view_users",
            Permission::CheckoutBook => "checkout_book",
            Permission::CheckinBook => "checkin_book",
            Permission::ViewLibraryStats => "view_library_stats",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role/permission matrix, built once. Each tier is the union of the tier
/// below plus its own additions, so member ⊆ librarian ⊆ admin holds by
/// construction.
static ROLE_PERMISSIONS: Lazy<HashMap<Role, HashSet<Permission>>> = Lazy::new(|| {
    let member: HashSet<Permission> = [
        Permission::ViewBook,
        Permission::CheckoutBook,
        Permission::CheckinBook,
    ]
    .into();

    let mut librarian = member.clone();
    librarian.extend([
        Permission::CreateBook,
        Permission::UpdateBook,
        Permission::ViewUsers,
        Permission::ViewLibraryStats,
    ]);

    let mut admin = librarian.clone();
    admin.extend([Permission::DeleteBook, Permission::ManageUsers]);

    HashMap::from([
        (Role::Member, member),
        (Role::Librarian, librarian),
        (Role::Admin, admin),
    ])
});

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub google_id: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    /// Permissions derived from the user's role, in declaration order
    pub fn permissions(&self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.has_permission(*p))
            .collect()
    }

    // Authorization checks
    pub fn require_permission(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing required permission: {}",
                permission
            )))
        }
    }

    pub fn require_role(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            let required: Vec<&str> = roles.iter().map(Role::as_str).collect();
            Err(AppError::Authorization(format!(
                "Requires role {}, current role is {}",
                required.join(" or "),
                self.role
            )))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }
}

/// JWT claims embedded in access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    /// Discriminates access tokens from any other token kind
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

impl AccessClaims {
    /// Sign the claims into a JWT (HS256)
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT, including signature and expiry
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

/// User listing query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Update user role request (requires MANAGE_USERS). The role arrives as a
/// raw string so an unknown value answers 400, not a deserialization
/// rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRole {
    pub role: Option<String>,
}

/// Activate/deactivate user request (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatus {
    pub is_active: Option<bool>,
}
