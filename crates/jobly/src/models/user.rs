use crate::changeset::{ValidationCode, ValidationErrors};
use crate::client::GenericClient;
use crate::error::{StoreError, StoreResult};
use crate::password;
use crate::patch::{Patch, Patchable, decode_field, unknown_field};
use crate::qb::{self, FieldValues, SqlQb, sql_for_partial_update};
use crate::row::{FromRow, RowExt};
use crate::validate::{is_email, is_http_url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_postgres::Row;

const TABLE: &str = "users";

/// Every column except the password hash.
const COLUMNS: &str = "username, first_name, last_name, email, photo_url, is_admin";

/// Profile photo used when a new user does not supply one.
pub const DEFAULT_PHOTO: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/9/93/Default_profile_picture_%28male%29_on_Facebook.jpg/600px-Default_profile_picture_%28male%29_on_Facebook.jpg";

fn not_found(username: &str) -> StoreError {
    StoreError::not_found(format!("Cannot find user by username: {}", username))
}

/// A user account. The password hash never leaves the database layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
            photo_url: row.try_get_column("photo_url")?,
            is_admin: row.try_get_column("is_admin")?,
        })
    }
}

/// Row shape returned by [`User::list`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl FromRow for UserSummary {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
        })
    }
}

/// Input for [`User::create`].
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("email", &self.email)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_text("username", &self.username, 25);
        if self.password.chars().count() < 4 {
            errors.add(
                "password",
                ValidationCode::Len,
                "password must be at least 4 characters",
            );
        }
        errors.check_text("first_name", &self.first_name, 50);
        errors.check_text("last_name", &self.last_name, 50);
        if !is_email(&self.email) {
            errors.add("email", ValidationCode::Email, "email must be a valid email");
        }
        if let Some(url) = &self.photo_url {
            if !is_http_url(url) {
                errors.add("photo_url", ValidationCode::Url, "photo_url must be a URL");
            }
        }
        errors.into_result()
    }
}

/// Typed changes accepted by a user. `username` is not patchable; admin
/// status and password have no patch path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<Option<String>>,
}

impl Patch for UserPatch {
    fn from_fields(fields: &Map<String, Value>) -> StoreResult<Self> {
        let mut patch = UserPatch::default();
        for (name, value) in fields {
            match name.as_str() {
                "username" => return Err(StoreError::immutable("Can't change username!")),
                "first_name" => patch.first_name = Some(decode_field(name, value)?),
                "last_name" => patch.last_name = Some(decode_field(name, value)?),
                "email" => {
                    let email: String = decode_field(name, value)?;
                    if !is_email(&email) {
                        return Err(StoreError::validation("email must be a valid email"));
                    }
                    patch.email = Some(email);
                }
                "photo_url" => {
                    let url: Option<String> = decode_field(name, value)?;
                    if url.as_deref().is_some_and(|u| !is_http_url(u)) {
                        return Err(StoreError::validation("photo_url must be a URL"));
                    }
                    patch.photo_url = Some(url);
                }
                other => return Err(unknown_field(other)),
            }
        }
        Ok(patch)
    }

    fn field_values(&self) -> FieldValues {
        let mut fields = FieldValues::new();
        fields
            .set_opt("first_name", self.first_name.clone())
            .set_opt("last_name", self.last_name.clone())
            .set_opt("email", self.email.clone())
            .set_nullable("photo_url", self.photo_url.clone());
        fields
    }
}

impl Patchable for User {
    type Patch = UserPatch;

    fn apply(&mut self, patch: UserPatch) {
        if let Some(v) = patch.first_name {
            self.first_name = v;
        }
        if let Some(v) = patch.last_name {
            self.last_name = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.photo_url {
            self.photo_url = v;
        }
    }
}

impl User {
    pub fn username(&self) -> &str {
        &self.username
    }

    fn mutable_fields(&self) -> FieldValues {
        let mut fields = FieldValues::new();
        fields
            .set("first_name", self.first_name.clone())
            .set("last_name", self.last_name.clone())
            .set("email", self.email.clone())
            .set("photo_url", self.photo_url.clone());
        fields
    }

    /// All users, ordered by username.
    pub async fn list(conn: &impl GenericClient) -> StoreResult<Vec<UserSummary>> {
        qb::select(TABLE)
            .select("username, first_name, last_name, email")
            .order_by("username")
            .fetch_all(conn)
            .await
    }

    /// Insert a user with a hashed password.
    pub async fn create(conn: &impl GenericClient, input: &NewUser) -> StoreResult<Self> {
        input.validate()?;
        let hashed = password::hash(&input.password)?;
        let photo_url = input
            .photo_url
            .clone()
            .unwrap_or_else(|| DEFAULT_PHOTO.to_string());

        let user: User = qb::insert(TABLE)
            .set("username", input.username.clone())
            .set("password", hashed)
            .set("first_name", input.first_name.clone())
            .set("last_name", input.last_name.clone())
            .set("email", input.email.clone())
            .set("photo_url", photo_url)
            .set("is_admin", input.is_admin)
            .returning(COLUMNS)
            .fetch_one(conn)
            .await?;
        tracing::info!(username = %user.username, is_admin = user.is_admin, "user created");
        Ok(user)
    }

    /// Look a user up by credentials. Unknown users and wrong passwords
    /// fail the same way.
    pub async fn authenticate(
        conn: &impl GenericClient,
        username: &str,
        plain_password: &str,
    ) -> StoreResult<Self> {
        let row = qb::select(TABLE)
            .select(&format!("password, {}", COLUMNS))
            .eq("username", username.to_string())
            .query_opt(conn)
            .await?;

        let Some(row) = row else {
            tracing::debug!(username, "login for unknown user");
            return Err(StoreError::InvalidCredentials);
        };
        let stored: String = row.try_get_column("password")?;
        if !password::verify(plain_password, &stored)? {
            tracing::debug!(username, "login with wrong password");
            return Err(StoreError::InvalidCredentials);
        }
        Self::from_row(&row)
    }

    pub async fn get(conn: &impl GenericClient, username: &str) -> StoreResult<Self> {
        qb::select(TABLE)
            .select(COLUMNS)
            .eq("username", username.to_string())
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| not_found(username))
    }

    /// Write every mutable field and reload from the returned row.
    pub async fn save(&mut self, conn: &impl GenericClient) -> StoreResult<()> {
        let q = sql_for_partial_update(
            TABLE,
            &self.mutable_fields(),
            "username",
            self.username.clone(),
        );
        let row = conn
            .query_opt(&q.sql, &q.params_ref())
            .await?
            .ok_or_else(|| not_found(&self.username))?;
        *self = Self::from_row(&row)?;
        Ok(())
    }

    /// Apply `patch` directly in the database without loading first.
    pub async fn update(
        conn: &impl GenericClient,
        username: &str,
        patch: &UserPatch,
    ) -> StoreResult<Self> {
        qb::update(TABLE)
            .set_fields(&patch.field_values())
            .eq("username", username.to_string())
            .returning(COLUMNS)
            .fetch_opt(conn)
            .await?
            .ok_or_else(|| not_found(username))
    }

    pub async fn delete(self, conn: &impl GenericClient) -> StoreResult<&'static str> {
        Self::remove(conn, &self.username).await
    }

    pub async fn remove(conn: &impl GenericClient, username: &str) -> StoreResult<&'static str> {
        qb::delete(TABLE)
            .eq("username", username.to_string())
            .returning("username")
            .query_opt(conn)
            .await?
            .ok_or_else(|| not_found(username))?;
        Ok("User Deleted")
    }
}
