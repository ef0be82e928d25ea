use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::access::{Role, effective_role};

/// Treats `""` (what HTML forms send for a blank optional input) as absent.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

const fn default_true() -> bool {
    true
}

// --- Identity ---

/// User
///
/// An account as stored in `users`, with every row it holds in `user_roles`.
/// The password hash never leaves the repository through this type.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub nome: String,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn effective_role(&self) -> Option<Role> {
        effective_role(&self.roles)
    }
}

/// A user together with the stored password hash, used only by login and
/// password changes.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Emails are unique case-insensitively; they are stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A new account ready to be persisted (password already hashed).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub nome: String,
    pub password_hash: String,
    pub role: Option<Role>,
}

/// Profile changes for an existing account. `password_hash` is only replaced
/// when present.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub email: String,
    pub nome: String,
    pub password_hash: Option<String>,
}

/// UserResponse
///
/// Public shape of an account: one effective role, `null` when none is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub nome: String,
    pub role: Option<Role>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            nome: user.nome.clone(),
            role: user.effective_role(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MeResponse {
    pub user: UserResponse,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Senha atual é obrigatória"))]
    pub current_password: String,
    #[validate(length(min = 6, message = "Nova senha deve ter pelo menos 6 caracteres"))]
    pub new_password: String,
}

/// CreateUserRequest
///
/// Admin-only provisioning payload. `role` may be omitted to create an account
/// with no access to protected resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct CreateUserRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "Senha deve ter pelo menos 6 caracteres"))]
    pub password: String,
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: String,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: String,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(length(min = 6, message = "Senha deve ter pelo menos 6 caracteres"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct UpdateRoleRequest {
    #[validate(required(message = "Papel é obrigatório"))]
    pub role: Option<Role>,
}

// --- Listing ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// ListFilter
///
/// Query parameters accepted by the public list endpoints. Resources without an
/// `ativo` column ignore that filter.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFilter {
    /// `asc` or `desc`; each resource has its own default.
    pub order: Option<SortOrder>,
    /// Only active (`true`) or inactive (`false`) records.
    pub ativo: Option<bool>,
}

// --- Sermons ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Sermon {
    pub id: Uuid,
    pub titulo: String,
    pub pregador: String,
    #[ts(type = "string")]
    pub data: NaiveDate,
    pub descricao: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    pub imagem_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct SermonInput {
    #[validate(length(min = 3, message = "Título deve ter pelo menos 3 caracteres"))]
    pub titulo: String,
    #[validate(length(min = 2, message = "Pregador deve ter pelo menos 2 caracteres"))]
    pub pregador: String,
    /// `YYYY-MM-DD`
    #[validate(custom(function = "crate::validation::validate_date"))]
    pub data: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub descricao: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "URL inválida"))]
    pub video_url: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "URL inválida"))]
    pub audio_url: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "URL inválida"))]
    pub imagem_url: Option<String>,
}

// --- Classes ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Aula {
    pub id: Uuid,
    pub titulo: String,
    pub professor: String,
    #[ts(type = "string")]
    pub data: NaiveDate,
    pub descricao: Option<String>,
    pub video_url: Option<String>,
    pub material_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct AulaInput {
    #[validate(length(min = 3, message = "Título deve ter pelo menos 3 caracteres"))]
    pub titulo: String,
    #[validate(length(min = 2, message = "Professor deve ter pelo menos 2 caracteres"))]
    pub professor: String,
    #[validate(custom(function = "crate::validation::validate_date"))]
    pub data: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub descricao: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "URL inválida"))]
    pub video_url: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "URL inválida"))]
    pub material_url: Option<String>,
}

// --- Events ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Evento {
    pub id: Uuid,
    pub titulo: String,
    pub descricao: Option<String>,
    #[ts(type = "string")]
    pub data: NaiveDate,
    pub horario: Option<String>,
    pub local: Option<String>,
    pub imagem_url: Option<String>,
    pub ativo: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct EventoInput {
    #[validate(length(min = 3, message = "Título deve ter pelo menos 3 caracteres"))]
    pub titulo: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub descricao: Option<String>,
    #[validate(custom(function = "crate::validation::validate_date"))]
    pub data: String,
    /// `HH:MM`
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(custom(function = "crate::validation::validate_time"))]
    pub horario: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub local: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "URL inválida"))]
    pub imagem_url: Option<String>,
    pub ativo: bool,
}

impl Default for EventoInput {
    fn default() -> Self {
        Self {
            titulo: String::new(),
            descricao: None,
            data: String::new(),
            horario: None,
            local: None,
            imagem_url: None,
            ativo: default_true(),
        }
    }
}

// --- Pastors ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Pastor {
    pub id: Uuid,
    pub nome: String,
    pub cargo: String,
    pub bio: Option<String>,
    pub foto_url: Option<String>,
    pub ordem: i32,
    pub ativo: bool,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct PastorInput {
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: String,
    #[validate(length(min = 2, message = "Cargo deve ter pelo menos 2 caracteres"))]
    pub cargo: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub bio: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "URL inválida"))]
    pub foto_url: Option<String>,
    #[validate(range(min = 0, message = "Ordem não pode ser negativa"))]
    pub ordem: i32,
    pub ativo: bool,
}

impl Default for PastorInput {
    fn default() -> Self {
        Self {
            nome: String::new(),
            cargo: String::new(),
            bio: None,
            foto_url: None,
            ordem: 0,
            ativo: default_true(),
        }
    }
}

// --- Ministries ---

/// Ministerio
///
/// Aggregate root: the leader list is owned by the ministry and is always
/// replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Ministerio {
    pub id: Uuid,
    pub nome: String,
    pub descricao: Option<String>,
    pub imagem_url: Option<String>,
    pub ativo: bool,
    // Loaded by a second query on `ministerio_lideres`.
    #[sqlx(skip)]
    pub lideres: Vec<Lider>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Lider {
    pub id: Uuid,
    pub nome: String,
    pub cargo: Option<String>,
    pub ordem: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct MinisterioInput {
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub descricao: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(url(message = "URL inválida"))]
    pub imagem_url: Option<String>,
    pub ativo: bool,
    /// Replaces the whole leader list, in this order.
    #[validate(nested)]
    pub lideres: Vec<LiderInput>,
}

impl Default for MinisterioInput {
    fn default() -> Self {
        Self {
            nome: String::new(),
            descricao: None,
            imagem_url: None,
            ativo: default_true(),
            lideres: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct LiderInput {
    #[validate(length(min = 2, message = "Nome do líder deve ter pelo menos 2 caracteres"))]
    pub nome: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub cargo: Option<String>,
}

// --- Page content ---

/// Conteudo
///
/// Editable copy of a static page section, addressed by its `chave` slug
/// (`sobre`, `historia`, `contato`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Conteudo {
    pub chave: String,
    pub titulo: String,
    pub conteudo: String,
    pub updated_by: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(default)]
#[ts(export)]
pub struct ConteudoInput {
    #[validate(length(min = 1, message = "Título é obrigatório"))]
    pub titulo: String,
    #[validate(length(min = 1, message = "Conteúdo é obrigatório"))]
    pub conteudo: String,
}

// --- Uploads ---

/// UploadResponse
///
/// Result of `POST /upload`. `filename` is the generated storage name,
/// `originalName` the name the client sent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub original_name: String,
    pub size: u64,
}
