use crate::{
    access::Role,
    error::ApiError,
    models::{
        Aula, AulaInput, Conteudo, ConteudoInput, Evento, EventoInput, Lider, LiderInput,
        ListFilter, Ministerio, MinisterioInput, NewUser, Pastor, PastorInput, Sermon,
        SermonInput, SortOrder, User, UserChanges, UserCredentials,
    },
    validation::DATE_FORMAT,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction, query_builder::QueryBuilder};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// RepositoryError
///
/// Failures the persistence layer reports to handlers.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Unique constraint on `users.email`.
    #[error("email already registered")]
    DuplicateEmail,

    #[error("invalid date in field {field}: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateEmail => {
                ApiError::PreconditionFailed("Email já cadastrado".to_string())
            }
            RepositoryError::InvalidDate { field, .. } => {
                ApiError::field(field, "Data inválida (use AAAA-MM-DD)")
            }
            RepositoryError::Database(e) => ApiError::internal(format!("database error: {e}")),
        }
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// The contract for every persistence operation. Handlers only see this trait
/// (`Arc<dyn Repository>`), so tests swap in an in-memory implementation.
///
/// Writes take the acting user's id (`actor`) for the `created_by`/`updated_by`
/// audit columns. `update_*` returns `None` and `delete_*` returns `false` when
/// the record does not exist.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users & roles ---
    /// The user and all their role rows in a single lookup.
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn find_credentials_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>>;
    async fn get_credentials(&self, id: Uuid) -> RepoResult<Option<UserCredentials>>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<User>>;
    /// Replaces every role row of the user with exactly `role`.
    async fn set_user_role(&self, id: Uuid, role: Role) -> RepoResult<Option<User>>;
    async fn update_password(&self, id: Uuid, password_hash: String) -> RepoResult<bool>;
    async fn delete_user(&self, id: Uuid) -> RepoResult<bool>;

    // --- Sermons ---
    async fn list_sermons(&self, filter: ListFilter) -> RepoResult<Vec<Sermon>>;
    async fn get_sermon(&self, id: Uuid) -> RepoResult<Option<Sermon>>;
    async fn create_sermon(&self, input: &SermonInput, actor: Uuid) -> RepoResult<Sermon>;
    async fn update_sermon(&self, id: Uuid, input: &SermonInput, actor: Uuid)
    -> RepoResult<Option<Sermon>>;
    async fn delete_sermon(&self, id: Uuid) -> RepoResult<bool>;

    // --- Classes ---
    async fn list_aulas(&self, filter: ListFilter) -> RepoResult<Vec<Aula>>;
    async fn get_aula(&self, id: Uuid) -> RepoResult<Option<Aula>>;
    async fn create_aula(&self, input: &AulaInput, actor: Uuid) -> RepoResult<Aula>;
    async fn update_aula(&self, id: Uuid, input: &AulaInput, actor: Uuid)
    -> RepoResult<Option<Aula>>;
    async fn delete_aula(&self, id: Uuid) -> RepoResult<bool>;

    // --- Events ---
    async fn list_eventos(&self, filter: ListFilter) -> RepoResult<Vec<Evento>>;
    async fn get_evento(&self, id: Uuid) -> RepoResult<Option<Evento>>;
    async fn create_evento(&self, input: &EventoInput, actor: Uuid) -> RepoResult<Evento>;
    async fn update_evento(&self, id: Uuid, input: &EventoInput, actor: Uuid)
    -> RepoResult<Option<Evento>>;
    async fn delete_evento(&self, id: Uuid) -> RepoResult<bool>;

    // --- Pastors ---
    async fn list_pastores(&self, filter: ListFilter) -> RepoResult<Vec<Pastor>>;
    async fn get_pastor(&self, id: Uuid) -> RepoResult<Option<Pastor>>;
    async fn create_pastor(&self, input: &PastorInput, actor: Uuid) -> RepoResult<Pastor>;
    async fn update_pastor(&self, id: Uuid, input: &PastorInput, actor: Uuid)
    -> RepoResult<Option<Pastor>>;
    async fn delete_pastor(&self, id: Uuid) -> RepoResult<bool>;

    // --- Ministries (aggregate with leaders) ---
    async fn list_ministerios(&self, filter: ListFilter) -> RepoResult<Vec<Ministerio>>;
    async fn get_ministerio(&self, id: Uuid) -> RepoResult<Option<Ministerio>>;
    async fn create_ministerio(&self, input: &MinisterioInput, actor: Uuid)
    -> RepoResult<Ministerio>;
    /// All-or-nothing: the previous leader list is deleted and the new one
    /// inserted in order within one transaction.
    async fn update_ministerio(
        &self,
        id: Uuid,
        input: &MinisterioInput,
        actor: Uuid,
    ) -> RepoResult<Option<Ministerio>>;
    async fn delete_ministerio(&self, id: Uuid) -> RepoResult<bool>;

    // --- Page content ---
    async fn list_conteudos(&self) -> RepoResult<Vec<Conteudo>>;
    async fn get_conteudo(&self, chave: &str) -> RepoResult<Option<Conteudo>>;
    async fn upsert_conteudo(
        &self,
        chave: &str,
        input: &ConteudoInput,
        actor: Uuid,
    ) -> RepoResult<Conteudo>;
    async fn delete_conteudo(&self, chave: &str) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Parses a `YYYY-MM-DD` payload field. Payloads are validated before they get
/// here, so a failure means a caller skipped validation.
pub fn parse_date(field: &'static str, value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| RepositoryError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    let is_unique = matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation());
    if is_unique {
        RepositoryError::DuplicateEmail
    } else {
        RepositoryError::Database(e)
    }
}

// --- Row mappings ---

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    nome: String,
    password_hash: String,
    roles: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_credentials(self) -> UserCredentials {
        let roles = self
            .roles
            .iter()
            .filter_map(|raw| match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(user_id = %self.id, "Ignoring role row: {}", e);
                    None
                }
            })
            .collect();

        UserCredentials {
            user: User {
                id: self.id,
                email: self.email,
                nome: self.nome,
                roles,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct LiderRow {
    id: Uuid,
    ministerio_id: Uuid,
    nome: String,
    cargo: Option<String>,
    ordem: i32,
}

const USER_SELECT: &str = r#"
    SELECT u.id, u.email, u.nome, u.password_hash, u.created_at, u.updated_at,
           COALESCE(array_agg(r.role ORDER BY r.role) FILTER (WHERE r.role IS NOT NULL), '{}') AS roles
    FROM users u
    LEFT JOIN user_roles r ON r.user_id = u.id
"#;

const SERMON_COLUMNS: &str = "id, titulo, pregador, data, descricao, video_url, audio_url, imagem_url, created_by, updated_by, created_at, updated_at";
const AULA_COLUMNS: &str = "id, titulo, professor, data, descricao, video_url, material_url, created_by, updated_by, created_at, updated_at";
const EVENTO_COLUMNS: &str = "id, titulo, descricao, data, horario, local, imagem_url, ativo, created_by, updated_by, created_at, updated_at";
const PASTOR_COLUMNS: &str = "id, nome, cargo, bio, foto_url, ordem, ativo, created_by, updated_by, created_at, updated_at";
const MINISTERIO_COLUMNS: &str = "id, nome, descricao, imagem_url, ativo, created_by, updated_by, created_at, updated_at";
const CONTEUDO_COLUMNS: &str = "chave, titulo, conteudo, updated_by, created_at, updated_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// All queries are bound at runtime, so the crate builds without a database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user_row(&self, clause: &str, bind: UserKey<'_>) -> RepoResult<Option<UserRow>> {
        let sql = format!("{USER_SELECT} WHERE {clause} GROUP BY u.id");
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match bind {
            UserKey::Id(id) => query.bind(id),
            UserKey::Email(email) => query.bind(email),
        };
        Ok(query.fetch_optional(&self.pool).await?)
    }

    /// Loads the leader lists of the given ministries, ordered by position.
    async fn load_lideres(&self, ids: &[Uuid]) -> RepoResult<HashMap<Uuid, Vec<Lider>>> {
        let rows = sqlx::query_as::<_, LiderRow>(
            "SELECT id, ministerio_id, nome, cargo, ordem FROM ministerio_lideres WHERE ministerio_id = ANY($1) ORDER BY ministerio_id, ordem",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Lider>> = HashMap::new();
        for row in rows {
            grouped.entry(row.ministerio_id).or_default().push(Lider {
                id: row.id,
                nome: row.nome,
                cargo: row.cargo,
                ordem: row.ordem,
            });
        }
        Ok(grouped)
    }

    async fn insert_lideres(
        tx: &mut Transaction<'_, Postgres>,
        ministerio_id: Uuid,
        lideres: &[LiderInput],
    ) -> RepoResult<Vec<Lider>> {
        let mut inserted = Vec::with_capacity(lideres.len());
        for (position, lider) in lideres.iter().enumerate() {
            let row = sqlx::query_as::<_, Lider>(
                "INSERT INTO ministerio_lideres (id, ministerio_id, nome, cargo, ordem) VALUES ($1, $2, $3, $4, $5) RETURNING id, nome, cargo, ordem",
            )
            .bind(Uuid::new_v4())
            .bind(ministerio_id)
            .bind(&lider.nome)
            .bind(&lider.cargo)
            .bind(position as i32)
            .fetch_one(&mut **tx)
            .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn delete_by_id(&self, table: &str, id: Uuid) -> RepoResult<bool> {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

enum UserKey<'a> {
    Id(Uuid),
    Email(&'a str),
}

/// Appends the optional `ativo` filter and the ORDER BY clause shared by list queries.
fn push_list_tail(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &ListFilter,
    has_ativo: bool,
    sort_column: &str,
    default_order: SortOrder,
) {
    if has_ativo {
        if let Some(ativo) = filter.ativo {
            builder.push(" WHERE ativo = ");
            builder.push_bind(ativo);
        }
    }
    let order = filter.order.unwrap_or(default_order).as_sql();
    builder.push(format!(" ORDER BY {sort_column} {order}, created_at {order}"));
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self
            .fetch_user_row("u.id = $1", UserKey::Id(id))
            .await?
            .map(|row| row.into_credentials().user))
    }

    async fn find_credentials_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        Ok(self
            .fetch_user_row("u.email = $1", UserKey::Email(email))
            .await?
            .map(UserRow::into_credentials))
    }

    async fn get_credentials(&self, id: Uuid) -> RepoResult<Option<UserCredentials>> {
        Ok(self
            .fetch_user_row("u.id = $1", UserKey::Id(id))
            .await?
            .map(UserRow::into_credentials))
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let sql = format!("{USER_SELECT} GROUP BY u.id ORDER BY u.nome ASC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_credentials().user)
            .collect())
    }

    /// create_user
    ///
    /// Inserts the account and its optional role row in one transaction.
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (id, email, nome, password_hash) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(&user.email)
            .bind(&user.nome)
            .bind(&user.password_hash)
            .execute(&mut *tx)
            .await
            .map_err(map_unique_violation)?;

        if let Some(role) = user.role {
            sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                .bind(id)
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_user(id)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<User>> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2,
                nome = $3,
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.nome)
        .bind(&changes.password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user(id).await
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> RepoResult<Option<User>> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, i32>("SELECT 1 FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !exists {
            return Ok(None);
        }

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(id)
            .bind(role.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE users SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        self.get_user(id).await
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> RepoResult<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// delete_user
    ///
    /// Role rows go with the user (ON DELETE CASCADE); content audit columns
    /// pointing at the user are set to NULL.
    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        self.delete_by_id("users", id).await
    }

    // --- SERMONS ---

    async fn list_sermons(&self, filter: ListFilter) -> RepoResult<Vec<Sermon>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {SERMON_COLUMNS} FROM sermoes"));
        push_list_tail(&mut builder, &filter, false, "data", SortOrder::Desc);
        Ok(builder.build_query_as::<Sermon>().fetch_all(&self.pool).await?)
    }

    async fn get_sermon(&self, id: Uuid) -> RepoResult<Option<Sermon>> {
        let sql = format!("SELECT {SERMON_COLUMNS} FROM sermoes WHERE id = $1");
        Ok(sqlx::query_as::<_, Sermon>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_sermon(&self, input: &SermonInput, actor: Uuid) -> RepoResult<Sermon> {
        let data = parse_date("data", &input.data)?;
        let sql = format!(
            "INSERT INTO sermoes (id, titulo, pregador, data, descricao, video_url, audio_url, imagem_url, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) RETURNING {SERMON_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Sermon>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.titulo)
            .bind(&input.pregador)
            .bind(data)
            .bind(&input.descricao)
            .bind(&input.video_url)
            .bind(&input.audio_url)
            .bind(&input.imagem_url)
            .bind(actor)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_sermon(
        &self,
        id: Uuid,
        input: &SermonInput,
        actor: Uuid,
    ) -> RepoResult<Option<Sermon>> {
        let data = parse_date("data", &input.data)?;
        let sql = format!(
            "UPDATE sermoes SET titulo = $2, pregador = $3, data = $4, descricao = $5, video_url = $6, \
             audio_url = $7, imagem_url = $8, updated_by = $9, updated_at = NOW() \
             WHERE id = $1 RETURNING {SERMON_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Sermon>(&sql)
            .bind(id)
            .bind(&input.titulo)
            .bind(&input.pregador)
            .bind(data)
            .bind(&input.descricao)
            .bind(&input.video_url)
            .bind(&input.audio_url)
            .bind(&input.imagem_url)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_sermon(&self, id: Uuid) -> RepoResult<bool> {
        self.delete_by_id("sermoes", id).await
    }

    // --- CLASSES ---

    async fn list_aulas(&self, filter: ListFilter) -> RepoResult<Vec<Aula>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {AULA_COLUMNS} FROM aulas"));
        push_list_tail(&mut builder, &filter, false, "data", SortOrder::Desc);
        Ok(builder.build_query_as::<Aula>().fetch_all(&self.pool).await?)
    }

    async fn get_aula(&self, id: Uuid) -> RepoResult<Option<Aula>> {
        let sql = format!("SELECT {AULA_COLUMNS} FROM aulas WHERE id = $1");
        Ok(sqlx::query_as::<_, Aula>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_aula(&self, input: &AulaInput, actor: Uuid) -> RepoResult<Aula> {
        let data = parse_date("data", &input.data)?;
        let sql = format!(
            "INSERT INTO aulas (id, titulo, professor, data, descricao, video_url, material_url, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {AULA_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Aula>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.titulo)
            .bind(&input.professor)
            .bind(data)
            .bind(&input.descricao)
            .bind(&input.video_url)
            .bind(&input.material_url)
            .bind(actor)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_aula(&self, id: Uuid, input: &AulaInput, actor: Uuid) -> RepoResult<Option<Aula>> {
        let data = parse_date("data", &input.data)?;
        let sql = format!(
            "UPDATE aulas SET titulo = $2, professor = $3, data = $4, descricao = $5, video_url = $6, \
             material_url = $7, updated_by = $8, updated_at = NOW() \
             WHERE id = $1 RETURNING {AULA_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Aula>(&sql)
            .bind(id)
            .bind(&input.titulo)
            .bind(&input.professor)
            .bind(data)
            .bind(&input.descricao)
            .bind(&input.video_url)
            .bind(&input.material_url)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_aula(&self, id: Uuid) -> RepoResult<bool> {
        self.delete_by_id("aulas", id).await
    }

    // --- EVENTS ---

    async fn list_eventos(&self, filter: ListFilter) -> RepoResult<Vec<Evento>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {EVENTO_COLUMNS} FROM eventos"));
        push_list_tail(&mut builder, &filter, true, "data", SortOrder::Asc);
        Ok(builder.build_query_as::<Evento>().fetch_all(&self.pool).await?)
    }

    async fn get_evento(&self, id: Uuid) -> RepoResult<Option<Evento>> {
        let sql = format!("SELECT {EVENTO_COLUMNS} FROM eventos WHERE id = $1");
        Ok(sqlx::query_as::<_, Evento>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_evento(&self, input: &EventoInput, actor: Uuid) -> RepoResult<Evento> {
        let data = parse_date("data", &input.data)?;
        let sql = format!(
            "INSERT INTO eventos (id, titulo, descricao, data, horario, local, imagem_url, ativo, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) RETURNING {EVENTO_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Evento>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.titulo)
            .bind(&input.descricao)
            .bind(data)
            .bind(&input.horario)
            .bind(&input.local)
            .bind(&input.imagem_url)
            .bind(input.ativo)
            .bind(actor)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_evento(
        &self,
        id: Uuid,
        input: &EventoInput,
        actor: Uuid,
    ) -> RepoResult<Option<Evento>> {
        let data = parse_date("data", &input.data)?;
        let sql = format!(
            "UPDATE eventos SET titulo = $2, descricao = $3, data = $4, horario = $5, local = $6, \
             imagem_url = $7, ativo = $8, updated_by = $9, updated_at = NOW() \
             WHERE id = $1 RETURNING {EVENTO_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Evento>(&sql)
            .bind(id)
            .bind(&input.titulo)
            .bind(&input.descricao)
            .bind(data)
            .bind(&input.horario)
            .bind(&input.local)
            .bind(&input.imagem_url)
            .bind(input.ativo)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_evento(&self, id: Uuid) -> RepoResult<bool> {
        self.delete_by_id("eventos", id).await
    }

    // --- PASTORS ---

    async fn list_pastores(&self, filter: ListFilter) -> RepoResult<Vec<Pastor>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PASTOR_COLUMNS} FROM pastores"));
        push_list_tail(&mut builder, &filter, true, "ordem", SortOrder::Asc);
        Ok(builder.build_query_as::<Pastor>().fetch_all(&self.pool).await?)
    }

    async fn get_pastor(&self, id: Uuid) -> RepoResult<Option<Pastor>> {
        let sql = format!("SELECT {PASTOR_COLUMNS} FROM pastores WHERE id = $1");
        Ok(sqlx::query_as::<_, Pastor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_pastor(&self, input: &PastorInput, actor: Uuid) -> RepoResult<Pastor> {
        let sql = format!(
            "INSERT INTO pastores (id, nome, cargo, bio, foto_url, ordem, ativo, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {PASTOR_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Pastor>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.nome)
            .bind(&input.cargo)
            .bind(&input.bio)
            .bind(&input.foto_url)
            .bind(input.ordem)
            .bind(input.ativo)
            .bind(actor)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_pastor(
        &self,
        id: Uuid,
        input: &PastorInput,
        actor: Uuid,
    ) -> RepoResult<Option<Pastor>> {
        let sql = format!(
            "UPDATE pastores SET nome = $2, cargo = $3, bio = $4, foto_url = $5, ordem = $6, ativo = $7, \
             updated_by = $8, updated_at = NOW() WHERE id = $1 RETURNING {PASTOR_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Pastor>(&sql)
            .bind(id)
            .bind(&input.nome)
            .bind(&input.cargo)
            .bind(&input.bio)
            .bind(&input.foto_url)
            .bind(input.ordem)
            .bind(input.ativo)
            .bind(actor)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_pastor(&self, id: Uuid) -> RepoResult<bool> {
        self.delete_by_id("pastores", id).await
    }

    // --- MINISTRIES ---

    async fn list_ministerios(&self, filter: ListFilter) -> RepoResult<Vec<Ministerio>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {MINISTERIO_COLUMNS} FROM ministerios"));
        push_list_tail(&mut builder, &filter, true, "nome", SortOrder::Asc);
        let mut ministerios = builder
            .build_query_as::<Ministerio>()
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<Uuid> = ministerios.iter().map(|m| m.id).collect();
        let mut lideres = self.load_lideres(&ids).await?;
        for ministerio in &mut ministerios {
            ministerio.lideres = lideres.remove(&ministerio.id).unwrap_or_default();
        }
        Ok(ministerios)
    }

    async fn get_ministerio(&self, id: Uuid) -> RepoResult<Option<Ministerio>> {
        let sql = format!("SELECT {MINISTERIO_COLUMNS} FROM ministerios WHERE id = $1");
        let Some(mut ministerio) = sqlx::query_as::<_, Ministerio>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        ministerio.lideres = self.load_lideres(&[id]).await?.remove(&id).unwrap_or_default();
        Ok(Some(ministerio))
    }

    async fn create_ministerio(&self, input: &MinisterioInput, actor: Uuid) -> RepoResult<Ministerio> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO ministerios (id, nome, descricao, imagem_url, ativo, created_by, updated_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {MINISTERIO_COLUMNS}"
        );
        let mut ministerio = sqlx::query_as::<_, Ministerio>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.nome)
            .bind(&input.descricao)
            .bind(&input.imagem_url)
            .bind(input.ativo)
            .bind(actor)
            .fetch_one(&mut *tx)
            .await?;

        ministerio.lideres = Self::insert_lideres(&mut tx, ministerio.id, &input.lideres).await?;
        tx.commit().await?;
        Ok(ministerio)
    }

    async fn update_ministerio(
        &self,
        id: Uuid,
        input: &MinisterioInput,
        actor: Uuid,
    ) -> RepoResult<Option<Ministerio>> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE ministerios SET nome = $2, descricao = $3, imagem_url = $4, ativo = $5, \
             updated_by = $6, updated_at = NOW() WHERE id = $1 RETURNING {MINISTERIO_COLUMNS}"
        );
        let Some(mut ministerio) = sqlx::query_as::<_, Ministerio>(&sql)
            .bind(id)
            .bind(&input.nome)
            .bind(&input.descricao)
            .bind(&input.imagem_url)
            .bind(input.ativo)
            .bind(actor)
            .fetch_optional(&mut *tx)
            .await?
        else {
            // Dropping the transaction rolls it back.
            return Ok(None);
        };

        sqlx::query("DELETE FROM ministerio_lideres WHERE ministerio_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        ministerio.lideres = Self::insert_lideres(&mut tx, id, &input.lideres).await?;

        tx.commit().await?;
        Ok(Some(ministerio))
    }

    async fn delete_ministerio(&self, id: Uuid) -> RepoResult<bool> {
        self.delete_by_id("ministerios", id).await
    }

    // --- PAGE CONTENT ---

    async fn list_conteudos(&self) -> RepoResult<Vec<Conteudo>> {
        let sql = format!("SELECT {CONTEUDO_COLUMNS} FROM conteudos ORDER BY chave ASC");
        Ok(sqlx::query_as::<_, Conteudo>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_conteudo(&self, chave: &str) -> RepoResult<Option<Conteudo>> {
        let sql = format!("SELECT {CONTEUDO_COLUMNS} FROM conteudos WHERE chave = $1");
        Ok(sqlx::query_as::<_, Conteudo>(&sql)
            .bind(chave)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn upsert_conteudo(
        &self,
        chave: &str,
        input: &ConteudoInput,
        actor: Uuid,
    ) -> RepoResult<Conteudo> {
        let sql = format!(
            "INSERT INTO conteudos (chave, titulo, conteudo, updated_by) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (chave) DO UPDATE SET titulo = EXCLUDED.titulo, conteudo = EXCLUDED.conteudo, \
             updated_by = EXCLUDED.updated_by, updated_at = NOW() \
             RETURNING {CONTEUDO_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Conteudo>(&sql)
            .bind(chave)
            .bind(&input.titulo)
            .bind(&input.conteudo)
            .bind(actor)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_conteudo(&self, chave: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM conteudos WHERE chave = $1")
            .bind(chave)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
