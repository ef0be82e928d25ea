#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use igreja_api::{
    AppConfig, AppState, MockStorageService, create_router,
    access::Role,
    auth::{AuthUser, hash_password, issue_token},
    models::{
        Aula, AulaInput, Conteudo, ConteudoInput, Evento, EventoInput, Lider, ListFilter,
        Ministerio, MinisterioInput, NewUser, Pastor, PastorInput, Sermon, SermonInput,
        SortOrder, User, UserChanges, UserCredentials,
    },
    repository::{RepoResult, Repository, RepositoryError, RepositoryState, parse_date},
    storage::StorageState,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

// --- In-memory repository ---

#[derive(Default)]
struct Store {
    users: Vec<(User, String)>,
    sermons: Vec<Sermon>,
    aulas: Vec<Aula>,
    eventos: Vec<Evento>,
    pastores: Vec<Pastor>,
    ministerios: Vec<Ministerio>,
    conteudos: Vec<Conteudo>,
}

/// Repository double with the same observable behavior as the Postgres
/// implementation: ordering, `ativo` filters, leader replacement, duplicate
/// emails, cascades on user deletion.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    store: Arc<Mutex<Store>>,
    /// When set, `list_sermons` fails with a database error.
    pub fail_sermon_reads: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_sermon_reads: true,
            ..Self::default()
        }
    }

    /// Stores a user exactly as given, including any number of role rows.
    pub fn insert_user(&self, user: User, password_hash: String) {
        self.store.lock().unwrap().users.push((user, password_hash));
    }

    pub fn user_count(&self) -> usize {
        self.store.lock().unwrap().users.len()
    }
}

fn ordered<T: Clone, K: Ord>(items: &[T], order: SortOrder, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut out = items.to_vec();
    out.sort_by_key(|item| key(item));
    if order == SortOrder::Desc {
        out.reverse();
    }
    out
}

fn matches_ativo(filter: &ListFilter, ativo: bool) -> bool {
    filter.ativo.is_none_or(|wanted| wanted == ativo)
}

fn lideres_from(input: &MinisterioInput) -> Vec<Lider> {
    input
        .lideres
        .iter()
        .enumerate()
        .map(|(position, lider)| Lider {
            id: Uuid::new_v4(),
            nome: lider.nome.clone(),
            cargo: lider.cargo.clone(),
            ordem: position as i32,
        })
        .collect()
}

fn clear_actor(field: &mut Option<Uuid>, id: Uuid) {
    if *field == Some(id) {
        *field = None;
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    async fn find_credentials_by_email(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .find(|(u, _)| u.email.eq_ignore_ascii_case(email))
            .map(|(user, hash)| UserCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn get_credentials(&self, id: Uuid) -> RepoResult<Option<UserCredentials>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(user, hash)| UserCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let store = self.store.lock().unwrap();
        let users: Vec<User> = store.users.iter().map(|(u, _)| u.clone()).collect();
        Ok(ordered(&users, SortOrder::Asc, |u| u.nome.clone()))
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut store = self.store.lock().unwrap();
        if store.users.iter().any(|(u, _)| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(RepositoryError::DuplicateEmail);
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            nome: user.nome,
            roles: user.role.into_iter().collect(),
            created_at: now,
            updated_at: now,
        };
        store.users.push((created.clone(), user.password_hash));
        Ok(created)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> RepoResult<Option<User>> {
        let mut store = self.store.lock().unwrap();
        if store
            .users
            .iter()
            .any(|(u, _)| u.id != id && u.email.eq_ignore_ascii_case(&changes.email))
        {
            return Err(RepositoryError::DuplicateEmail);
        }
        Ok(store.users.iter_mut().find(|(u, _)| u.id == id).map(|(user, hash)| {
            user.email = changes.email;
            user.nome = changes.nome;
            user.updated_at = Utc::now();
            if let Some(new_hash) = changes.password_hash {
                *hash = new_hash;
            }
            user.clone()
        }))
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> RepoResult<Option<User>> {
        let mut store = self.store.lock().unwrap();
        Ok(store.users.iter_mut().find(|(u, _)| u.id == id).map(|(user, _)| {
            user.roles = vec![role];
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> RepoResult<bool> {
        let mut store = self.store.lock().unwrap();
        match store.users.iter_mut().find(|(u, _)| u.id == id) {
            Some((_, hash)) => {
                *hash = password_hash;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.users.len();
        store.users.retain(|(u, _)| u.id != id);
        if store.users.len() == before {
            return Ok(false);
        }
        for s in &mut store.sermons {
            clear_actor(&mut s.created_by, id);
            clear_actor(&mut s.updated_by, id);
        }
        for a in &mut store.aulas {
            clear_actor(&mut a.created_by, id);
            clear_actor(&mut a.updated_by, id);
        }
        for e in &mut store.eventos {
            clear_actor(&mut e.created_by, id);
            clear_actor(&mut e.updated_by, id);
        }
        for p in &mut store.pastores {
            clear_actor(&mut p.created_by, id);
            clear_actor(&mut p.updated_by, id);
        }
        for m in &mut store.ministerios {
            clear_actor(&mut m.created_by, id);
            clear_actor(&mut m.updated_by, id);
        }
        for c in &mut store.conteudos {
            clear_actor(&mut c.updated_by, id);
        }
        Ok(true)
    }

    // --- Sermons ---

    async fn list_sermons(&self, filter: ListFilter) -> RepoResult<Vec<Sermon>> {
        if self.fail_sermon_reads {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let store = self.store.lock().unwrap();
        Ok(ordered(
            &store.sermons,
            filter.order.unwrap_or(SortOrder::Desc),
            |s| s.data,
        ))
    }

    async fn get_sermon(&self, id: Uuid) -> RepoResult<Option<Sermon>> {
        let store = self.store.lock().unwrap();
        Ok(store.sermons.iter().find(|s| s.id == id).cloned())
    }

    async fn create_sermon(&self, input: &SermonInput, actor: Uuid) -> RepoResult<Sermon> {
        let data = parse_date("data", &input.data)?;
        let now = Utc::now();
        let sermon = Sermon {
            id: Uuid::new_v4(),
            titulo: input.titulo.clone(),
            pregador: input.pregador.clone(),
            data,
            descricao: input.descricao.clone(),
            video_url: input.video_url.clone(),
            audio_url: input.audio_url.clone(),
            imagem_url: input.imagem_url.clone(),
            created_by: Some(actor),
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        self.store.lock().unwrap().sermons.push(sermon.clone());
        Ok(sermon)
    }

    async fn update_sermon(
        &self,
        id: Uuid,
        input: &SermonInput,
        actor: Uuid,
    ) -> RepoResult<Option<Sermon>> {
        let data = parse_date("data", &input.data)?;
        let mut store = self.store.lock().unwrap();
        Ok(store.sermons.iter_mut().find(|s| s.id == id).map(|s| {
            s.titulo = input.titulo.clone();
            s.pregador = input.pregador.clone();
            s.data = data;
            s.descricao = input.descricao.clone();
            s.video_url = input.video_url.clone();
            s.audio_url = input.audio_url.clone();
            s.imagem_url = input.imagem_url.clone();
            s.updated_by = Some(actor);
            s.updated_at = Utc::now();
            s.clone()
        }))
    }

    async fn delete_sermon(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.sermons.len();
        store.sermons.retain(|s| s.id != id);
        Ok(store.sermons.len() < before)
    }

    // --- Classes ---

    async fn list_aulas(&self, filter: ListFilter) -> RepoResult<Vec<Aula>> {
        let store = self.store.lock().unwrap();
        Ok(ordered(
            &store.aulas,
            filter.order.unwrap_or(SortOrder::Desc),
            |a| a.data,
        ))
    }

    async fn get_aula(&self, id: Uuid) -> RepoResult<Option<Aula>> {
        let store = self.store.lock().unwrap();
        Ok(store.aulas.iter().find(|a| a.id == id).cloned())
    }

    async fn create_aula(&self, input: &AulaInput, actor: Uuid) -> RepoResult<Aula> {
        let data = parse_date("data", &input.data)?;
        let now = Utc::now();
        let aula = Aula {
            id: Uuid::new_v4(),
            titulo: input.titulo.clone(),
            professor: input.professor.clone(),
            data,
            descricao: input.descricao.clone(),
            video_url: input.video_url.clone(),
            material_url: input.material_url.clone(),
            created_by: Some(actor),
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        self.store.lock().unwrap().aulas.push(aula.clone());
        Ok(aula)
    }

    async fn update_aula(&self, id: Uuid, input: &AulaInput, actor: Uuid) -> RepoResult<Option<Aula>> {
        let data = parse_date("data", &input.data)?;
        let mut store = self.store.lock().unwrap();
        Ok(store.aulas.iter_mut().find(|a| a.id == id).map(|a| {
            a.titulo = input.titulo.clone();
            a.professor = input.professor.clone();
            a.data = data;
            a.descricao = input.descricao.clone();
            a.video_url = input.video_url.clone();
            a.material_url = input.material_url.clone();
            a.updated_by = Some(actor);
            a.updated_at = Utc::now();
            a.clone()
        }))
    }

    async fn delete_aula(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.aulas.len();
        store.aulas.retain(|a| a.id != id);
        Ok(store.aulas.len() < before)
    }

    // --- Events ---

    async fn list_eventos(&self, filter: ListFilter) -> RepoResult<Vec<Evento>> {
        let store = self.store.lock().unwrap();
        let visible: Vec<Evento> = store
            .eventos
            .iter()
            .filter(|e| matches_ativo(&filter, e.ativo))
            .cloned()
            .collect();
        Ok(ordered(&visible, filter.order.unwrap_or(SortOrder::Asc), |e| e.data))
    }

    async fn get_evento(&self, id: Uuid) -> RepoResult<Option<Evento>> {
        let store = self.store.lock().unwrap();
        Ok(store.eventos.iter().find(|e| e.id == id).cloned())
    }

    async fn create_evento(&self, input: &EventoInput, actor: Uuid) -> RepoResult<Evento> {
        let data = parse_date("data", &input.data)?;
        let now = Utc::now();
        let evento = Evento {
            id: Uuid::new_v4(),
            titulo: input.titulo.clone(),
            descricao: input.descricao.clone(),
            data,
            horario: input.horario.clone(),
            local: input.local.clone(),
            imagem_url: input.imagem_url.clone(),
            ativo: input.ativo,
            created_by: Some(actor),
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        self.store.lock().unwrap().eventos.push(evento.clone());
        Ok(evento)
    }

    async fn update_evento(
        &self,
        id: Uuid,
        input: &EventoInput,
        actor: Uuid,
    ) -> RepoResult<Option<Evento>> {
        let data = parse_date("data", &input.data)?;
        let mut store = self.store.lock().unwrap();
        Ok(store.eventos.iter_mut().find(|e| e.id == id).map(|e| {
            e.titulo = input.titulo.clone();
            e.descricao = input.descricao.clone();
            e.data = data;
            e.horario = input.horario.clone();
            e.local = input.local.clone();
            e.imagem_url = input.imagem_url.clone();
            e.ativo = input.ativo;
            e.updated_by = Some(actor);
            e.updated_at = Utc::now();
            e.clone()
        }))
    }

    async fn delete_evento(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.eventos.len();
        store.eventos.retain(|e| e.id != id);
        Ok(store.eventos.len() < before)
    }

    // --- Pastors ---

    async fn list_pastores(&self, filter: ListFilter) -> RepoResult<Vec<Pastor>> {
        let store = self.store.lock().unwrap();
        let visible: Vec<Pastor> = store
            .pastores
            .iter()
            .filter(|p| matches_ativo(&filter, p.ativo))
            .cloned()
            .collect();
        Ok(ordered(&visible, filter.order.unwrap_or(SortOrder::Asc), |p| p.ordem))
    }

    async fn get_pastor(&self, id: Uuid) -> RepoResult<Option<Pastor>> {
        let store = self.store.lock().unwrap();
        Ok(store.pastores.iter().find(|p| p.id == id).cloned())
    }

    async fn create_pastor(&self, input: &PastorInput, actor: Uuid) -> RepoResult<Pastor> {
        let now = Utc::now();
        let pastor = Pastor {
            id: Uuid::new_v4(),
            nome: input.nome.clone(),
            cargo: input.cargo.clone(),
            bio: input.bio.clone(),
            foto_url: input.foto_url.clone(),
            ordem: input.ordem,
            ativo: input.ativo,
            created_by: Some(actor),
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        self.store.lock().unwrap().pastores.push(pastor.clone());
        Ok(pastor)
    }

    async fn update_pastor(
        &self,
        id: Uuid,
        input: &PastorInput,
        actor: Uuid,
    ) -> RepoResult<Option<Pastor>> {
        let mut store = self.store.lock().unwrap();
        Ok(store.pastores.iter_mut().find(|p| p.id == id).map(|p| {
            p.nome = input.nome.clone();
            p.cargo = input.cargo.clone();
            p.bio = input.bio.clone();
            p.foto_url = input.foto_url.clone();
            p.ordem = input.ordem;
            p.ativo = input.ativo;
            p.updated_by = Some(actor);
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_pastor(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.pastores.len();
        store.pastores.retain(|p| p.id != id);
        Ok(store.pastores.len() < before)
    }

    // --- Ministries ---

    async fn list_ministerios(&self, filter: ListFilter) -> RepoResult<Vec<Ministerio>> {
        let store = self.store.lock().unwrap();
        let visible: Vec<Ministerio> = store
            .ministerios
            .iter()
            .filter(|m| matches_ativo(&filter, m.ativo))
            .cloned()
            .collect();
        Ok(ordered(&visible, filter.order.unwrap_or(SortOrder::Asc), |m| {
            m.nome.clone()
        }))
    }

    async fn get_ministerio(&self, id: Uuid) -> RepoResult<Option<Ministerio>> {
        let store = self.store.lock().unwrap();
        Ok(store.ministerios.iter().find(|m| m.id == id).cloned())
    }

    async fn create_ministerio(&self, input: &MinisterioInput, actor: Uuid) -> RepoResult<Ministerio> {
        let now = Utc::now();
        let ministerio = Ministerio {
            id: Uuid::new_v4(),
            nome: input.nome.clone(),
            descricao: input.descricao.clone(),
            imagem_url: input.imagem_url.clone(),
            ativo: input.ativo,
            lideres: lideres_from(input),
            created_by: Some(actor),
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        self.store.lock().unwrap().ministerios.push(ministerio.clone());
        Ok(ministerio)
    }

    async fn update_ministerio(
        &self,
        id: Uuid,
        input: &MinisterioInput,
        actor: Uuid,
    ) -> RepoResult<Option<Ministerio>> {
        let mut store = self.store.lock().unwrap();
        Ok(store.ministerios.iter_mut().find(|m| m.id == id).map(|m| {
            m.nome = input.nome.clone();
            m.descricao = input.descricao.clone();
            m.imagem_url = input.imagem_url.clone();
            m.ativo = input.ativo;
            m.lideres = lideres_from(input);
            m.updated_by = Some(actor);
            m.updated_at = Utc::now();
            m.clone()
        }))
    }

    async fn delete_ministerio(&self, id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.ministerios.len();
        store.ministerios.retain(|m| m.id != id);
        Ok(store.ministerios.len() < before)
    }

    // --- Page content ---

    async fn list_conteudos(&self) -> RepoResult<Vec<Conteudo>> {
        let store = self.store.lock().unwrap();
        Ok(ordered(&store.conteudos, SortOrder::Asc, |c| c.chave.clone()))
    }

    async fn get_conteudo(&self, chave: &str) -> RepoResult<Option<Conteudo>> {
        let store = self.store.lock().unwrap();
        Ok(store.conteudos.iter().find(|c| c.chave == chave).cloned())
    }

    async fn upsert_conteudo(
        &self,
        chave: &str,
        input: &ConteudoInput,
        actor: Uuid,
    ) -> RepoResult<Conteudo> {
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = store.conteudos.iter_mut().find(|c| c.chave == chave) {
            existing.titulo = input.titulo.clone();
            existing.conteudo = input.conteudo.clone();
            existing.updated_by = Some(actor);
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let conteudo = Conteudo {
            chave: chave.to_string(),
            titulo: input.titulo.clone(),
            conteudo: input.conteudo.clone(),
            updated_by: Some(actor),
            created_at: now,
            updated_at: now,
        };
        store.conteudos.push(conteudo.clone());
        Ok(conteudo)
    }

    async fn delete_conteudo(&self, chave: &str) -> RepoResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.conteudos.len();
        store.conteudos.retain(|c| c.chave != chave);
        Ok(store.conteudos.len() < before)
    }
}

// --- State & app helpers ---

pub fn test_config() -> AppConfig {
    AppConfig::default()
}

pub fn test_state(repo: InMemoryRepository) -> AppState {
    test_state_with(repo, MockStorageService::new(), test_config())
}

pub fn test_state_with(
    repo: InMemoryRepository,
    storage: MockStorageService,
    config: AppConfig,
) -> AppState {
    AppState {
        repo: Arc::new(repo) as RepositoryState,
        storage: Arc::new(storage) as StorageState,
        config,
    }
}

/// Creates a user with a real Argon2 hash of `password` and the given role rows.
pub async fn seed_user(
    repo: &InMemoryRepository,
    email: &str,
    password: &str,
    roles: Vec<Role>,
) -> User {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        nome: format!("Usuário {email}"),
        roles,
        created_at: now,
        updated_at: now,
    };
    let hash = hash_password(password).await.expect("hashing failed");
    repo.insert_user(user.clone(), hash);
    user
}

pub fn token_for(config: &AppConfig, user: &User) -> String {
    issue_token(config, user).expect("token signing failed")
}

pub fn auth_user(user: &User) -> AuthUser {
    AuthUser::from(user)
}

pub fn sermon_input(titulo: &str, data: &str) -> SermonInput {
    SermonInput {
        titulo: titulo.to_string(),
        pregador: "Pr. João".to_string(),
        data: data.to_string(),
        ..SermonInput::default()
    }
}

/// Serves the full router on an ephemeral port and returns its base URL.
pub async fn spawn_app(state: AppState) -> String {
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}
