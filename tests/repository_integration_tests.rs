use igreja_api::{
    access::Role,
    models::{ConteudoInput, LiderInput, MinisterioInput, NewUser, SermonInput, User},
    repository::{PostgresRepository, Repository, RepositoryError},
};
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;

// --- Test Context and Setup ---

/// Holds the database pool for tests that run against a real PostgreSQL.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    /// Connects and migrates, or returns `None` when no `DATABASE_URL` is
    /// configured so the suite still passes on machines without Postgres.
    async fn setup() -> Option<Self> {
        dotenv::dotenv().ok();

        let Ok(db_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping PostgreSQL repository test");
            return None;
        };

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        Some(DbTestContext { pool })
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@igreja.org", Uuid::new_v4().simple())
}

async fn create_test_user(repo: &PostgresRepository, email: &str, role: Option<Role>) -> User {
    repo.create_user(NewUser {
        email: email.to_string(),
        nome: "Membro Teste".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role,
    })
    .await
    .expect("Failed to create test user")
}

fn ministerio_input(nome: &str, lideres: &[&str]) -> MinisterioInput {
    MinisterioInput {
        nome: nome.to_string(),
        lideres: lideres
            .iter()
            .map(|nome| LiderInput {
                nome: nome.to_string(),
                cargo: None,
            })
            .collect(),
        ..MinisterioInput::default()
    }
}

async fn count_lideres(pool: &PgPool, ministerio_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ministerio_lideres WHERE ministerio_id = $1")
        .bind(ministerio_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count leaders")
}

// --- Users ---

#[test]
async fn test_roles_are_aggregated_and_admin_wins() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let user = create_test_user(&repo, &unique_email("papeis"), Some(Role::Editor)).await;

    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, 'admin')")
        .bind(user.id)
        .execute(&ctx.pool)
        .await
        .expect("Failed to insert extra role");

    let loaded = repo.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(loaded.roles, vec![Role::Admin, Role::Editor]);
    assert_eq!(loaded.effective_role(), Some(Role::Admin));

    let listed = repo.list_users().await.unwrap();
    let listed = listed.iter().find(|u| u.id == user.id).unwrap();
    assert_eq!(listed.effective_role(), Some(Role::Admin));

    assert!(repo.delete_user(user.id).await.unwrap());
}

#[test]
async fn test_user_without_role_loads_empty_roles() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let user = create_test_user(&repo, &unique_email("sem-papel"), None).await;

    let loaded = repo.get_user(user.id).await.unwrap().unwrap();
    assert!(loaded.roles.is_empty());
    assert_eq!(loaded.effective_role(), None);

    assert!(repo.delete_user(user.id).await.unwrap());
}

#[test]
async fn test_duplicate_email_is_case_insensitive() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let email = unique_email("duplicado");
    let user = create_test_user(&repo, &email, Some(Role::Editor)).await;

    let result = repo
        .create_user(NewUser {
            email: email.to_uppercase(),
            nome: "Outro".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role: None,
        })
        .await;
    assert!(matches!(result, Err(RepositoryError::DuplicateEmail)));

    // The failed insert rolled back: no orphan account or role row.
    let matches = repo
        .list_users()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.email.eq_ignore_ascii_case(&email))
        .count();
    assert_eq!(matches, 1);

    assert!(repo.delete_user(user.id).await.unwrap());
}

// --- Ministries ---

#[test]
async fn test_update_ministerio_replaces_leaders_in_order() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let editor = create_test_user(&repo, &unique_email("lideres"), Some(Role::Editor)).await;

    let created = repo
        .create_ministerio(&ministerio_input("Louvor", &["Ana", "Bruno"]), editor.id)
        .await
        .unwrap();
    assert_eq!(created.lideres.len(), 2);

    let updated = repo
        .update_ministerio(
            created.id,
            &ministerio_input("Louvor e Adoração", &["Caio", "Dani", "Eva"]),
            editor.id,
        )
        .await
        .unwrap()
        .expect("ministry should exist");

    let lideres: Vec<(String, i32)> = updated
        .lideres
        .iter()
        .map(|l| (l.nome.clone(), l.ordem))
        .collect();
    let expected = vec![
        ("Caio".to_string(), 0),
        ("Dani".to_string(), 1),
        ("Eva".to_string(), 2),
    ];
    assert_eq!(lideres, expected);
    assert_eq!(updated.nome, "Louvor e Adoração");

    let fetched = repo.get_ministerio(created.id).await.unwrap().unwrap();
    let fetched: Vec<(String, i32)> = fetched
        .lideres
        .iter()
        .map(|l| (l.nome.clone(), l.ordem))
        .collect();
    assert_eq!(fetched, expected);
    assert_eq!(count_lideres(&ctx.pool, created.id).await, 3);

    assert!(repo.delete_ministerio(created.id).await.unwrap());
    assert!(repo.delete_user(editor.id).await.unwrap());
}

#[test]
async fn test_update_missing_ministerio_returns_none() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let editor = create_test_user(&repo, &unique_email("ausente"), Some(Role::Editor)).await;
    let missing = Uuid::new_v4();

    let result = repo
        .update_ministerio(missing, &ministerio_input("Fantasma", &["Zé"]), editor.id)
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(count_lideres(&ctx.pool, missing).await, 0);

    assert!(repo.delete_user(editor.id).await.unwrap());
}

#[test]
async fn test_delete_ministerio_cascades_to_leaders() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let editor = create_test_user(&repo, &unique_email("cascata"), Some(Role::Editor)).await;

    let created = repo
        .create_ministerio(&ministerio_input("Jovens", &["Ana", "Bruno"]), editor.id)
        .await
        .unwrap();
    assert_eq!(count_lideres(&ctx.pool, created.id).await, 2);

    assert!(repo.delete_ministerio(created.id).await.unwrap());
    assert_eq!(count_lideres(&ctx.pool, created.id).await, 0);
    assert!(!repo.delete_ministerio(created.id).await.unwrap());

    assert!(repo.delete_user(editor.id).await.unwrap());
}

// --- Page content ---

#[test]
async fn test_upsert_conteudo_overwrites_existing_key() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let editor = create_test_user(&repo, &unique_email("conteudo"), Some(Role::Editor)).await;
    let chave = format!("teste_{}", Uuid::new_v4().simple());

    let first = repo
        .upsert_conteudo(
            &chave,
            &ConteudoInput {
                titulo: "T1".to_string(),
                conteudo: "Primeira versão".to_string(),
            },
            editor.id,
        )
        .await
        .unwrap();
    assert_eq!(first.titulo, "T1");

    let second = repo
        .upsert_conteudo(
            &chave,
            &ConteudoInput {
                titulo: "T2".to_string(),
                conteudo: "Segunda versão".to_string(),
            },
            editor.id,
        )
        .await
        .unwrap();
    assert_eq!(second.titulo, "T2");
    assert_eq!(second.conteudo, "Segunda versão");
    assert_eq!(second.updated_by, Some(editor.id));

    let fetched = repo.get_conteudo(&chave).await.unwrap().unwrap();
    assert_eq!(fetched.titulo, "T2");
    let rows = repo
        .list_conteudos()
        .await
        .unwrap()
        .into_iter()
        .filter(|c| c.chave == chave)
        .count();
    assert_eq!(rows, 1);

    assert!(repo.delete_conteudo(&chave).await.unwrap());
    assert!(repo.delete_user(editor.id).await.unwrap());
}

// --- Audit columns ---

#[test]
async fn test_deleting_author_nulls_audit_columns() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let editor = create_test_user(&repo, &unique_email("autor"), Some(Role::Editor)).await;

    let sermon = repo
        .create_sermon(
            &SermonInput {
                titulo: "Graça".to_string(),
                pregador: "Pr. João".to_string(),
                data: "2024-05-12".to_string(),
                ..SermonInput::default()
            },
            editor.id,
        )
        .await
        .unwrap();
    assert_eq!(sermon.created_by, Some(editor.id));
    assert_eq!(sermon.updated_by, Some(editor.id));

    assert!(repo.delete_user(editor.id).await.unwrap());

    let orphaned = repo.get_sermon(sermon.id).await.unwrap().unwrap();
    assert_eq!(orphaned.created_by, None);
    assert_eq!(orphaned.updated_by, None);
    assert_eq!(orphaned.titulo, "Graça");

    assert!(repo.delete_sermon(sermon.id).await.unwrap());
}
