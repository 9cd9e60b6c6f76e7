use linkhop_core::{LinkPatch, LinkQuery, NewLink, NewUser, Role, ShortToken, UserId};
use linkhop_storage::{
    LinkRepository, MySqlRepository, ReadRepository, StorageError, UserRepository,
};
use linkhop_test_infra::MySqlServer;

struct Fixture {
    mysql: MySqlServer,
    repo: MySqlRepository,
}

impl Fixture {
    async fn start() -> Self {
        let mysql = MySqlServer::start().await.expect("start mysql");

        let repo = MySqlRepository::new(mysql.pool().clone());
        repo.migrate().await.expect("create schema");

        Self {
            mysql,
            repo,
        }
    }
}

fn token(value: &str) -> ShortToken {
    ShortToken::new_unchecked(value)
}

fn new_link(token_str: &str, url: &str, title: &str, owner: UserId) -> NewLink {
    NewLink {
        short_token: token(token_str),
        original_url: url.to_string(),
        title: title.to_string(),
        tags: vec!["docs".to_string()],
        owner,
    }
}

#[tokio::test]
async fn insert_and_find_by_token() {
    let fixture = Fixture::start().await;
    let owner = UserId::new();

    let inserted = fixture
        .repo
        .insert(new_link("abc12345", "https://example.com", "Example", owner))
        .await
        .unwrap();

    let got = fixture
        .repo
        .find_by_token(&token("abc12345"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got.id, inserted.id);
    assert_eq!(got.original_url, "https://example.com");
    assert_eq!(got.tags, vec!["docs".to_string()]);
    assert_eq!(got.clicks, 0);
    assert!(got.is_active);
    assert!(got.last_accessed_at.is_none());
}

#[tokio::test]
async fn insert_conflicts_when_token_already_exists() {
    let fixture = Fixture::start().await;
    let owner = UserId::new();

    fixture
        .repo
        .insert(new_link("abc12345", "https://one.example", "", owner))
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert(new_link("abc12345", "https://two.example", "", owner))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn tokens_are_case_sensitive() {
    let fixture = Fixture::start().await;
    let owner = UserId::new();

    fixture
        .repo
        .insert(new_link("CaseTest", "https://upper.example", "", owner))
        .await
        .unwrap();
    fixture
        .repo
        .insert(new_link("casetest", "https://lower.example", "", owner))
        .await
        .unwrap();

    let upper = fixture
        .repo
        .find_by_token(&token("CaseTest"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(upper.original_url, "https://upper.example");
}

#[tokio::test]
async fn soft_deleted_tokens_are_not_reused() {
    let fixture = Fixture::start().await;
    let owner = UserId::new();

    let record = fixture
        .repo
        .insert(new_link("history1", "https://example.com", "", owner))
        .await
        .unwrap();

    assert!(fixture.repo.delete_owned(record.id, owner).await.unwrap());
    assert!(!fixture.repo.delete_owned(record.id, owner).await.unwrap());
    assert!(fixture
        .repo
        .find_by_token(&token("history1"))
        .await
        .unwrap()
        .is_none());
    assert!(fixture.repo.exists_by_token(&token("history1")).await.unwrap());
}

#[tokio::test]
async fn owner_mismatch_leaves_record_untouched() {
    let fixture = Fixture::start().await;
    let alice = UserId::new();
    let bob = UserId::new();

    let record = fixture
        .repo
        .insert(new_link("alice001", "https://alice.example", "Mine", alice))
        .await
        .unwrap();

    let err = fixture
        .repo
        .update_owned(
            record.id,
            bob,
            LinkPatch {
                original_url: Some("https://evil.example".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    assert!(!fixture.repo.delete_owned(record.id, bob).await.unwrap());

    let stored = fixture
        .repo
        .find_owned(record.id, alice)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.original_url, "https://alice.example");
}

#[tokio::test]
async fn list_owned_searches_case_insensitively() {
    let fixture = Fixture::start().await;
    let owner = UserId::new();

    fixture
        .repo
        .insert(new_link("srch0001", "https://FOO.example", "", owner))
        .await
        .unwrap();
    fixture
        .repo
        .insert(new_link("srch0002", "https://bar.example", "All about Foo", owner))
        .await
        .unwrap();
    fixture
        .repo
        .insert(new_link("srch0003", "https://baz.example", "nothing", owner))
        .await
        .unwrap();

    let page = fixture
        .repo
        .list_owned(owner, &LinkQuery::new(Some(1), Some(1), Some("foo")))
        .await
        .unwrap();

    assert_eq!(page.total_items, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total_pages(), 2);
}

#[tokio::test]
async fn concurrent_increments_are_not_lost() {
    let fixture = Fixture::start().await;
    let owner = UserId::new();

    fixture
        .repo
        .insert(new_link("hot00001", "https://example.com", "", owner))
        .await
        .unwrap();

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let repo = fixture.repo.clone();
            tokio::spawn(async move { repo.increment_click_and_touch(&token("hot00001")).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = fixture
        .repo
        .find_by_token(&token("hot00001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.clicks, 25);
    assert!(stored.last_accessed_at.is_some());
}

#[tokio::test]
async fn increment_skips_inactive_links() {
    let fixture = Fixture::start().await;
    let owner = UserId::new();

    let record = fixture
        .repo
        .insert(new_link("off00001", "https://example.com", "", owner))
        .await
        .unwrap();
    fixture
        .repo
        .update_owned(
            record.id,
            owner,
            LinkPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = fixture
        .repo
        .increment_click_and_touch(&token("off00001"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn users_roundtrip() {
    let fixture = Fixture::start().await;

    let user = fixture
        .repo
        .insert_user(NewUser {
            email: "ada@example.com".into(),
            password_hash: "$argon2id$v=19$stub".into(),
            role: Role::Admin,
        })
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert_user(NewUser {
            email: "ada@example.com".into(),
            password_hash: "$argon2id$v=19$other".into(),
            role: Role::User,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));

    let by_email = fixture
        .repo
        .find_user_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);
    assert_eq!(by_email.role, Role::Admin);
    assert_eq!(fixture.repo.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn connect_by_dsn_shares_the_schema() {
    let fixture = Fixture::start().await;
    let owner = UserId::new();
    fixture
        .repo
        .insert(new_link("dsn12345", "https://example.com/", "Example", owner))
        .await
        .unwrap();

    let other = MySqlRepository::connect(fixture.mysql.database_url())
        .await
        .unwrap();
    other.migrate().await.unwrap();

    assert!(other.exists_by_token(&token("dsn12345")).await.unwrap());
}
