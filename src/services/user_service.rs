// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{NewUser, Role, SystemUser, UserStatus},
    services::auth_service,
    store::{self, KvStore, USERS_KEY},
};
use chrono::Local;

pub const ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

// Demo seed identities from early deployments; purged on every list so
// stale stores self-repair. The canonical admin is never on this list.
const DEMO_USER_EMAILS: &[&str] = &[
    "tanvir.ahmed@bec.gov.bd",
    "kamal.hossain@bec.gov.bd",
    "rahim.khan@police.gov.bd",
    "fatima.begum@bec.gov.bd",
    "mohammad.ali@police.gov.bd",
    "shamima.rahman@bec.gov.bd",
    "nazrul.islam@bec.gov.bd",
    "jasim.uddin@police.gov.bd",
];

const DEMO_USER_USERNAMES: &[&str] = &["officer", "police"];

pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

async fn canonical_admin() -> AppResult<SystemUser> {
    Ok(SystemUser {
        id: "USR-001".to_string(),
        username: ADMIN_USERNAME.to_string(),
        password_hash: auth_service::hash_password(DEFAULT_ADMIN_PASSWORD).await?,
        name: "BEC Admin".to_string(),
        email: "admin@bec.gov.bd".to_string(),
        phone: None,
        role: Role::Admin,
        status: UserStatus::Active,
        location: "BEC HQ".to_string(),
        joined_date: today(),
        last_active: "Just now".to_string(),
        service_id: None,
        rank: None,
        avatar: None,
        polling_center_id: None,
        polling_center_name: None,
        thana: None,
        nid_document: None,
    })
}

fn is_demo_user(user: &SystemUser) -> bool {
    DEMO_USER_EMAILS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(&user.email))
        || DEMO_USER_USERNAMES
            .iter()
            .any(|u| u.eq_ignore_ascii_case(&user.username))
}

fn has_admin(users: &[SystemUser]) -> bool {
    users
        .iter()
        .any(|u| u.username.eq_ignore_ascii_case(ADMIN_USERNAME) && u.role == Role::Admin)
}

/// Lists the directory, self-repairing on the way: demo seed identities
/// are dropped and the canonical admin is reinserted if missing. The
/// repaired set is persisted only when something actually changed.
pub async fn load_users(store: &dyn KvStore) -> AppResult<Vec<SystemUser>> {
    match store::load_json::<Vec<SystemUser>>(store, USERS_KEY)? {
        Some(parsed) => {
            let before = parsed.len();
            let mut users: Vec<SystemUser> =
                parsed.into_iter().filter(|u| !is_demo_user(u)).collect();
            let purged = users.len() != before;
            if purged {
                tracing::info!("Purged {} demo seed account(s)", before - users.len());
            }

            let mut repaired = false;
            if !has_admin(&users) {
                tracing::warn!("Canonical admin missing from directory, reinserting");
                // Goes at the front for visibility in the admin list
                users.insert(0, canonical_admin().await?);
                repaired = true;
            }

            if purged || repaired {
                save_users(store, &users)?;
            }
            Ok(users)
        }
        None => {
            tracing::info!("User directory not initialized, seeding canonical admin");
            let users = vec![canonical_admin().await?];
            save_users(store, &users)?;
            Ok(users)
        }
    }
}

pub fn save_users(store: &dyn KvStore, users: &[SystemUser]) -> AppResult<()> {
    store::save_json(store, USERS_KEY, &users)?;
    Ok(())
}

/// Appends a record under the next free `USR-###` id (max numeric suffix
/// plus one). Uniqueness of username/email is NOT checked here — the
/// registration flows pre-check with `username_taken` / `email_taken`.
pub async fn add_user(store: &dyn KvStore, new: NewUser) -> AppResult<SystemUser> {
    let mut users = load_users(store).await?;
    let max_id = users.iter().filter_map(|u| u.id_number()).max().unwrap_or(0);
    let user = new.into_user(format!("USR-{:03}", max_id + 1));
    users.push(user.clone());
    save_users(store, &users)?;
    tracing::info!("✅ User '{}' added as {}", user.username, user.id);
    Ok(user)
}

pub async fn find_user_by_id(store: &dyn KvStore, id: &str) -> AppResult<Option<SystemUser>> {
    let users = load_users(store).await?;
    Ok(users.into_iter().find(|u| u.id == id))
}

/// Credential check for the login flow. The username match is
/// case-insensitive, role must match exactly, and the error never says
/// which part was wrong. Matched accounts are then gated by status.
pub async fn authenticate(
    store: &dyn KvStore,
    username: &str,
    password: &str,
    role: Role,
) -> AppResult<SystemUser> {
    let users = load_users(store).await?;
    let candidate = users
        .into_iter()
        .find(|u| u.username.eq_ignore_ascii_case(username) && u.role == role);

    let Some(user) = candidate else {
        tracing::warn!("Login failed for '{}': no matching account", username);
        return Err(AppError::InvalidCredentials);
    };

    if !auth_service::verify_password(password, &user.password_hash).await? {
        tracing::warn!("Login failed for '{}': bad password", username);
        return Err(AppError::InvalidCredentials);
    }

    match user.status {
        UserStatus::Pending => {
            tracing::warn!("Login blocked for '{}': pending approval", username);
            Err(AppError::PendingApproval)
        }
        UserStatus::Inactive => {
            tracing::warn!("Login blocked for '{}': deactivated", username);
            Err(AppError::AccountDeactivated)
        }
        UserStatus::Active => {
            tracing::info!("✅ Login succeeded for '{}' ({})", user.username, user.id);
            Ok(user)
        }
    }
}

/// Updates a record's status. Activation stamps `lastActive`. Unknown
/// ids are a silent no-op.
pub async fn set_status(store: &dyn KvStore, id: &str, status: UserStatus) -> AppResult<()> {
    let mut users = load_users(store).await?;
    if let Some(user) = users.iter_mut().find(|u| u.id == id) {
        user.status = status;
        if status == UserStatus::Active {
            user.last_active = "Just now".to_string();
        }
        tracing::info!("User {} status set to {}", id, status);
        save_users(store, &users)?;
    }
    Ok(())
}

/// Deletes by id; absent ids are a no-op. No soft-delete, no cascade.
pub async fn remove_user(store: &dyn KvStore, id: &str) -> AppResult<()> {
    let mut users = load_users(store).await?;
    let before = users.len();
    users.retain(|u| u.id != id);
    if users.len() != before {
        tracing::info!("User {} removed from directory", id);
        save_users(store, &users)?;
    }
    Ok(())
}

/// Self-service partial update. Phone only applies when non-empty;
/// avatar applies whenever provided.
pub async fn update_profile(
    store: &dyn KvStore,
    id: &str,
    phone: Option<&str>,
    avatar: Option<&str>,
) -> AppResult<()> {
    let mut users = load_users(store).await?;
    if let Some(user) = users.iter_mut().find(|u| u.id == id) {
        if let Some(phone) = phone.filter(|p| !p.trim().is_empty()) {
            user.phone = Some(phone.to_string());
        }
        if let Some(avatar) = avatar {
            user.avatar = Some(avatar.to_string());
        }
        save_users(store, &users)?;
        tracing::debug!("Profile updated for {}", id);
    }
    Ok(())
}

pub async fn username_taken(store: &dyn KvStore, username: &str) -> AppResult<bool> {
    let users = load_users(store).await?;
    Ok(users.iter().any(|u| u.username.eq_ignore_ascii_case(username)))
}

pub async fn email_taken(store: &dyn KvStore, email: &str) -> AppResult<bool> {
    let users = load_users(store).await?;
    Ok(users.iter().any(|u| u.email.eq_ignore_ascii_case(email)))
}

// --- Registration builders ---

#[derive(Debug, Clone)]
pub struct OfficerRegistration {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub employee_id: String,
    pub polling_station: String,
    pub polling_center_id: Option<String>,
    pub district: String,
    pub thana: Option<String>,
    pub designation: String,
    pub username: String,
    pub password: String,
    pub nid_document: Option<String>,
}

/// Creates a Pending presiding-officer account from the registration
/// form. An admin must approve it before login succeeds.
pub async fn register_officer(
    store: &dyn KvStore,
    reg: OfficerRegistration,
) -> AppResult<SystemUser> {
    let password_hash = auth_service::hash_password(&reg.password).await?;
    add_user(
        store,
        NewUser {
            username: reg.username,
            password_hash,
            name: reg.full_name,
            email: reg.email,
            phone: Some(reg.phone),
            role: Role::Officer,
            status: UserStatus::Pending,
            location: format!("{} - {}", reg.district, reg.polling_station),
            joined_date: today(),
            last_active: "Never".to_string(),
            service_id: Some(reg.employee_id),
            rank: Some(reg.designation),
            polling_center_id: reg.polling_center_id,
            polling_center_name: Some(reg.polling_station),
            thana: reg.thana,
            nid_document: reg.nid_document,
        },
    )
    .await
}

#[derive(Debug, Clone)]
pub struct PoliceRegistration {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub service_id: String,
    pub posted_station: String,
    pub district: String,
    pub rank: String,
    pub username: String,
    pub password: String,
}

/// Creates a Pending law-enforcement account from the registration form.
pub async fn register_police(store: &dyn KvStore, reg: PoliceRegistration) -> AppResult<SystemUser> {
    let password_hash = auth_service::hash_password(&reg.password).await?;
    add_user(
        store,
        NewUser {
            username: reg.username,
            password_hash,
            name: reg.full_name,
            email: reg.email,
            phone: Some(reg.phone),
            role: Role::Police,
            status: UserStatus::Pending,
            location: format!("{} - {}", reg.district, reg.posted_station),
            joined_date: today(),
            last_active: "Never".to_string(),
            service_id: Some(reg.service_id),
            rank: Some(reg.rank),
            polling_center_id: None,
            polling_center_name: None,
            thana: None,
            nid_document: None,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn pending_officer(store: &MemoryStore, username: &str, password: &str) -> SystemUser {
        register_officer(
            store,
            OfficerRegistration {
                full_name: "Test Officer".to_string(),
                email: format!("{username}@example.org"),
                phone: "01712345678".to_string(),
                employee_id: "EMP-42".to_string(),
                polling_station: "Dhaka College".to_string(),
                polling_center_id: Some("PC-DHK-001".to_string()),
                district: "Dhaka".to_string(),
                thana: Some("Dhanmondi".to_string()),
                designation: "Presiding Officer".to_string(),
                username: username.to_string(),
                password: password.to_string(),
                nid_document: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn empty_store_seeds_canonical_admin() {
        let store = MemoryStore::new();
        let users = load_users(&store).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "USR-001");
        assert_eq!(users[0].username, "admin");
        assert_eq!(users[0].role, Role::Admin);
        assert_eq!(users[0].status, UserStatus::Active);
    }

    #[tokio::test]
    async fn removing_the_admin_is_repaired_on_next_list() {
        let store = MemoryStore::new();
        let users = load_users(&store).await.unwrap();
        remove_user(&store, &users[0].id).await.unwrap();

        let repaired = load_users(&store).await.unwrap();
        assert!(repaired
            .iter()
            .any(|u| u.username == "admin" && u.role == Role::Admin));
        // Idempotent: a second list does not duplicate the admin
        let again = load_users(&store).await.unwrap();
        assert_eq!(
            again.iter().filter(|u| u.username == "admin").count(),
            1
        );
    }

    #[tokio::test]
    async fn demo_seed_accounts_are_purged() {
        let store = MemoryStore::new();
        let mut users = load_users(&store).await.unwrap();
        let mut demo = users[0].clone();
        demo.id = "USR-009".to_string();
        demo.username = "Officer".to_string();
        demo.email = "someone@example.org".to_string();
        let mut demo2 = users[0].clone();
        demo2.id = "USR-010".to_string();
        demo2.username = "kamal".to_string();
        demo2.email = "Kamal.Hossain@bec.gov.bd".to_string();
        users.push(demo);
        users.push(demo2);
        save_users(&store, &users).unwrap();

        let listed = load_users(&store).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].username, "admin");
    }

    #[tokio::test]
    async fn add_assigns_strictly_increasing_ids() {
        let store = MemoryStore::new();
        let first = pending_officer(&store, "first", "secret1").await;
        let second = pending_officer(&store, "second", "secret2").await;
        assert_eq!(first.id, "USR-002");
        assert_eq!(second.id, "USR-003");
        assert!(second.id_number() > first.id_number());

        let users = load_users(&store).await.unwrap();
        assert!(users.iter().any(|u| u.id == second.id));
    }

    #[tokio::test]
    async fn add_skips_past_gapped_and_foreign_ids() {
        let store = MemoryStore::new();
        let mut users = load_users(&store).await.unwrap();
        let mut stray = users[0].clone();
        stray.id = "USR-041".to_string();
        stray.username = "stray".to_string();
        stray.email = "stray@example.org".to_string();
        let mut odd = users[0].clone();
        odd.id = "LEGACY-9".to_string();
        odd.username = "odd".to_string();
        odd.email = "odd@example.org".to_string();
        users.push(stray);
        users.push(odd);
        save_users(&store, &users).unwrap();

        let added = pending_officer(&store, "fresh", "secret").await;
        assert_eq!(added.id, "USR-042");
    }

    #[tokio::test]
    async fn authenticate_active_account_returns_the_record() {
        let store = MemoryStore::new();
        let officer = pending_officer(&store, "rahima", "hunter22").await;
        set_status(&store, &officer.id, UserStatus::Active)
            .await
            .unwrap();

        // Username match is case-insensitive
        let user = authenticate(&store, "RAHIMA", "hunter22", Role::Officer)
            .await
            .unwrap();
        assert_eq!(user.id, officer.id);
        assert_eq!(user.username, "rahima");
    }

    #[tokio::test]
    async fn authenticate_pending_fails_even_with_correct_credentials() {
        let store = MemoryStore::new();
        pending_officer(&store, "waiting", "hunter22").await;
        let err = authenticate(&store, "waiting", "hunter22", Role::Officer)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PendingApproval));
    }

    #[tokio::test]
    async fn authenticate_inactive_reports_deactivated() {
        let store = MemoryStore::new();
        let officer = pending_officer(&store, "benched", "hunter22").await;
        set_status(&store, &officer.id, UserStatus::Inactive)
            .await
            .unwrap();
        let err = authenticate(&store, "benched", "hunter22", Role::Officer)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AccountDeactivated));
    }

    #[tokio::test]
    async fn authenticate_never_says_which_field_failed() {
        let store = MemoryStore::new();
        let officer = pending_officer(&store, "strict", "hunter22").await;
        set_status(&store, &officer.id, UserStatus::Active)
            .await
            .unwrap();

        let wrong_password = authenticate(&store, "strict", "nope", Role::Officer).await;
        let wrong_role = authenticate(&store, "strict", "hunter22", Role::Police).await;
        let unknown = authenticate(&store, "ghost", "hunter22", Role::Officer).await;
        for result in [wrong_password, wrong_role, unknown] {
            assert!(matches!(result, Err(AppError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn activation_stamps_last_active() {
        let store = MemoryStore::new();
        let officer = pending_officer(&store, "stamped", "secret").await;
        assert_eq!(officer.last_active, "Never");

        set_status(&store, &officer.id, UserStatus::Active)
            .await
            .unwrap();
        let user = find_user_by_id(&store, &officer.id).await.unwrap().unwrap();
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.last_active, "Just now");

        // Deactivation leaves the stamp alone
        set_status(&store, &officer.id, UserStatus::Inactive)
            .await
            .unwrap();
        let user = find_user_by_id(&store, &officer.id).await.unwrap().unwrap();
        assert_eq!(user.last_active, "Just now");
    }

    #[tokio::test]
    async fn set_status_on_unknown_id_is_a_noop() {
        let store = MemoryStore::new();
        load_users(&store).await.unwrap();
        set_status(&store, "USR-999", UserStatus::Active)
            .await
            .unwrap();
        assert_eq!(load_users(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn profile_update_ignores_empty_phone_but_takes_avatar() {
        let store = MemoryStore::new();
        let officer = pending_officer(&store, "prof", "secret").await;

        update_profile(&store, &officer.id, Some(""), Some("a.png"))
            .await
            .unwrap();
        let user = find_user_by_id(&store, &officer.id).await.unwrap().unwrap();
        assert_eq!(user.phone.as_deref(), Some("01712345678"));
        assert_eq!(user.avatar.as_deref(), Some("a.png"));

        update_profile(&store, &officer.id, Some("01898765432"), None)
            .await
            .unwrap();
        let user = find_user_by_id(&store, &officer.id).await.unwrap().unwrap();
        assert_eq!(user.phone.as_deref(), Some("01898765432"));
    }

    #[tokio::test]
    async fn uniqueness_checks_are_case_insensitive() {
        let store = MemoryStore::new();
        pending_officer(&store, "unique", "secret").await;
        assert!(username_taken(&store, "UNIQUE").await.unwrap());
        assert!(email_taken(&store, "UNIQUE@EXAMPLE.ORG").await.unwrap());
        assert!(!username_taken(&store, "someone-else").await.unwrap());
    }
}
