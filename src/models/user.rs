// src/models/user.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed at creation, never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Officer,
    Police,
}

impl Role {
    /// Parses the lowercase role slug used by the login/landing pages
    /// ("admin", "officer", "police").
    pub fn from_slug(slug: &str) -> Option<Role> {
        match slug {
            "admin" => Some(Role::Admin),
            "officer" => Some(Role::Officer),
            "police" => Some(Role::Police),
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Officer => "officer",
            Role::Police => "police",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Admin => "Admin",
            Role::Officer => "Officer",
            Role::Police => "Police",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
    Pending,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
            UserStatus::Pending => "Pending",
        };
        write!(f, "{label}")
    }
}

/// One account record in the `amarvote_users` directory.
///
/// Serialized camelCase to keep the persisted layout stable. The
/// `password` key holds a bcrypt hash, never the raw credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemUser {
    pub id: String,
    pub username: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub location: String,
    pub joined_date: String,
    pub last_active: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_center_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_center_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nid_document: Option<String>,
}

impl SystemUser {
    /// Numeric suffix of a `USR-###` id, used for monotonic assignment.
    pub fn id_number(&self) -> Option<u32> {
        self.id.strip_prefix("USR-")?.parse().ok()
    }
}

/// Everything an account needs except its id; `add_user` assigns that.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub location: String,
    pub joined_date: String,
    pub last_active: String,
    pub service_id: Option<String>,
    pub rank: Option<String>,
    pub polling_center_id: Option<String>,
    pub polling_center_name: Option<String>,
    pub thana: Option<String>,
    pub nid_document: Option<String>,
}

impl NewUser {
    pub fn into_user(self, id: String) -> SystemUser {
        SystemUser {
            id,
            username: self.username,
            password_hash: self.password_hash,
            name: self.name,
            email: self.email,
            phone: self.phone,
            role: self.role,
            status: self.status,
            location: self.location,
            joined_date: self.joined_date,
            last_active: self.last_active,
            service_id: self.service_id,
            rank: self.rank,
            avatar: None,
            polling_center_id: self.polling_center_id,
            polling_center_name: self.polling_center_name,
            thana: self.thana,
            nid_document: self.nid_document,
        }
    }
}

// Login form data (role comes from the landing-page selection)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub role: String,
}

// Presiding-officer registration form. Kept around after a failed
// validation so the page can re-fill what was typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfficerRegisterForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub polling_station: String,
    #[serde(default)]
    pub polling_center_id: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub thana: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

// Law-enforcement registration form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoliceRegisterForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service_id: String,
    #[serde(default)]
    pub posted_station: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Per-field registration errors, rendered inline next to each input.
#[derive(Debug, Clone, Default)]
pub struct RegisterErrors {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service_id: Option<String>,
    pub station: Option<String>,
    pub district: Option<String>,
    pub rank: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl RegisterErrors {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.service_id.is_none()
            && self.station.is_none()
            && self.district.is_none()
            && self.rank.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }
}
