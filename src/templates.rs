// src/templates.rs
use askama::Template;
use crate::models::{
    tally::CenterSummary,
    user::{OfficerRegisterForm, PoliceRegisterForm, RegisterErrors, SystemUser},
};

// Landing page with the three role entry cards
#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingPage;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub role_slug: String,
    pub role_label: String,
    // Optional inline failure message (credentials / pending / deactivated)
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "register_officer.html")]
pub struct RegisterOfficerPage {
    pub form: OfficerRegisterForm,
    pub errors: RegisterErrors,
}

#[derive(Template)]
#[template(path = "register_police.html")]
pub struct RegisterPolicePage {
    pub form: PoliceRegisterForm,
    pub errors: RegisterErrors,
}

#[derive(Template)]
#[template(path = "register_success.html")]
pub struct RegisterSuccessPage;

// One row of the admin user table, pre-rendered so the template stays
// free of enum matching
#[derive(Clone, Debug)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub status_class: &'static str,
    pub location: String,
    pub joined_date: String,
    pub last_active: String,
    pub is_pending: bool,
    pub is_active: bool,
}

impl From<&SystemUser> for UserRow {
    fn from(user: &SystemUser) -> Self {
        use crate::models::user::UserStatus;
        UserRow {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            status: user.status.to_string(),
            status_class: match user.status {
                UserStatus::Active => "badge-active",
                UserStatus::Inactive => "badge-inactive",
                UserStatus::Pending => "badge-pending",
            },
            location: user.location.clone(),
            joined_date: user.joined_date.clone(),
            last_active: user.last_active.clone(),
            is_pending: user.status == UserStatus::Pending,
            is_active: user.status == UserStatus::Active,
        }
    }
}

#[derive(Template)]
#[template(path = "admin_users.html")]
pub struct AdminUsersPage {
    pub users: Vec<UserRow>,
    pub total: usize,
    pub pending: usize,
    // Echoed filter state
    pub query: String,
    pub filter_role: String,
    pub filter_status: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

// --- Trends page view models (all math done in the handler) ---

#[derive(Clone, Debug)]
pub struct BarView {
    pub name: String,
    pub height_px: String,
    pub color: String,
    pub title: String,
}

#[derive(Clone, Debug)]
pub struct PieView {
    pub path: String,
    pub color: &'static str,
    pub title: String,
}

#[derive(Clone, Debug)]
pub struct TopPartyRow {
    pub id: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub votes: u64,
    pub percent: String,
    pub bar_width: String,
    pub behind_leader: Option<String>,
}

#[derive(Template)]
#[template(path = "trends.html")]
pub struct TrendsPage {
    pub chart_title: &'static str,
    pub toggle_mode: &'static str,
    pub total_votes: u64,
    pub leading_id: String,
    pub leading_votes: u64,
    pub participating: usize,
    // Top-to-bottom y-axis labels
    pub axis_labels: Vec<String>,
    pub bars: Vec<BarView>,
    pub has_votes: bool,
    pub pie: Vec<PieView>,
    pub top_parties: Vec<TopPartyRow>,
}

#[derive(Clone, Debug)]
pub struct VoteRow {
    pub id: &'static str,
    pub name: &'static str,
    pub votes: u64,
}

#[derive(Template)]
#[template(path = "officer.html")]
pub struct OfficerPage {
    pub officer_name: String,
    pub center_id: String,
    pub center_name: String,
    // Some once this center has submitted: the page locks read-only
    pub submitted: Option<Vec<VoteRow>>,
    pub submitted_total: u64,
    pub party_rows: Vec<VoteRow>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "police.html")]
pub struct PolicePage {
    pub officer_name: String,
    pub location: String,
    pub centers_reporting: usize,
    pub total_votes: u64,
    pub centers: Vec<CenterSummary>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub user: SystemUser,
    pub role_label: String,
    pub status_label: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}
