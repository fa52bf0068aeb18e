// src/web/register_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{OfficerRegisterForm, PoliceRegisterForm, RegisterErrors},
    services::user_service::{self, OfficerRegistration, PoliceRegistration},
    state::AppState,
    templates::{RegisterOfficerPage, RegisterPolicePage, RegisterSuccessPage},
};
use askama::Template;
use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect},
};

// --- Field validation ---

fn required(value: &str, label: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("{label} is required"))
    } else {
        None
    }
}

fn validate_email(email: &str) -> Option<String> {
    if email.is_empty() {
        return Some("Email is required".to_string());
    }
    if !email.contains('@') {
        return Some("Email must contain an @ symbol".to_string());
    }
    if email.contains("..") {
        return Some("Email cannot contain consecutive dots".to_string());
    }
    if email.starts_with('.') || email.contains("@.") {
        return Some("Email cannot have a dot at the start or right after @".to_string());
    }
    if email.starts_with('@') {
        return Some("Email must have username before @ symbol".to_string());
    }
    if email.matches('@').count() != 1 {
        return Some("Please enter a valid email address (e.g., user123@gmail.com)".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Some("Please enter a valid email address (e.g., user123@gmail.com)".to_string());
    };
    if local.is_empty() {
        return Some("Email must have username before @ symbol".to_string());
    }
    if !domain.contains('.') {
        return Some("Please enter a valid email domain (e.g., gmail.com)".to_string());
    }
    if !local.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Some("Email must start with a letter or number".to_string());
    }

    // Catch-all shape check over both halves
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && local.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    let domain_ok = domain.split('.').all(|label| {
        !label.is_empty()
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    }) && domain
        .rsplit('.')
        .next()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));
    if !local_ok || !domain_ok {
        return Some("Please enter a valid email address (e.g., user123@gmail.com)".to_string());
    }
    None
}

// Bangladesh mobile numbers: 11 digits, operator prefix 013..019
fn validate_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Some("Phone number is required".to_string());
    }
    if digits.len() != 11 {
        return Some("Phone number must be exactly 11 digits".to_string());
    }
    const VALID_PREFIXES: &[&str] = &["013", "014", "015", "016", "017", "018", "019"];
    if !VALID_PREFIXES.contains(&&digits[..3]) {
        return Some(
            "Please enter a valid Bangladesh mobile number (013, 014, 015, 016, 017, 018, or 019)"
                .to_string(),
        );
    }
    None
}

fn validate_password(password: &str, confirm: &str, errors: &mut RegisterErrors) {
    if password.is_empty() {
        errors.password = Some("Password is required".to_string());
    } else if password.len() < 6 {
        errors.password = Some("Password must be at least 6 characters".to_string());
    }
    if password != confirm {
        errors.confirm_password = Some("Passwords do not match".to_string());
    }
}

async fn check_uniqueness(
    state: &AppState,
    username: &str,
    email: &str,
    errors: &mut RegisterErrors,
) -> AppResult<()> {
    if errors.username.is_none()
        && user_service::username_taken(state.store.as_ref(), username).await?
    {
        errors.username =
            Some("Username already exists. Please choose a different username.".to_string());
    }
    if errors.email.is_none() && user_service::email_taken(state.store.as_ref(), email).await? {
        errors.email =
            Some("Email already registered. Please use a different email address.".to_string());
    }
    Ok(())
}

fn render<T: Template>(template: T) -> AppResult<axum::response::Response> {
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Failed to render registration template: {}", e);
            Err(AppError::InternalServerError)
        }
    }
}

// --- Presiding officer ---

// GET /register/officer
pub async fn show_officer_form() -> AppResult<impl IntoResponse> {
    render(RegisterOfficerPage {
        form: OfficerRegisterForm::default(),
        errors: RegisterErrors::default(),
    })
}

// POST /register/officer
pub async fn handle_officer_register(
    State(state): State<AppState>,
    Form(form): Form<OfficerRegisterForm>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("Officer registration attempt: {}", form.username);

    let mut errors = RegisterErrors {
        full_name: required(&form.full_name, "Full name"),
        email: validate_email(&form.email),
        phone: validate_phone(&form.phone),
        service_id: required(&form.employee_id, "Employee ID"),
        station: required(&form.polling_station, "Polling station"),
        district: required(&form.district, "District"),
        rank: required(&form.designation, "Designation"),
        username: required(&form.username, "Username"),
        ..RegisterErrors::default()
    };
    validate_password(&form.password, &form.confirm_password, &mut errors);
    check_uniqueness(&state, &form.username, &form.email, &mut errors).await?;

    if !errors.is_empty() {
        tracing::warn!("Officer registration rejected: invalid fields");
        return render(RegisterOfficerPage { form, errors });
    }

    let user = user_service::register_officer(
        state.store.as_ref(),
        OfficerRegistration {
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            employee_id: form.employee_id.trim().to_string(),
            polling_station: form.polling_station.trim().to_string(),
            polling_center_id: Some(form.polling_center_id.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            district: form.district.trim().to_string(),
            thana: Some(form.thana.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            designation: form.designation.trim().to_string(),
            username: form.username.trim().to_string(),
            password: form.password,
            nid_document: None,
        },
    )
    .await?;

    tracing::info!("✅ Officer registration stored as {} (pending)", user.id);
    Ok(Redirect::to("/register/success").into_response())
}

// --- Law enforcement ---

// GET /register
pub async fn show_police_form() -> AppResult<impl IntoResponse> {
    render(RegisterPolicePage {
        form: PoliceRegisterForm::default(),
        errors: RegisterErrors::default(),
    })
}

// POST /register
pub async fn handle_police_register(
    State(state): State<AppState>,
    Form(form): Form<PoliceRegisterForm>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("Police registration attempt: {}", form.username);

    let mut errors = RegisterErrors {
        full_name: required(&form.full_name, "Full name"),
        email: validate_email(&form.email),
        phone: validate_phone(&form.phone),
        service_id: required(&form.service_id, "Service ID"),
        station: required(&form.posted_station, "Posted station"),
        district: required(&form.district, "District"),
        rank: required(&form.rank, "Rank"),
        username: required(&form.username, "Username"),
        ..RegisterErrors::default()
    };
    validate_password(&form.password, &form.confirm_password, &mut errors);
    check_uniqueness(&state, &form.username, &form.email, &mut errors).await?;

    if !errors.is_empty() {
        tracing::warn!("Police registration rejected: invalid fields");
        return render(RegisterPolicePage { form, errors });
    }

    let user = user_service::register_police(
        state.store.as_ref(),
        PoliceRegistration {
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            service_id: form.service_id.trim().to_string(),
            posted_station: form.posted_station.trim().to_string(),
            district: form.district.trim().to_string(),
            rank: form.rank.trim().to_string(),
            username: form.username.trim().to_string(),
            password: form.password,
        },
    )
    .await?;

    tracing::info!("✅ Police registration stored as {} (pending)", user.id);
    Ok(Redirect::to("/register/success").into_response())
}

// GET /register/success
pub async fn show_success() -> AppResult<impl IntoResponse> {
    render(RegisterSuccessPage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_checks_mirror_the_itemized_rules() {
        assert!(validate_email("").is_some());
        assert!(validate_email("plainaddress").is_some());
        assert!(validate_email("a..b@mail.com").is_some());
        assert!(validate_email(".lead@mail.com").is_some());
        assert!(validate_email("user@.mail.com").is_some());
        assert!(validate_email("@mail.com").is_some());
        assert!(validate_email("user@mailcom").is_some());
        assert!(validate_email("_user@mail.com").is_some());
        assert!(validate_email("a@b@mail.com").is_some());
        assert!(validate_email("user123@gmail.com").is_none());
        assert!(validate_email("first.last-x_1@sub.example.org").is_none());
    }

    #[test]
    fn phone_requires_eleven_digits_and_known_prefix() {
        assert!(validate_phone("").is_some());
        assert!(validate_phone("0171234567").is_some()); // 10 digits
        assert!(validate_phone("01212345678").is_some()); // bad prefix
        assert!(validate_phone("01712345678").is_none());
        assert!(validate_phone("017-1234-5678").is_none()); // separators stripped
    }

    #[test]
    fn password_rules() {
        let mut errors = RegisterErrors::default();
        validate_password("short", "short", &mut errors);
        assert!(errors.password.is_some());

        let mut errors = RegisterErrors::default();
        validate_password("longenough", "different", &mut errors);
        assert!(errors.password.is_none());
        assert!(errors.confirm_password.is_some());

        let mut errors = RegisterErrors::default();
        validate_password("longenough", "longenough", &mut errors);
        assert!(errors.is_empty());
    }
}
