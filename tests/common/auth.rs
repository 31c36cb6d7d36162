use super::app::TestApp;

pub fn admin_headers(app: &TestApp) -> Vec<(&'static str, String)> {
    vec![
        ("authorization", format!("Bearer {}", app.config.admin_token)),
        ("x-admin-name", "quizmaster".to_string()),
    ]
}

pub fn user_headers(user_id: &str) -> Vec<(&'static str, String)> {
    vec![("x-user-id", user_id.to_string())]
}
