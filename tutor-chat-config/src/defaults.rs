//! Default values for `Config` fields.

pub fn api_url() -> String {
    "http://localhost:8000".to_string()
}

pub fn app_name() -> String {
    "tutor_agent".to_string()
}

pub fn user_id() -> String {
    "u_123".to_string()
}

pub fn request_timeout_secs() -> u64 {
    120
}
