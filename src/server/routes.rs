use chrono::Utc;

use crate::server::api;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nDate: {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            Utc::now().to_rfc2822(),
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub fn route_request(method: &str, path: &str, body: &str) -> HttpResponse {
    match (method, path) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/rulesets") => match api::rulesets_payload() {
            Ok(payload) => json_ok(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("POST", "/api/roll") => match api::roll_payload(body) {
            Ok(payload) => json_ok(payload),
            Err(api::RollPayloadError::Parse(err)) => {
                error_response(400, "Bad Request", &format!("Invalid request body: {err}"))
            }
            Err(api::RollPayloadError::Validation(issues)) => {
                error_response(400, "Bad Request", &issues.join("; "))
            }
        },
        _ => error_response(404, "Not Found", "unknown route"),
    }
}

fn json_ok(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body,
    }
}

fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    let body = serde_json::json!({
        "status": "error",
        "message": message,
    });
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: body.to_string(),
    }
}

fn index_html() -> String {
    "<!doctype html>\n<html>\n<head><title>mathhammer</title></head>\n<body>\n\
     <h1>mathhammer</h1>\n\
     <p>Exact attack-resolution distributions.</p>\n\
     <ul>\n\
     <li><code>GET /api/health</code></li>\n\
     <li><code>GET /api/rulesets</code></li>\n\
     <li><code>POST /api/roll</code> &mdash; JSON body with <code>ruleset</code> plus roll fields</li>\n\
     </ul>\n\
     </body>\n</html>\n"
        .to_string()
}
