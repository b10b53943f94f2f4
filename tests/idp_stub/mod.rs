#![allow(dead_code)]

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine as _;
use serde_json::Value;

/// One account known to the stubbed identity provider.
#[derive(Debug, Clone)]
pub struct IdpStubConfig {
    pub username: String,
    pub password: String,
    pub sub: String,
    pub name: String,
    pub admin: bool,
    pub confirmation_code: String,
    /// Lifetime reported for issued tokens. A short value (below the client's
    /// expiry margin) forces the refresh path on the next session fetch.
    pub expires_in: i64,
}

impl IdpStubConfig {
    pub fn basic(username: &str, password: &str, sub: &str) -> Self {
        Self {
            username: username.to_owned(),
            password: password.to_owned(),
            sub: sub.to_owned(),
            name: "Test Reader".to_owned(),
            admin: false,
            confirmation_code: "123456".to_owned(),
            expires_in: 3600,
        }
    }
}

fn make_id_token(config: &IdpStubConfig) -> String {
    let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"none"}"#);
    let mut payload = serde_json::json!({
        "sub": config.sub,
        "email": config.username,
        "name": config.name,
    });
    if config.admin {
        payload["cognito:groups"] = serde_json::json!(["admin"]);
    }
    let body = engine.encode(payload.to_string().as_bytes());
    format!("{header}.{body}.stub")
}

fn auth_result(config: &IdpStubConfig, include_refresh: bool) -> Value {
    let mut result = serde_json::json!({
        "AuthenticationResult": {
            "IdToken": make_id_token(config),
            "AccessToken": format!("access-{}", config.sub),
            "ExpiresIn": config.expires_in,
            "TokenType": "Bearer",
        }
    });
    if include_refresh {
        result["AuthenticationResult"]["RefreshToken"] =
            Value::String(format!("refresh-{}", config.sub));
    }
    result
}

fn idp_error(kind: &str, message: &str) -> (u16, String) {
    (
        400,
        serde_json::json!({ "__type": kind, "message": message }).to_string(),
    )
}

fn handle(config: &IdpStubConfig, target: &str, body: &Value) -> (u16, String) {
    match target.rsplit('.').next().unwrap_or_default() {
        "InitiateAuth" => {
            let flow = body.pointer("/AuthFlow").and_then(Value::as_str).unwrap_or("");
            match flow {
                "USER_PASSWORD_AUTH" => {
                    let username = body
                        .pointer("/AuthParameters/USERNAME")
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    let password = body
                        .pointer("/AuthParameters/PASSWORD")
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    if username == config.username && password == config.password {
                        (200, auth_result(config, true).to_string())
                    } else {
                        idp_error("NotAuthorizedException", "Incorrect username or password.")
                    }
                }
                "REFRESH_TOKEN_AUTH" => {
                    let token = body
                        .pointer("/AuthParameters/REFRESH_TOKEN")
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    if token == format!("refresh-{}", config.sub) {
                        // Refresh responses carry no new refresh token.
                        (200, auth_result(config, false).to_string())
                    } else {
                        idp_error("NotAuthorizedException", "Invalid Refresh Token.")
                    }
                }
                other => idp_error("InvalidParameterException", other),
            }
        }
        "SignUp" => (200, serde_json::json!({ "UserConfirmed": false }).to_string()),
        "ConfirmSignUp" => {
            let code = body
                .pointer("/ConfirmationCode")
                .and_then(Value::as_str)
                .unwrap_or("");
            if code == config.confirmation_code {
                (200, "{}".to_owned())
            } else {
                idp_error("CodeMismatchException", "Invalid verification code.")
            }
        }
        "GlobalSignOut" => (200, "{}".to_owned()),
        "GetUser" => {
            let token = body.pointer("/AccessToken").and_then(Value::as_str).unwrap_or("");
            if token != format!("access-{}", config.sub) {
                return idp_error("NotAuthorizedException", "Invalid Access Token.");
            }
            (
                200,
                serde_json::json!({
                    "Username": config.username,
                    "UserAttributes": [
                        { "Name": "sub", "Value": config.sub },
                        { "Name": "email", "Value": config.username },
                        { "Name": "name", "Value": config.name },
                    ]
                })
                .to_string(),
            )
        }
        other => idp_error("UnknownOperationException", other),
    }
}

/// In-process stand-in for the Cognito user-pool endpoint.
pub struct IdpStub {
    pub base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl IdpStub {
    pub fn spawn(config: IdpStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start idp stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let target = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("X-Amz-Target"))
                    .map(|h| h.value.as_str().to_owned())
                    .unwrap_or_default();

                let mut raw = String::new();
                let _ = request.as_reader().read_to_string(&mut raw);
                let body: Value = serde_json::from_str(&raw).unwrap_or(Value::Null);

                let (status, response_body) = handle(&config, &target, &body);
                let response =
                    tiny_http::Response::from_string(response_body).with_status_code(status);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for IdpStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
