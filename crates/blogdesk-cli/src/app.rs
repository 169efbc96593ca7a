//! Application state for the blogdesk CLI.
//!
//! `App` wires the core together the way the browser shell does: load the
//! config, open the credential store, restore the session, then answer one
//! command against it.

use std::io::{self, Write};

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use blogdesk_core::auth::gate::AFTER_LOGIN_PATH;
use blogdesk_core::auth::{self, AuthError, GateDecision, Navigation, OwnershipRef};
use blogdesk_core::{ApiClient, Config, SessionManager};

/// Maximum length for typed input.
/// 254 characters covers any valid email address.
const MAX_INPUT_LENGTH: usize = 254;

pub struct App {
    pub config: Config,
    pub session: SessionManager,
}

impl App {
    /// Create the application and restore any saved session
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        let base_url = config.api_base_url();
        debug!(base_url = %base_url, backend = ?config.credential_backend, "Config loaded");

        let store = auth::open_store(config.credential_backend, &config.data_dir()?)?;
        let api = ApiClient::new(base_url)?;
        let session = SessionManager::new(store, Box::new(api));

        let snapshot = session.initialize();
        debug!(authenticated = snapshot.is_authenticated(), "Session restored");

        Ok(Self { config, session })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Interactive login
    pub async fn login_interactive(&mut self, username: Option<String>) -> Result<()> {
        let username = match username {
            Some(username) => username,
            None => self.prompt_username()?,
        };
        let password = rpassword::prompt_password("Password: ")?;

        println!("Signing in...");
        let result = self.session.login(&username, &password).await;
        let user = Self::report(result)?;

        self.remember_username(&user.username);
        println!("Signed in as {}. Continue at {}", user.display_name(), AFTER_LOGIN_PATH);
        Ok(())
    }

    /// Interactive registration; signs in on success
    pub async fn register_interactive(
        &mut self,
        username: Option<String>,
        email: Option<String>,
    ) -> Result<()> {
        let username = match username {
            Some(username) => username,
            None => prompt("Username: ")?,
        };
        let email = match email {
            Some(email) => email,
            None => prompt("Email: ")?,
        };
        let password = rpassword::prompt_password("Password: ")?;

        println!("Creating account...");
        let result = self.session.register(&username, &email, &password).await;
        let user = Self::report(result)?;

        self.remember_username(&user.username);
        println!("Account created. Signed in as {}.", user.display_name());
        Ok(())
    }

    pub fn logout(&self) {
        self.session.logout();
        println!("Signed out.");
    }

    /// Print the user-facing message for a failed auth call
    fn report<T>(result: Result<T, AuthError>) -> Result<T> {
        result.map_err(|e| {
            debug!(kind = ?e.kind(), error = %e, "Authentication failed");
            anyhow!(e.user_message())
        })
    }

    fn prompt_username(&self) -> Result<String> {
        match self.config.last_username {
            Some(ref last_user) => {
                let input = prompt(&format!("Username [{}]: ", last_user))?;
                if input.is_empty() {
                    Ok(last_user.clone())
                } else {
                    Ok(input)
                }
            }
            None => prompt("Username: "),
        }
    }

    fn remember_username(&mut self, username: &str) {
        if self.config.last_username.as_deref() == Some(username) {
            return;
        }
        self.config.last_username = Some(username.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn print_status(&self) {
        let snapshot = self.session.snapshot();
        match snapshot.user() {
            Some(user) => {
                let roles: Vec<&str> = user.roles.iter().map(String::as_str).collect();
                println!("Signed in as {} (id {})", user.display_name(), user.id);
                if let Some(ref email) = user.email {
                    println!("  email: {}", email);
                }
                println!("  roles: {}", if roles.is_empty() { "-".to_string() } else { roles.join(", ") });
            }
            None => println!("Not signed in."),
        }
    }

    /// Evaluate a navigation target. Returns whether the view would render.
    pub fn open(&self, path: &str) -> bool {
        let snapshot = self.session.snapshot();
        match auth::navigate(path, &snapshot) {
            Navigation::Render(route) => {
                info!(?route, "Navigation allowed");
                println!("{}: allowed ({:?})", path, route);
                true
            }
            Navigation::Pending => {
                println!("{}: waiting for session", path);
                false
            }
            Navigation::Redirect(to) => {
                println!("{}: redirect to {}", path, to);
                false
            }
        }
    }

    /// Check edit/delete permission for a resource by its author id.
    pub fn can_edit(&self, author_id: i64) -> bool {
        let snapshot = self.session.snapshot();
        if let GateDecision::Deny { redirect_to } = auth::can_enter(&snapshot) {
            println!("Not signed in; sign in at {}", redirect_to);
            return false;
        }
        let allowed = auth::can_mutate(snapshot.user(), &OwnershipRef::new(author_id));
        if allowed {
            println!("You may edit and delete resources by author {}.", author_id);
        } else {
            println!("Only author {} or an administrator may edit this.", author_id);
        }
        allowed
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input: String = input.trim().chars().take(MAX_INPUT_LENGTH).collect();
    Ok(input)
}
