//! Startup login: reuse the saved token if the service still accepts it,
//! otherwise ask for credentials until authentication succeeds.

use std::io::{self, BufRead, Write};

use log::{info, warn};

use crate::core::session::SessionStore;
use crate::messaging::{AuthSession, Credentials, MessagingClient, MessagingError};

/// Establish an authenticated session on `client`.
///
/// `prompt` is called with the previous failure (if any) and must return the
/// next credentials to try. A prompt error (e.g. stdin closed) aborts.
pub async fn establish_session<P>(
    client: &dyn MessagingClient,
    store: &SessionStore,
    mut prompt: P,
    fresh_login: bool,
) -> io::Result<AuthSession>
where
    P: FnMut(Option<&MessagingError>) -> io::Result<Credentials>,
{
    if fresh_login {
        info!("Fresh login requested, ignoring saved session");
    } else if let Some(session) = restore(client, store).await {
        return Ok(session);
    }

    let mut last_error: Option<MessagingError> = None;
    loop {
        let credentials = prompt(last_error.as_ref())?;
        match client.authenticate(&credentials).await {
            Ok(session) => {
                info!("Logged in as {}", session.user_id);
                if let Err(e) = store.save(&session) {
                    warn!("Could not save session: {}", e);
                }
                return Ok(session);
            }
            Err(e) => {
                warn!("Login failed: {}", e);
                last_error = Some(e);
            }
        }
    }
}

async fn restore(client: &dyn MessagingClient, store: &SessionStore) -> Option<AuthSession> {
    let saved = match store.load() {
        Ok(Some(saved)) => saved,
        Ok(None) => return None,
        Err(e) => {
            warn!("Ignoring saved session: {}", e);
            return None;
        }
    };

    match client.restore_session(&saved.token()).await {
        Ok(session) => {
            info!("Restored session for {}", session.user_id);
            Some(session)
        }
        Err(e) => {
            warn!("Saved session rejected: {}", e);
            None
        }
    }
}

/// Interactive prompt on the controlling terminal. Runs before the TUI
/// takes over the screen.
pub fn prompt_on_terminal(previous: Option<&MessagingError>) -> io::Result<Credentials> {
    if let Some(e) = previous {
        eprintln!("Login failed: {e}");
    }

    print!("Email: ");
    io::stdout().flush()?;
    let mut email = String::new();
    if io::stdin().lock().read_line(&mut email)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }
    let password = rpassword::prompt_password("Password: ")?;

    Ok(Credentials {
        email: email.trim().to_string(),
        password,
    })
}
