use crate::{cli::CliState, error, info, spotify, success, warning};

pub async fn auth(state: CliState) {
    let addr = match state.auth.settings().socket_addr() {
        Ok(addr) => addr,
        Err(e) => error!("Invalid server address: {}", e),
    };

    info!("Opening Spotify login in your browser...");
    match spotify::auth::auth(state, addr).await {
        Ok(()) => success!("Authentication successful."),
        Err(e) => error!("{}", e),
    }
}

pub async fn status(state: CliState) {
    if state.auth.check_status().await {
        success!("Authenticated with Spotify.");
    } else {
        warning!("Not authenticated. Run muralcli auth to connect your account.");
    }
}

pub async fn logout(state: CliState) {
    state.auth.logout().await;
    success!("Logged out.");
}
