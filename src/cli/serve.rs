use crate::{cli::CliState, error, server};

pub async fn serve(state: CliState) {
    let addr = match state.auth.settings().socket_addr() {
        Ok(addr) => addr,
        Err(e) => error!("Invalid server address: {}", e),
    };

    if let Err(e) = server::start_api_server(state, addr).await {
        error!("Server stopped: {}", e);
    }
}
