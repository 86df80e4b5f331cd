/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 4/9/24
 ******************************************************************************/
use anyhow::Result;
use assistant_client::application::models::chat::ChatRequest;
use assistant_client::application::services::account_service::{
    AccountService, AccountServiceImpl,
};
use assistant_client::application::services::chat_service::{ChatService, ChatServiceImpl};
use assistant_client::config::Config;
use assistant_client::session::session::Session;
use assistant_client::utils::logger::setup_logger;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger();

    // Load the configuration
    let config = Config::new();
    let session = Arc::new(Session::from_config(config.clone())?);

    if !session.is_authenticated() {
        match session
            .login(&config.credentials.username, &config.credentials.password)
            .await
        {
            Ok(profile) => println!("Logged in as {}", profile),
            Err(e) => {
                let reason = e.backend_message().unwrap_or_else(|| e.to_string());
                eprintln!("Login failed: {}", reason);
                return Ok(());
            }
        }
    }

    let account = AccountServiceImpl::new(session.clone());
    let chat = ChatServiceImpl::new(session.clone());

    let profile = account.profile().await?;
    println!(
        "Tier: {}, provider: {}",
        profile.subscription_tier,
        profile.provider_info().name
    );

    let request = ChatRequest::new(
        "Explain borrowing in one paragraph",
        "programming",
        "beginner",
        profile.provider(),
    );
    match chat.send_message(&request).await {
        Ok(reply) => println!("{}", reply.text().unwrap_or("(no answer)")),
        Err(e) if e.requires_login() => eprintln!("Session expired, log in again"),
        Err(e) => eprintln!("Chat failed: {}", e),
    }

    Ok(())
}
