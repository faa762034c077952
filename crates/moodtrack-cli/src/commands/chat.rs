use crate::commands::Client;
use crate::error::CliError;

pub async fn run_send(client: &Client, message_parts: &[String]) -> Result<(), CliError> {
    let message = message_parts.join(" ");
    if message.trim().is_empty() {
        return Err(CliError::EmptyMessage);
    }

    let thread_id = client.session().ensure_thread_id().await?;
    let reply = client.api().send_chat_message(&message, &thread_id).await?;
    println!("{}", reply.reply);
    Ok(())
}

pub async fn run_prompt(client: &Client) -> Result<(), CliError> {
    // Read path: a missing prompt is not worth a hard failure.
    match client.api().prompt_of_day().await {
        Ok(prompt) => println!("{}", prompt.text),
        Err(error) => {
            tracing::warn!("prompt fetch failed: {error}");
            println!("No prompt available right now.");
        }
    }
    Ok(())
}
