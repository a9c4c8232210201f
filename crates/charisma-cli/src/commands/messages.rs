use anyhow::Result;

use charisma_application::ConversationIndex;

use super::utils::print_message;

pub async fn send(index: &ConversationIndex, to: &str, body: &str) -> Result<()> {
    let message = index.send(to, body).await?;
    println!("Sent {}", message.id);
    Ok(())
}

pub async fn open(index: &ConversationIndex, counterparty: &str) -> Result<()> {
    let me = index.resolve_self().await?;
    for message in index.open_conversation(&me.id, counterparty).await? {
        print_message(&message, &me.id);
    }
    Ok(())
}

pub async fn history(index: &ConversationIndex, counterparty: &str) -> Result<()> {
    let me = index.resolve_self().await?;
    for message in index.list_between(&me.id, counterparty).await {
        print_message(&message, &me.id);
    }
    Ok(())
}

pub async fn read(index: &ConversationIndex, counterparty: &str) -> Result<()> {
    let me = index.resolve_self().await?;
    let count = index.mark_conversation_read(&me.id, counterparty).await?;
    println!("Marked {} messages read", count);
    Ok(())
}

pub async fn delete(index: &ConversationIndex, counterparty: &str) -> Result<()> {
    let me = index.resolve_self().await?;
    let removed = index.delete_conversation(&me.id, counterparty).await?;
    println!("Deleted {} messages", removed);
    Ok(())
}
