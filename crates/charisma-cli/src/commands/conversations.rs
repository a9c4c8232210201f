use anyhow::Result;

use charisma_application::ConversationIndex;

use super::utils::format_time;

pub async fn list(index: &ConversationIndex) -> Result<()> {
    let me = index.resolve_self().await?;
    let views = index.list_conversations(&me.id).await;
    if views.is_empty() {
        println!("No conversations");
        return Ok(());
    }

    for view in views {
        let name = index
            .get_party(&view.counterparty)
            .await?
            .map(|p| p.display_name)
            .unwrap_or_else(|| view.counterparty.clone());
        let unread = if view.unread_count > 0 {
            format!("({})", view.unread_count)
        } else {
            String::new()
        };
        println!(
            "{:<24} {:>5} {}  {}",
            name,
            unread,
            format_time(view.updated_at),
            view.last_message.body
        );
    }
    Ok(())
}

pub async fn unread(index: &ConversationIndex) -> Result<()> {
    let me = index.resolve_self().await?;
    println!("{}", index.total_unread(&me.id).await);
    Ok(())
}

pub async fn rebuild(index: &ConversationIndex) -> Result<()> {
    index.rebuild_projection().await?;
    println!("Conversations rebuilt");
    Ok(())
}

pub async fn verify(index: &ConversationIndex) -> Result<()> {
    if index.verify_projection().await? {
        println!("Conversations are consistent with the message log");
        Ok(())
    } else {
        anyhow::bail!("Conversations diverge from the message log; run `charisma rebuild`")
    }
}
