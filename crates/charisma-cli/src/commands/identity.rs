use anyhow::Result;

use charisma_application::ConversationIndex;

use super::utils::format_time;

pub async fn whoami(index: &ConversationIndex) -> Result<()> {
    index.resolve_self().await?;
    let profile = index.self_profile().await?;

    println!("id:      {}", profile.id);
    println!("handle:  {}", profile.handle);
    println!("name:    {}", profile.display_name);
    println!("joined:  {}", format_time(profile.joined_at));
    Ok(())
}

pub async fn rename(index: &ConversationIndex, display_name: &str) -> Result<()> {
    let profile = index.update_self_profile(display_name).await?;
    println!("Display name set to '{}'", profile.display_name);
    Ok(())
}
