use anyhow::Result;

use charisma_application::ConversationIndex;
use charisma_core::party::Party;

use super::utils::format_time;

pub async fn list(index: &ConversationIndex) -> Result<()> {
    let me = index.resolve_self().await?;
    let parties = index.list_known_parties().await?;

    for party in parties.iter().filter(|p| p.id != me.id) {
        let presence = if party.presence.online {
            "online".to_string()
        } else if party.presence.last_active_at > 0 {
            format!("last seen {}", format_time(party.presence.last_active_at))
        } else {
            "offline".to_string()
        };
        println!(
            "{:<24} {:<14} {:<24} {}",
            party.id, party.handle, party.display_name, presence
        );
    }
    Ok(())
}

pub async fn add(
    index: &ConversationIndex,
    id: String,
    display_name: String,
    handle: String,
) -> Result<()> {
    index
        .upsert_party(Party::new(id.clone(), display_name, handle))
        .await?;
    println!("Registered {}", id);
    Ok(())
}

pub async fn hide(index: &ConversationIndex, id: &str) -> Result<()> {
    index.hide_party(id).await?;
    println!("Hid {}", id);
    Ok(())
}
