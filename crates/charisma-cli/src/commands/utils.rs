use charisma_core::Timestamp;
use charisma_core::message::Message;

/// Formats epoch milliseconds as a UTC timestamp.
pub fn format_time(millis: Timestamp) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

pub fn print_message(message: &Message, self_id: &str) {
    let direction = if message.from_party == self_id {
        "->"
    } else {
        "<-"
    };
    let marker = if message.is_acknowledged || message.from_party == self_id {
        " "
    } else {
        "*"
    };
    println!(
        "{} {} {} {} {}",
        marker,
        format_time(message.created_at),
        direction,
        if message.from_party == self_id {
            &message.to_party
        } else {
            &message.from_party
        },
        message.body
    );
}
