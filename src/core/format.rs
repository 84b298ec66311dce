//! Turns service messages into the single log line a tab shows.

use crate::messaging::{Attachment, Message};

/// A message already resolved to display text, ready for a tab's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub id: String,
    pub text: String,
}

impl RenderedMessage {
    pub fn new(message: &Message, author: &str) -> Self {
        Self {
            id: message.id.clone(),
            text: describe_message(author, message),
        }
    }
}

/// `"<author>: <body>"`. Text wins over stickers, stickers over attachments;
/// only the first attachment is described.
pub fn describe_message(author: &str, message: &Message) -> String {
    if let Some(text) = message.text.as_deref()
        && !text.is_empty()
    {
        return format!("{author}: {text}");
    }
    if let Some(sticker) = &message.sticker {
        return format!("{author}: [Sticker]: {}", sticker.url);
    }
    let body = match message.attachments.first() {
        None => "[Unhandled Message]".to_string(),
        Some(Attachment::Image { url }) => format!("[Image Attachment]: {url}"),
        Some(Attachment::Video) => "[Video Attachment]".to_string(),
        Some(Attachment::Other) => "[Unhandled Attachment]".to_string(),
    };
    format!("{author}: {body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::Sticker;

    fn bare(id: &str) -> Message {
        Message {
            id: id.into(),
            author_id: "u1".into(),
            text: None,
            sticker: None,
            attachments: Vec::new(),
            is_read: true,
        }
    }

    #[test]
    fn text_message() {
        let message = Message {
            text: Some("hi there".into()),
            ..bare("m1")
        };
        assert_eq!(describe_message("Alice", &message), "Alice: hi there");
    }

    #[test]
    fn sticker_message() {
        let message = Message {
            sticker: Some(Sticker {
                url: "http://s/1".into(),
            }),
            ..bare("m2")
        };
        assert_eq!(
            describe_message("Bob", &message),
            "Bob: [Sticker]: http://s/1"
        );
    }

    #[test]
    fn attachments() {
        let image = Message {
            attachments: vec![Attachment::Image {
                url: "http://i/1.png".into(),
            }],
            ..bare("m3")
        };
        assert_eq!(
            describe_message("Bob", &image),
            "Bob: [Image Attachment]: http://i/1.png"
        );

        let video = Message {
            attachments: vec![Attachment::Video, Attachment::Other],
            ..bare("m4")
        };
        assert_eq!(describe_message("Bob", &video), "Bob: [Video Attachment]");

        let other = Message {
            attachments: vec![Attachment::Other],
            ..bare("m5")
        };
        assert_eq!(describe_message("Bob", &other), "Bob: [Unhandled Attachment]");
    }

    #[test]
    fn empty_message_is_unhandled() {
        let message = Message {
            text: Some(String::new()),
            ..bare("m6")
        };
        assert_eq!(describe_message("Eve", &message), "Eve: [Unhandled Message]");
    }

    #[test]
    fn rendered_message_keeps_the_id() {
        let message = Message {
            text: Some("yo".into()),
            ..bare("m7")
        };
        let rendered = RenderedMessage::new(&message, "Al");
        assert_eq!(rendered.id, "m7");
        assert_eq!(rendered.text, "Al: yo");
    }
}
