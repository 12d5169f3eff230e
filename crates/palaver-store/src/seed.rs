//! Startup data handed to [`ConversationStore::new`](crate::ConversationStore::new).
//!
//! The store treats a seed as read-only input. [`Seed::demo`] builds the fixed
//! directory used by the demo binary and most tests.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use palaver_shared::{CommunityId, ConversationId, DeliveryStatus, MessageId, UserId};

use crate::models::{Community, Conversation, Message, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    /// The distinguished "self" identity.
    pub me: User,
    /// Everyone else the session knows about, in display order.
    pub contacts: Vec<User>,
    pub conversations: Vec<Conversation>,
    pub communities: Vec<Community>,
}

fn contact(
    id: &str,
    name: &str,
    avatar: &str,
    status: &str,
    last_seen: &str,
    online: bool,
    phone: &str,
) -> User {
    User {
        id: UserId::from(id),
        name: name.to_string(),
        avatar: avatar.to_string(),
        status: Some(status.to_string()),
        last_seen: Some(last_seen.to_string()),
        is_online: Some(online),
        phone_number: Some(phone.to_string()),
    }
}

fn read(id: String, sender: &UserId, text: &str, at: DateTime<Utc>) -> Message {
    Message::text(MessageId(id), sender.clone(), text, at, DeliveryStatus::Read)
}

fn direct_history(me: &UserId, other: &UserId, now: DateTime<Utc>) -> Vec<Message> {
    let yesterday = now - Duration::days(1);
    let hour_ago = now - Duration::hours(1);
    let half_hour_ago = now - Duration::minutes(30);
    let mine = |n: u32| format!("msg-{me}-{other}-{n}");
    let theirs = |n: u32| format!("msg-{other}-{me}-{n}");

    let mut history = vec![
        read(mine(1), me, "Hey, how are you?", yesterday),
        read(
            theirs(1),
            other,
            "I'm doing well, thanks for asking! How about you?",
            yesterday,
        ),
        read(
            mine(2),
            me,
            "I'm good too. Just working on some projects.",
            yesterday,
        ),
        read(
            theirs(2),
            other,
            "That sounds interesting! What kind of projects are you working on?",
            hour_ago,
        ),
        read(
            mine(3),
            me,
            "I'm building a chat client in Rust. It's coming along nicely!",
            hour_ago,
        ),
        read(
            theirs(3),
            other,
            "That's awesome! I'd love to see it when you're done.",
            half_hour_ago,
        ),
    ];
    history.push(Message::text(
        MessageId(mine(4)),
        me.clone(),
        "Sure thing! I'll send you a link once it's ready.",
        now,
        DeliveryStatus::Delivered,
    ));
    history
}

fn group_history(group: &str, me: &UserId, members: &[User], now: DateTime<Utc>) -> Vec<Message> {
    let yesterday = now - Duration::days(1);
    let hour_ago = now - Duration::hours(1);
    let id = |n: u32| format!("msg-group-{group}-{n}");

    let mut history = vec![
        read(id(1), &members[0].id, "Hey everyone! How's it going?", yesterday),
        read(id(2), &members[1].id, "I'm good, thanks for asking!", yesterday),
        read(id(3), me, "What's everyone up to today?", hour_ago),
        read(
            id(4),
            &members[2].id,
            "Just working on some projects. How about you?",
            hour_ago,
        ),
    ];
    history.push(Message::text(
        MessageId(id(5)),
        me.clone(),
        "I'm building a chat client in Rust!",
        now,
        DeliveryStatus::Delivered,
    ));
    history
}

impl Seed {
    /// The demo directory: six contacts with a direct chat each, two groups
    /// and one community holding both groups. Timestamps are relative to `now`.
    pub fn demo(now: DateTime<Utc>) -> Self {
        let me = User {
            id: UserId::from("user-1"),
            name: "John Doe".to_string(),
            avatar: "https://randomuser.me/api/portraits/men/32.jpg".to_string(),
            status: Some("Available".to_string()),
            last_seen: None,
            is_online: Some(true),
            phone_number: Some("+1 234 567 890".to_string()),
        };

        let contacts = vec![
            contact(
                "user-2",
                "Sarah Johnson",
                "https://randomuser.me/api/portraits/women/44.jpg",
                "At work",
                "Today at 10:30 AM",
                true,
                "+1 234 567 891",
            ),
            contact(
                "user-3",
                "Mike Taylor",
                "https://randomuser.me/api/portraits/men/86.jpg",
                "At the gym",
                "Today at 9:15 AM",
                false,
                "+1 234 567 892",
            ),
            contact(
                "user-4",
                "Emily Wilson",
                "https://randomuser.me/api/portraits/women/17.jpg",
                "Busy",
                "Yesterday at 7:22 PM",
                false,
                "+1 234 567 893",
            ),
            contact(
                "user-5",
                "David Brown",
                "https://randomuser.me/api/portraits/men/61.jpg",
                "Hey there! I'm using Palaver",
                "Today at 11:45 AM",
                true,
                "+1 234 567 894",
            ),
            contact(
                "user-6",
                "Jessica Lee",
                "https://randomuser.me/api/portraits/women/90.jpg",
                "On vacation until June 15",
                "Yesterday at 5:30 PM",
                false,
                "+1 234 567 895",
            ),
            contact(
                "user-7",
                "Daniel White",
                "https://randomuser.me/api/portraits/men/29.jpg",
                "Can't talk right now",
                "Today at 8:05 AM",
                true,
                "+1 234 567 896",
            ),
        ];

        let mut conversations: Vec<Conversation> = contacts
            .iter()
            .enumerate()
            .map(|(i, other)| {
                let mut chat = Conversation::direct(
                    ConversationId(format!("chat-{}", other.id)),
                    vec![me.clone(), other.clone()],
                    now,
                );
                chat.messages = direct_history(&me.id, &other.id, now);
                chat.unread_count = (i as u32 * 2) % 3;
                chat
            })
            .collect();

        let groups = [
            (
                "group-1",
                "Family Group",
                "https://randomuser.me/api/portraits/men/11.jpg",
            ),
            (
                "group-2",
                "Work Team",
                "https://randomuser.me/api/portraits/women/5.jpg",
            ),
        ];
        let members = &contacts[..3];
        for (i, (id, name, avatar)) in groups.iter().enumerate() {
            let mut participants = vec![me.clone()];
            participants.extend(members.iter().cloned());

            let mut chat = Conversation::group(
                ConversationId(format!("chat-{id}")),
                *name,
                *avatar,
                participants,
                now,
            );
            chat.messages = group_history(id, &me.id, members, now);
            chat.unread_count = i as u32 + 1;
            conversations.push(chat);
        }

        let communities = vec![Community {
            id: CommunityId::from("community-1"),
            name: "Maple Street".to_string(),
            avatar: "https://randomuser.me/api/portraits/lego/1.jpg".to_string(),
            description: Some("Family and work, in one place".to_string()),
            created_by: me.id.clone(),
            admins: vec![me.id.clone()],
            groups: vec![
                ConversationId::from("chat-group-1"),
                ConversationId::from("chat-group-2"),
            ],
            announcements: vec![read(
                "msg-community-1-1".to_string(),
                &me.id,
                "Welcome to the community!",
                now - Duration::days(2),
            )],
            created_at: now - Duration::days(30),
        }];

        Self {
            me,
            contacts,
            conversations,
            communities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_seed_shape() {
        let seed = Seed::demo(Utc::now());
        assert_eq!(seed.contacts.len(), 6);
        assert_eq!(seed.conversations.len(), 8);
        assert_eq!(seed.conversations.iter().filter(|c| c.is_group).count(), 2);

        for chat in &seed.conversations {
            assert!(chat.has_participant(&seed.me.id));
            assert!(chat.typing_users.is_empty());
            assert!(!chat.messages.is_empty());
        }
    }

    #[test]
    fn test_demo_seed_last_message_is_delivered() {
        let seed = Seed::demo(Utc::now());
        for chat in &seed.conversations {
            let last = chat.messages.last().unwrap();
            assert_eq!(last.status, DeliveryStatus::Delivered);
            assert_eq!(last.sender_id, seed.me.id);
        }
    }
}
