//! Direct chat between users and the admin

use std::collections::HashSet;

use super::database::Database;
use super::models::{ChatMessage, User};
use crate::{CHAT_MESSAGES_KEY, MAX_CHAT_MESSAGES};

impl Database {
    /// Get every stored message in insertion order
    pub fn all_messages(&self) -> Vec<ChatMessage> {
        self.store.get(CHAT_MESSAGES_KEY, Vec::new())
    }

    /// Append a message, evicting the oldest once the history exceeds
    /// [`MAX_CHAT_MESSAGES`] entries
    pub fn save_message(&self, message: &ChatMessage) {
        self.store
            .update(CHAT_MESSAGES_KEY, Vec::new(), |messages: &mut Vec<ChatMessage>| {
                messages.push(message.clone());
                if messages.len() > MAX_CHAT_MESSAGES {
                    messages.remove(0);
                }
            });
    }

    /// Get the conversation between two accounts, oldest first.
    ///
    /// Direction does not matter, both halves of the exchange are
    /// included.
    pub fn conversation(&self, user_id1: &str, user_id2: &str) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = self
            .all_messages()
            .into_iter()
            .filter(|m| {
                (m.sender_id == user_id1 && m.receiver_id == user_id2)
                    || (m.sender_id == user_id2 && m.receiver_id == user_id1)
            })
            .collect();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        messages
    }

    /// Accounts that have exchanged at least one message with the admin
    pub fn chat_users(&self, admin_id: &str) -> Vec<User> {
        let mut correspondent_ids = HashSet::new();
        for message in self.all_messages() {
            if message.sender_id == admin_id {
                correspondent_ids.insert(message.receiver_id);
            } else if message.receiver_id == admin_id {
                correspondent_ids.insert(message.sender_id);
            }
        }

        self.users()
            .into_iter()
            .filter(|u| correspondent_ids.contains(&u.id))
            .collect()
    }

    /// Count unread messages for a receiver, optionally from one
    /// sender only
    pub fn unread_count(&self, receiver_id: &str, sender_id: Option<&str>) -> usize {
        self.all_messages()
            .iter()
            .filter(|m| {
                m.receiver_id == receiver_id
                    && !m.read
                    && sender_id.is_none_or(|sender| m.sender_id == sender)
            })
            .count()
    }

    /// Mark every message from one sender to one receiver as read
    pub fn mark_as_read(&self, receiver_id: &str, sender_id: &str) {
        self.store
            .update(CHAT_MESSAGES_KEY, Vec::new(), |messages: &mut Vec<ChatMessage>| {
                for message in messages.iter_mut() {
                    if message.receiver_id == receiver_id
                        && message.sender_id == sender_id
                        && !message.read
                    {
                        message.read = true;
                    }
                }
            });
    }

    /// Drop the whole conversation between two accounts
    pub fn delete_conversation(&self, user_id1: &str, user_id2: &str) {
        self.store
            .update(CHAT_MESSAGES_KEY, Vec::new(), |messages: &mut Vec<ChatMessage>| {
                messages.retain(|m| {
                    !((m.sender_id == user_id1 && m.receiver_id == user_id2)
                        || (m.sender_id == user_id2 && m.receiver_id == user_id1))
                });
            });
    }
}
