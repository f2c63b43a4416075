//! Invocation context and the narrow collaborator interfaces.
//!
//! The engine never talks to a transport or a data store directly. A
//! [`Context`] carries the authenticated author, the originating channel,
//! and two capability handles: a [`Directory`] for looking up known
//! entities and a [`Responder`] for delivering response text. The resolver
//! and converters pass the context through unchanged.

use std::sync::{Arc, Mutex};

use bitflags::bitflags;

bitflags! {
    /// Permission set attached to members and to the bot itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat_command_engine::Permissions;
    ///
    /// let perms = Permissions::KICK_MEMBERS | Permissions::BAN_MEMBERS;
    /// assert!(perms.contains(Permissions::KICK_MEMBERS));
    /// assert!(!perms.contains(Permissions::ADMINISTRATOR));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Permissions: u32 {
        const ADD_REACTIONS = 1 << 0;
        const EXTERNAL_EMOJIS = 1 << 1;
        const MANAGE_MESSAGES = 1 << 2;
        const MANAGE_CHANNELS = 1 << 3;
        const KICK_MEMBERS = 1 << 4;
        const BAN_MEMBERS = 1 << 5;
        const MANAGE_GUILD = 1 << 6;
        const ADMINISTRATOR = 1 << 7;
    }
}

impl Permissions {
    /// Human-readable names of the set bits, lower-cased with spaces
    /// (e.g. "kick members, ban members"). Used in check failure messages.
    pub fn describe(self) -> String {
        self.iter_names()
            .map(|(name, _)| name.to_lowercase().replace('_', " "))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A known member of the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub permissions: Permissions,
    pub is_owner: bool,
    pub is_admin: bool,
}

impl Member {
    /// Creates a member with no permissions or special status.
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            permissions: Permissions::empty(),
            is_owner: false,
            is_admin: false,
        }
    }

    /// Sets the member's permissions.
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }
}

/// Kind of the originating conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// One-on-one conversation with the bot.
    Direct,
    /// Channel inside a guild.
    Guild,
}

/// A known channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: u64,
    pub name: String,
    pub kind: ChannelKind,
}

impl Channel {
    pub fn new(id: u64, name: &str, kind: ChannelKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
        }
    }
}

/// A known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: u64,
    pub name: String,
}

impl Role {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// How an entity converter identifies what it is looking for:
/// a numeric identifier (raw digits or mention syntax) or a plain name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityQuery<'a> {
    Id(u64),
    Name(&'a str),
}

/// Lookup of known platform entities.
///
/// Implementations may consult a remote service; the resolver imposes no
/// timeout, so bounded-latency lookups must enforce their own.
pub trait Directory: Send + Sync {
    fn member(&self, query: &EntityQuery<'_>) -> Option<Member>;
    fn channel(&self, query: &EntityQuery<'_>) -> Option<Channel>;
    fn role(&self, query: &EntityQuery<'_>) -> Option<Role>;
}

/// Delivery of response text and the working indicator back to the user.
pub trait Responder: Send {
    /// Delivers a response string to the originating channel.
    fn respond(&mut self, text: &str);

    /// Turns the "bot is working" indicator on or off.
    fn set_working(&mut self, working: bool);
}

/// The capability bag passed through every stage of an invocation.
///
/// Converters and checks receive `&Context`; the dispatcher fills in the
/// matched prefix and qualified command name before resolution starts.
pub struct Context {
    /// The authenticated author of the invocation.
    pub author: Member,
    /// The originating channel.
    pub channel: Channel,
    /// The bot's own permissions in the originating channel.
    pub own_permissions: Permissions,
    /// Prefix that matched this invocation (set by the dispatcher).
    pub prefix: String,
    /// Qualified name of the invoked command (set by the dispatcher).
    pub command: String,
    directory: Arc<dyn Directory>,
    responder: Arc<Mutex<dyn Responder>>,
}

impl Context {
    /// Creates a context for one invocation.
    pub fn new(
        author: Member,
        channel: Channel,
        directory: Arc<dyn Directory>,
        responder: Arc<Mutex<dyn Responder>>,
    ) -> Self {
        Self {
            author,
            channel,
            own_permissions: Permissions::all(),
            prefix: String::new(),
            command: String::new(),
            directory,
            responder,
        }
    }

    /// Sets the bot's own permissions in the originating channel.
    pub fn with_own_permissions(mut self, permissions: Permissions) -> Self {
        self.own_permissions = permissions;
        self
    }

    /// The entity directory.
    pub fn directory(&self) -> &dyn Directory {
        &*self.directory
    }

    /// Delivers a response string to the originating channel.
    pub fn respond(&self, text: &str) {
        if let Ok(mut responder) = self.responder.lock() {
            responder.respond(text);
        }
    }

    /// Sends an approval marker to the current channel.
    pub fn ok(&self) {
        self.respond("\u{2705}");
    }

    /// Turns on the working indicator, returning a guard that is
    /// guaranteed to clear it again when dropped — on success and on
    /// failure alike.
    pub fn working_guard(&self) -> WorkingGuard {
        WorkingGuard::new(Arc::clone(&self.responder))
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("author", &self.author)
            .field("channel", &self.channel)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

/// RAII guard for the working indicator.
pub struct WorkingGuard {
    responder: Arc<Mutex<dyn Responder>>,
}

impl WorkingGuard {
    fn new(responder: Arc<Mutex<dyn Responder>>) -> Self {
        if let Ok(mut r) = responder.lock() {
            r.set_working(true);
        }
        Self { responder }
    }
}

impl Drop for WorkingGuard {
    fn drop(&mut self) {
        if let Ok(mut r) = self.responder.lock() {
            r.set_working(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingResponder {
        sent: Vec<String>,
        working: Vec<bool>,
    }

    impl Responder for RecordingResponder {
        fn respond(&mut self, text: &str) {
            self.sent.push(text.to_string());
        }

        fn set_working(&mut self, working: bool) {
            self.working.push(working);
        }
    }

    struct EmptyDirectory;

    impl Directory for EmptyDirectory {
        fn member(&self, _query: &EntityQuery<'_>) -> Option<Member> {
            None
        }
        fn channel(&self, _query: &EntityQuery<'_>) -> Option<Channel> {
            None
        }
        fn role(&self, _query: &EntityQuery<'_>) -> Option<Role> {
            None
        }
    }

    fn test_context(responder: Arc<Mutex<RecordingResponder>>) -> Context {
        Context::new(
            Member::new(1, "author"),
            Channel::new(2, "general", ChannelKind::Guild),
            Arc::new(EmptyDirectory),
            responder,
        )
    }

    #[test]
    fn test_permissions_describe_names() {
        let perms = Permissions::KICK_MEMBERS | Permissions::BAN_MEMBERS;
        assert_eq!(perms.describe(), "kick members, ban members");
    }

    #[test]
    fn test_respond_reaches_responder() {
        let responder = Arc::new(Mutex::new(RecordingResponder {
            sent: Vec::new(),
            working: Vec::new(),
        }));
        let ctx = test_context(Arc::clone(&responder));

        ctx.respond("hello");
        ctx.ok();

        let recorded = responder.lock().unwrap();
        assert_eq!(recorded.sent, vec!["hello".to_string(), "\u{2705}".to_string()]);
    }

    #[test]
    fn test_working_guard_clears_on_drop() {
        let responder = Arc::new(Mutex::new(RecordingResponder {
            sent: Vec::new(),
            working: Vec::new(),
        }));
        let ctx = test_context(Arc::clone(&responder));

        {
            let _guard = ctx.working_guard();
            assert_eq!(responder.lock().unwrap().working, vec![true]);
        }
        assert_eq!(responder.lock().unwrap().working, vec![true, false]);
    }
}
